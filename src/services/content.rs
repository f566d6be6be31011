use crate::{
    error::{AppError, AppResult},
    models::{MovieId, RatingMap},
};

use super::{similarity::cosine_similarity, FeatureStore};

/// Recommends the unrated movie closest to the user's preference vector
///
/// Candidates are scanned in ascending movie order and only a strictly
/// greater similarity replaces the current best, so ties go to the earliest
/// movie. Returns `None` when every catalog movie is already rated.
pub fn recommend_by_content(store: &FeatureStore, ratings: &RatingMap) -> AppResult<Option<MovieId>> {
    let preference = preference_vector(store, ratings)?;

    let mut best: Option<(MovieId, f64)> = None;
    for (id, movie, features) in store.iter() {
        if ratings.contains_key(&id) {
            continue;
        }

        let similarity = cosine_similarity(&preference, features);
        tracing::trace!(movie = %movie, similarity, "Scored content candidate");

        if best.map_or(true, |(_, max)| similarity > max) {
            best = Some((id, similarity));
        }
    }

    Ok(best.map(|(id, _)| id))
}

/// Builds the mean-centred preference vector for a set of ratings
///
/// Each rated movie contributes `(rating - mean) * features`, pulling the
/// vector toward movies rated above the user's average and away from the rest.
pub fn preference_vector(store: &FeatureStore, ratings: &RatingMap) -> AppResult<Vec<f64>> {
    if ratings.is_empty() {
        return Err(AppError::InvalidState(
            "cannot build a preference vector from an empty rating map".to_string(),
        ));
    }

    let average = ratings.values().sum::<f64>() / ratings.len() as f64;

    let mut preference = vec![0.0; store.feature_len().unwrap_or(0)];
    for (&id, &rating) in ratings {
        let features = store.get_features(id)?;
        let adjusted = rating - average;
        for (slot, feature) in preference.iter_mut().zip(features) {
            *slot += adjusted * feature;
        }
    }

    Ok(preference)
}
