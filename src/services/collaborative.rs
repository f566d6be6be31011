use std::cmp::Ordering;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieId, RatingMap},
};

use super::{similarity::cosine_similarity, FeatureStore};

/// A rated movie and its similarity to the prediction target
#[derive(Debug)]
struct Neighbour<'a> {
    movie: &'a Movie,
    similarity: f64,
    rating: f64,
}

/// Predicts the user's rating of `target` from its `k` nearest rated movies
///
/// A movie the user already rated returns that rating unchanged. `k` is
/// clamped to the number of ratings. If the selected similarities sum to
/// zero the prediction is `0.0`.
pub fn predict_score(
    store: &FeatureStore,
    ratings: &RatingMap,
    target: MovieId,
    k: usize,
) -> AppResult<f64> {
    if ratings.is_empty() {
        return Err(AppError::InvalidState(
            "cannot predict a score from an empty rating map".to_string(),
        ));
    }

    if let Some(&rating) = ratings.get(&target) {
        return Ok(rating);
    }

    let target_features = store.get_features(target)?;

    let mut neighbours = ratings
        .iter()
        .map(|(&id, &rating)| {
            Ok::<_, AppError>(Neighbour {
                movie: store.movie(id)?,
                similarity: cosine_similarity(target_features, store.get_features(id)?),
                rating,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    neighbours.sort_by(by_similarity_desc);
    neighbours.truncate(k);

    let (numerator, denominator) = neighbours
        .iter()
        .fold((0.0, 0.0), |(num, den), n| {
            (num + n.similarity * n.rating, den + n.similarity)
        });

    if denominator == 0.0 {
        return Ok(0.0);
    }
    Ok(numerator / denominator)
}

/// Recommends the unrated movie with the highest predicted score
///
/// Candidates are scanned in ascending movie order; ties go to the earliest.
pub fn recommend_by_cf(store: &FeatureStore, ratings: &RatingMap, k: usize) -> AppResult<Option<MovieId>> {
    if ratings.is_empty() {
        return Err(AppError::InvalidState(
            "cannot recommend from an empty rating map".to_string(),
        ));
    }

    let mut best: Option<(MovieId, f64)> = None;
    for (id, movie, _) in store.iter() {
        if ratings.contains_key(&id) {
            continue;
        }

        let score = predict_score(store, ratings, id, k)?;
        tracing::trace!(movie = %movie, score, k, "Scored collaborative candidate");

        if best.map_or(true, |(_, max)| score > max) {
            best = Some((id, score));
        }
    }

    Ok(best.map(|(id, _)| id))
}

fn by_similarity_desc(a: &Neighbour<'_>, b: &Neighbour<'_>) -> Ordering {
    b.similarity
        .total_cmp(&a.similarity)
        .then_with(|| a.movie.cmp(b.movie))
}
