use std::collections::BTreeMap;

use crate::{
    error::{AppError, AppResult},
    services::RecommendationSystem,
};

use super::{validate_features, Movie, MovieId};

/// Lowest accepted rating
pub const MIN_RATING: f64 = 0.0;
/// Highest accepted rating
pub const MAX_RATING: f64 = 10.0;

/// A user's ratings keyed by catalog handle; unrated movies are absent
pub type RatingMap = BTreeMap<MovieId, f64>;

/// Checks that a rating lies in `[MIN_RATING, MAX_RATING]`
pub fn validate_rating(movie: &Movie, rating: f64) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::Validation(format!(
            "rating {} out of range [{}, {}] for {}",
            rating, MIN_RATING, MAX_RATING, movie
        )));
    }
    Ok(())
}

/// A named user and the ratings they have given
///
/// The engine is passed in per call; a user never holds on to it.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    name: String,
    ratings: RatingMap,
}

impl User {
    /// Creates a user with no ratings
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ratings: RatingMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ratings(&self) -> &RatingMap {
        &self.ratings
    }

    /// Records a rating for a movie already in `system`; re-rating overwrites
    pub fn rate(&mut self, system: &RecommendationSystem, movie: MovieId, rating: f64) -> AppResult<()> {
        validate_rating(system.movie(movie)?, rating)?;
        self.ratings.insert(movie, rating);
        Ok(())
    }

    /// Adds a movie to the catalog (idempotently) and rates it
    pub fn add_movie(
        &mut self,
        system: &mut RecommendationSystem,
        name: &str,
        year: i32,
        features: Vec<f64>,
        rating: f64,
    ) -> AppResult<MovieId> {
        let movie = Movie::new(name, year);
        validate_features(&movie, &features)?;
        validate_rating(&movie, rating)?;

        let id = system.add_movie(name, year, features).map_err(|e| {
            tracing::error!(user = %self.name, movie = %movie, error = %e, "Failed to add rated movie");
            e
        })?;
        self.ratings.insert(id, rating);

        Ok(id)
    }

    pub fn recommend_by_content(&self, system: &RecommendationSystem) -> AppResult<Option<MovieId>> {
        system.recommend_by_content(&self.ratings)
    }

    pub fn recommend_by_cf(&self, system: &RecommendationSystem, k: usize) -> AppResult<Option<MovieId>> {
        system.recommend_by_cf(&self.ratings, k)
    }

    /// Predicts this user's rating of `(name, year)`
    pub fn predict_score(
        &self,
        system: &RecommendationSystem,
        name: &str,
        year: i32,
        k: usize,
    ) -> AppResult<f64> {
        let movie = system
            .get_movie(name, year)
            .ok_or_else(|| AppError::NotFound(format!("{} not in catalog", Movie::new(name, year))))?;
        system.predict_score(&self.ratings, movie, k)
    }
}
