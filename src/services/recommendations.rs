use std::fmt::Display;

use crate::{
    error::AppResult,
    models::{Movie, MovieId, RatingMap},
};

use super::{collaborative, content, FeatureStore};

/// Movie recommendation engine
///
/// Owns the catalog and answers content-based and collaborative queries
/// against caller-supplied rating maps. Queries never mutate the catalog.
#[derive(Debug, Default)]
pub struct RecommendationSystem {
    store: FeatureStore,
}

impl RecommendationSystem {
    /// Creates an engine with an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn feature_len(&self) -> Option<usize> {
        self.store.feature_len()
    }

    /// Adds a movie to the catalog; see [`FeatureStore::add_movie`]
    pub fn add_movie(&mut self, name: &str, year: i32, features: Vec<f64>) -> AppResult<MovieId> {
        self.store.add_movie(name, year, features)
    }

    pub fn get_movie(&self, name: &str, year: i32) -> Option<MovieId> {
        self.store.get_movie(name, year)
    }

    pub fn get_features(&self, id: MovieId) -> AppResult<&[f64]> {
        self.store.get_features(id)
    }

    pub fn movie(&self, id: MovieId) -> AppResult<&Movie> {
        self.store.movie(id)
    }

    /// Catalog entries in ascending movie order
    pub fn movies(&self) -> impl Iterator<Item = (MovieId, &Movie, &[f64])> + '_ {
        self.store.iter()
    }

    pub fn recommend_by_content(&self, ratings: &RatingMap) -> AppResult<Option<MovieId>> {
        content::recommend_by_content(&self.store, ratings)
    }

    pub fn recommend_by_cf(&self, ratings: &RatingMap, k: usize) -> AppResult<Option<MovieId>> {
        collaborative::recommend_by_cf(&self.store, ratings, k)
    }

    pub fn predict_score(&self, ratings: &RatingMap, movie: MovieId, k: usize) -> AppResult<f64> {
        collaborative::predict_score(&self.store, ratings, movie, k)
    }
}

impl Display for RecommendationSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (_, movie, _) in self.store.iter() {
            writeln!(f, "{}", movie)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_catalog_in_order() {
        let mut system = RecommendationSystem::new();
        system.add_movie("Titanic", 1997, vec![2.0, 8.0]).unwrap();
        system.add_movie("Die Hard", 1988, vec![9.0, 1.0]).unwrap();
        system.add_movie("Alien", 1979, vec![8.0, 3.0]).unwrap();

        assert_eq!(
            system.to_string(),
            "Alien (1979)\nDie Hard (1988)\nTitanic (1997)\n"
        );
    }

    #[test]
    fn test_empty_display() {
        assert_eq!(RecommendationSystem::new().to_string(), "");
    }

    #[test]
    fn test_engine_surface() {
        let mut system = RecommendationSystem::new();
        let a = system.add_movie("A", 2001, vec![1.0, 2.0, 3.0]).unwrap();
        let b = system.add_movie("B", 2002, vec![4.0, 5.0, 6.0]).unwrap();
        let c = system.add_movie("C", 2003, vec![7.0, 8.0, 9.0]).unwrap();
        let ratings = RatingMap::from([(a, 8.0), (b, 4.0)]);

        assert_eq!(system.get_movie("C", 2003), Some(c));
        assert_eq!(system.recommend_by_content(&ratings).unwrap(), Some(c));
        assert_eq!(system.recommend_by_cf(&ratings, 2).unwrap(), Some(c));
        assert!((system.predict_score(&ratings, c, 2).unwrap() - 5.960_381).abs() < 1e-6);
        assert_eq!(system.len(), 3);
        assert_eq!(system.feature_len(), Some(3));
    }
}
