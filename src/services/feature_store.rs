use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieId},
};

/// A movie and its feature vector
#[derive(Debug)]
struct CatalogEntry {
    movie: Movie,
    features: Vec<f64>,
}

/// Canonical owner of every catalog movie and its features
///
/// Entries live in an append-only arena and are addressed by [`MovieId`].
/// All feature vectors share the length of the first inserted entry.
#[derive(Debug)]
pub struct FeatureStore {
    id: Uuid,
    entries: Vec<CatalogEntry>,
    index: BTreeMap<Movie, usize>,
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            entries: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Feature vector length established by the first entry
    pub fn feature_len(&self) -> Option<usize> {
        self.entries.first().map(|entry| entry.features.len())
    }

    /// Adds a movie, or returns the existing handle if `(name, year)` is known
    ///
    /// The features of a repeated insertion are discarded.
    pub fn add_movie(&mut self, name: &str, year: i32, features: Vec<f64>) -> AppResult<MovieId> {
        if features.is_empty() {
            return Err(AppError::Validation(format!(
                "features cannot be empty for {} ({})",
                name, year
            )));
        }

        if let Some(expected) = self.feature_len() {
            if features.len() != expected {
                return Err(AppError::Validation(format!(
                    "feature size mismatch for {} ({}): expected {}, got {}",
                    name,
                    year,
                    expected,
                    features.len()
                )));
            }
        }

        let movie = Movie::new(name, year);
        if let Some(&slot) = self.index.get(&movie) {
            tracing::debug!(movie = %movie, "Movie already in catalog, keeping first features");
            return Ok(self.handle(slot));
        }

        let slot = self.entries.len();
        self.index.insert(movie.clone(), slot);
        self.entries.push(CatalogEntry { movie, features });

        Ok(self.handle(slot))
    }

    /// Looks a movie up by value
    pub fn get_movie(&self, name: &str, year: i32) -> Option<MovieId> {
        self.index
            .get(&Movie::new(name, year))
            .map(|&slot| self.handle(slot))
    }

    /// Returns the feature vector of a movie owned by this store
    pub fn get_features(&self, id: MovieId) -> AppResult<&[f64]> {
        self.entry(id).map(|entry| entry.features.as_slice())
    }

    /// Returns the identity of a movie owned by this store
    pub fn movie(&self, id: MovieId) -> AppResult<&Movie> {
        self.entry(id).map(|entry| &entry.movie)
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.entry(id).is_ok()
    }

    /// Iterates over the catalog in ascending [`Movie`] order
    pub fn iter(&self) -> impl Iterator<Item = (MovieId, &Movie, &[f64])> + '_ {
        self.index.values().map(move |&slot| {
            let entry = &self.entries[slot];
            (self.handle(slot), &entry.movie, entry.features.as_slice())
        })
    }

    fn handle(&self, slot: usize) -> MovieId {
        MovieId {
            store: self.id,
            slot,
        }
    }

    fn entry(&self, id: MovieId) -> AppResult<&CatalogEntry> {
        if id.store != self.id {
            return Err(AppError::NotFound(format!(
                "movie {} belongs to a different catalog",
                id
            )));
        }
        self.entries
            .get(id.slot)
            .ok_or_else(|| AppError::NotFound(format!("movie {} not in catalog", id)))
    }
}
