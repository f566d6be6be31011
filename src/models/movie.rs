use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt::Display};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Lowest value a single feature may take
pub const MIN_FEATURE: f64 = 1.0;
/// Highest value a single feature may take
pub const MAX_FEATURE: f64 = 10.0;

/// A catalog movie, identified by its name and release year
///
/// Equality and hashing come from `(name, year)` only. Ordering is by year,
/// then by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Movie {
    name: String,
    year: i32,
}

impl Movie {
    /// Creates a new movie identity
    pub fn new(name: impl Into<String>, year: i32) -> Self {
        Self {
            name: name.into(),
            year,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

impl Ord for Movie {
    fn cmp(&self, other: &Self) -> Ordering {
        self.year
            .cmp(&other.year)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Movie {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Movie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.year)
    }
}

/// Handle to a movie owned by a [`FeatureStore`](crate::services::FeatureStore)
///
/// Carries the identity of the issuing store so a handle from one store is
/// never mistaken for a member of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MovieId {
    pub(crate) store: Uuid,
    pub(crate) slot: usize,
}

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.store, self.slot)
    }
}

/// Checks that every feature lies in `[MIN_FEATURE, MAX_FEATURE]`
pub fn validate_features(movie: &Movie, features: &[f64]) -> AppResult<()> {
    if let Some(value) = features
        .iter()
        .find(|v| !(MIN_FEATURE..=MAX_FEATURE).contains(*v))
    {
        return Err(AppError::Validation(format!(
            "feature value {} out of range [{}, {}] for {}",
            value, MIN_FEATURE, MAX_FEATURE, movie
        )));
    }
    Ok(())
}
