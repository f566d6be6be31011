//! Catalog and rating data sources
//!
//! A provider populates the engine once at startup: first the catalog, then
//! the users whose ratings reference it. The file-backed provider reads the
//! plain-text formats described in [`file`].

use crate::{error::AppResult, models::User, services::RecommendationSystem};

pub mod file;

pub use file::FileProvider;

/// Trait for catalog and rating data providers
///
/// Users are loaded against an already populated engine because every rating
/// must reference a catalog movie.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Load the movie catalog into a fresh engine
    async fn load_catalog(&self) -> AppResult<RecommendationSystem>;

    /// Load users and their ratings for the given catalog
    async fn load_users(&self, system: &RecommendationSystem) -> AppResult<Vec<User>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
