use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config,
    error::AppResult,
    models::User,
    services::{providers::CatalogProvider, RecommendationSystem},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<AppStateInner>>,
}

/// Inner state; the catalog only changes under the write lock
pub struct AppStateInner {
    pub system: RecommendationSystem,
    pub users: BTreeMap<String, User>,
    pub default_k: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates state with an empty catalog and no users
    pub fn new() -> Self {
        Self::with_data(RecommendationSystem::new(), Vec::new(), config::default_k())
    }

    /// Creates state from an already populated engine
    pub fn with_data(system: RecommendationSystem, users: Vec<User>, default_k: usize) -> Self {
        let mut by_name = BTreeMap::new();
        for user in users {
            if let Some(previous) = by_name.insert(user.name().to_string(), user) {
                tracing::warn!(user = %previous.name(), "Duplicate user, keeping the last entry");
            }
        }

        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                system,
                users: by_name,
                default_k,
            })),
        }
    }

    /// Populates state from a catalog provider
    pub async fn from_provider(provider: &dyn CatalogProvider, default_k: usize) -> AppResult<Self> {
        tracing::info!(provider = provider.name(), "Populating recommendation engine");

        let system = provider.load_catalog().await?;
        let users = provider.load_users(&system).await?;

        tracing::info!(
            movies = system.len(),
            users = users.len(),
            default_k,
            "Recommendation engine ready"
        );

        Ok(Self::with_data(system, users, default_k))
    }
}
