//! Movie recommendations from feature vectors and user ratings.
//!
//! The engine ([`services::RecommendationSystem`]) owns a catalog of movies
//! with fixed-length feature vectors and answers two kinds of queries against
//! a user's ratings: content-based (similarity to a mean-centred preference
//! vector) and item-based collaborative filtering (k nearest rated movies).
//! The [`api`] module serves the engine over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
