use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/catalog", get(handlers::catalog))
        // Movies
        .route("/movies", get(handlers::get_movies).post(handlers::create_movie))
        .route("/movies/:name/:year", get(handlers::get_movie))
        // Users
        .route("/users", get(handlers::get_users))
        .route("/users/:name", get(handlers::get_user))
        .route(
            "/users/:name/recommendations/content",
            get(handlers::user_content_recommendation),
        )
        .route(
            "/users/:name/recommendations/cf",
            get(handlers::user_cf_recommendation),
        )
        .route("/users/:name/predictions", get(handlers::user_prediction))
        // Ad-hoc ratings
        .route("/recommendations/content", post(handlers::content_recommendation))
        .route("/recommendations/cf", post(handlers::cf_recommendation))
        .route("/predictions", post(handlers::predict))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
