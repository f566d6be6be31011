use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{validate_features, validate_rating, Movie, MovieId, RatingMap, User},
    services::RecommendationSystem,
};

use super::AppState;

// Request/Response types

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MovieResponse {
    pub name: String,
    pub year: i32,
    pub features: Vec<f64>,
}

impl MovieResponse {
    fn new(movie: &Movie, features: &[f64]) -> Self {
        Self {
            name: movie.name().to_string(),
            year: movie.year(),
            features: features.to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateMovieRequest {
    pub name: String,
    pub year: i32,
    pub features: Vec<f64>,
}

/// One rated movie, as sent by clients and returned for users
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RatingEntry {
    pub name: String,
    pub year: i32,
    pub rating: f64,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub name: String,
    pub ratings: Vec<RatingEntry>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationMethod {
    Content,
    Cf,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub method: RecommendationMethod,
    pub movie: Option<Movie>,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub movie: Movie,
    pub k: usize,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct KQuery {
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    pub movie: String,
    pub year: i32,
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub ratings: Vec<RatingEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CfRequest {
    pub ratings: Vec<RatingEntry>,
    pub k: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    pub ratings: Vec<RatingEntry>,
    pub movie: Movie,
    pub k: Option<usize>,
}

// Helpers

/// Resolves client-supplied ratings against the catalog
fn resolve_ratings(system: &RecommendationSystem, entries: &[RatingEntry]) -> AppResult<RatingMap> {
    let mut ratings = RatingMap::new();
    for entry in entries {
        let id = lookup_movie(system, &entry.name, entry.year)?;
        validate_rating(system.movie(id)?, entry.rating)?;
        ratings.insert(id, entry.rating);
    }
    Ok(ratings)
}

fn lookup_movie(system: &RecommendationSystem, name: &str, year: i32) -> AppResult<MovieId> {
    system
        .get_movie(name, year)
        .ok_or_else(|| AppError::NotFound(format!("{} not in catalog", Movie::new(name, year))))
}

fn user_response(system: &RecommendationSystem, user: &User) -> AppResult<UserResponse> {
    let mut ratings = user
        .ratings()
        .iter()
        .map(|(&id, &rating)| {
            let movie = system.movie(id)?;
            Ok::<_, AppError>(RatingEntry {
                name: movie.name().to_string(),
                year: movie.year(),
                rating,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;
    ratings.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.name.cmp(&b.name)));

    Ok(UserResponse {
        name: user.name().to_string(),
        ratings,
    })
}

fn recommendation_response(
    system: &RecommendationSystem,
    method: RecommendationMethod,
    recommended: Option<MovieId>,
) -> AppResult<RecommendationResponse> {
    let movie = recommended.map(|id| system.movie(id).cloned()).transpose()?;
    Ok(RecommendationResponse { method, movie })
}

fn find_user<'a>(users: &'a BTreeMap<String, User>, name: &str) -> AppResult<&'a User> {
    users
        .get(name)
        .ok_or_else(|| AppError::NotFound(format!("user '{}'", name)))
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Plain-text catalog listing
pub async fn catalog(State(state): State<AppState>) -> String {
    let inner = state.inner.read().await;
    inner.system.to_string()
}

/// Get all movies in catalog order
pub async fn get_movies(State(state): State<AppState>) -> Json<Vec<MovieResponse>> {
    let inner = state.inner.read().await;
    let movies = inner
        .system
        .movies()
        .map(|(_, movie, features)| MovieResponse::new(movie, features))
        .collect();
    Json(movies)
}

/// Get a single movie
pub async fn get_movie(
    State(state): State<AppState>,
    Path((name, year)): Path<(String, i32)>,
) -> AppResult<Json<MovieResponse>> {
    let inner = state.inner.read().await;
    let id = lookup_movie(&inner.system, &name, year)?;
    let response = MovieResponse::new(inner.system.movie(id)?, inner.system.get_features(id)?);
    Ok(Json(response))
}

/// Add a movie to the catalog
///
/// Responds `201` for a new movie and `200` when `(name, year)` was already
/// present, in which case the stored features are returned unchanged.
pub async fn create_movie(
    State(state): State<AppState>,
    Json(request): Json<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<MovieResponse>)> {
    let movie = Movie::new(request.name.as_str(), request.year);
    validate_features(&movie, &request.features)?;

    let mut inner = state.inner.write().await;
    let existed = inner.system.get_movie(movie.name(), movie.year()).is_some();
    let id = inner
        .system
        .add_movie(movie.name(), movie.year(), request.features)?;

    let status = if existed {
        tracing::warn!(movie = %movie, "Movie already in catalog, keeping existing features");
        StatusCode::OK
    } else {
        tracing::info!(movie = %movie, "Movie added to catalog");
        StatusCode::CREATED
    };

    let response = MovieResponse::new(inner.system.movie(id)?, inner.system.get_features(id)?);
    Ok((status, Json(response)))
}

/// Get all users and their ratings
pub async fn get_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let inner = state.inner.read().await;
    let users = inner
        .users
        .values()
        .map(|user| user_response(&inner.system, user))
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Json(users))
}

/// Get a single user
pub async fn get_user(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let inner = state.inner.read().await;
    let user = find_user(&inner.users, &name)?;
    Ok(Json(user_response(&inner.system, user)?))
}

/// Content-based recommendation for a known user
pub async fn user_content_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(name): Path<String>,
) -> AppResult<Json<RecommendationResponse>> {
    let inner = state.inner.read().await;
    let user = find_user(&inner.users, &name)?;

    let recommended = user.recommend_by_content(&inner.system)?;
    tracing::info!(request_id = %request_id, user = %name, found = recommended.is_some(), "Content recommendation");

    Ok(Json(recommendation_response(
        &inner.system,
        RecommendationMethod::Content,
        recommended,
    )?))
}

/// Collaborative recommendation for a known user
pub async fn user_cf_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(name): Path<String>,
    Query(query): Query<KQuery>,
) -> AppResult<Json<RecommendationResponse>> {
    let inner = state.inner.read().await;
    let user = find_user(&inner.users, &name)?;
    let k = query.k.unwrap_or(inner.default_k);

    let recommended = user.recommend_by_cf(&inner.system, k)?;
    tracing::info!(request_id = %request_id, user = %name, k, found = recommended.is_some(), "Collaborative recommendation");

    Ok(Json(recommendation_response(
        &inner.system,
        RecommendationMethod::Cf,
        recommended,
    )?))
}

/// Predicted score of one movie for a known user
pub async fn user_prediction(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(name): Path<String>,
    Query(query): Query<PredictionQuery>,
) -> AppResult<Json<PredictionResponse>> {
    let inner = state.inner.read().await;
    let user = find_user(&inner.users, &name)?;
    let k = query.k.unwrap_or(inner.default_k);

    let score = user.predict_score(&inner.system, &query.movie, query.year, k)?;
    tracing::info!(request_id = %request_id, user = %name, k, score, "Score predicted");

    Ok(Json(PredictionResponse {
        movie: Movie::new(query.movie, query.year),
        k,
        score,
    }))
}

/// Content-based recommendation for ad-hoc ratings
pub async fn content_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ContentRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    tracing::info!(
        request_id = %request_id,
        rating_count = request.ratings.len(),
        "Processing content recommendation request"
    );

    let inner = state.inner.read().await;
    let ratings = resolve_ratings(&inner.system, &request.ratings)?;
    let recommended = inner.system.recommend_by_content(&ratings)?;

    Ok(Json(recommendation_response(
        &inner.system,
        RecommendationMethod::Content,
        recommended,
    )?))
}

/// Collaborative recommendation for ad-hoc ratings
pub async fn cf_recommendation(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CfRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let inner = state.inner.read().await;
    let k = request.k.unwrap_or(inner.default_k);

    tracing::info!(
        request_id = %request_id,
        rating_count = request.ratings.len(),
        k,
        "Processing collaborative recommendation request"
    );

    let ratings = resolve_ratings(&inner.system, &request.ratings)?;
    let recommended = inner.system.recommend_by_cf(&ratings, k)?;

    Ok(Json(recommendation_response(
        &inner.system,
        RecommendationMethod::Cf,
        recommended,
    )?))
}

/// Predicted score of one movie for ad-hoc ratings
pub async fn predict(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<PredictionRequest>,
) -> AppResult<Json<PredictionResponse>> {
    let inner = state.inner.read().await;
    let k = request.k.unwrap_or(inner.default_k);

    tracing::info!(
        request_id = %request_id,
        rating_count = request.ratings.len(),
        movie = %request.movie,
        k,
        "Processing prediction request"
    );

    let ratings = resolve_ratings(&inner.system, &request.ratings)?;
    let target = lookup_movie(&inner.system, request.movie.name(), request.movie.year())?;
    let score = inner.system.predict_score(&ratings, target, k)?;

    Ok(Json(PredictionResponse {
        movie: request.movie,
        k,
        score,
    }))
}
