//! Plain-text catalog and ratings files
//!
//! Catalog: one movie per line, `<Name>-<Year> f1 f2 ... fn`.
//!
//! Users: a header line of `<Name>-<Year>` tokens, then one line per user,
//! `<username> r1 ... rn`, with `NA` for movies the user has not rated.

use std::path::PathBuf;

use crate::{
    error::{AppError, AppResult},
    models::{validate_features, Movie, User},
    services::RecommendationSystem,
};

use super::CatalogProvider;

const NOT_RATED: &str = "NA";

/// Provider reading the catalog and ratings from local files
#[derive(Debug, Clone)]
pub struct FileProvider {
    movies_path: PathBuf,
    users_path: Option<PathBuf>,
}

impl FileProvider {
    pub fn new(movies_path: impl Into<PathBuf>, users_path: Option<impl Into<PathBuf>>) -> Self {
        Self {
            movies_path: movies_path.into(),
            users_path: users_path.map(Into::into),
        }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for FileProvider {
    async fn load_catalog(&self) -> AppResult<RecommendationSystem> {
        tracing::info!(path = %self.movies_path.display(), "Loading movie catalog");

        let contents = tokio::fs::read_to_string(&self.movies_path)
            .await
            .map_err(|e| {
                tracing::error!(path = %self.movies_path.display(), error = %e, "Failed to open catalog");
                e
            })?;

        parse_catalog(&contents)
    }

    async fn load_users(&self, system: &RecommendationSystem) -> AppResult<Vec<User>> {
        let Some(path) = &self.users_path else {
            tracing::info!("No users file configured");
            return Ok(Vec::new());
        };

        tracing::info!(path = %path.display(), "Loading user ratings");

        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to open users file");
            e
        })?;

        parse_users(&contents, system)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

/// Builds an engine from catalog file contents
///
/// Duplicate movies are skipped with a warning; any other malformed line
/// aborts the load.
pub fn parse_catalog(contents: &str) -> AppResult<RecommendationSystem> {
    let mut system = RecommendationSystem::new();

    for (index, line) in contents.lines().enumerate() {
        let line_no = index + 1;
        let mut tokens = line.split_whitespace();
        let Some(movie_token) = tokens.next() else {
            continue;
        };

        let movie = parse_movie_token(movie_token, line_no)?;
        let features = tokens
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    AppError::Parse(format!(
                        "line {}: invalid feature value '{}' for {}",
                        line_no, token, movie
                    ))
                })
            })
            .collect::<AppResult<Vec<f64>>>()?;
        validate_features(&movie, &features)?;

        if system.get_movie(movie.name(), movie.year()).is_some() {
            tracing::warn!(movie = %movie, line = line_no, "Skipping duplicate movie");
            continue;
        }

        system
            .add_movie(movie.name(), movie.year(), features)
            .map_err(|e| {
                tracing::error!(movie = %movie, line = line_no, error = %e, "Failed to add movie");
                e
            })?;
    }

    tracing::info!(
        movies = system.len(),
        features = system.feature_len().unwrap_or(0),
        "Catalog loaded"
    );

    Ok(system)
}

/// Builds users from ratings file contents against a loaded catalog
pub fn parse_users(contents: &str, system: &RecommendationSystem) -> AppResult<Vec<User>> {
    let mut lines = contents.lines().enumerate();

    let (_, header) = lines
        .next()
        .ok_or_else(|| AppError::Parse("missing movie header line".to_string()))?;
    let columns = header
        .split_whitespace()
        .map(|token| parse_movie_token(token, 1))
        .collect::<AppResult<Vec<Movie>>>()?;

    let mut users = Vec::new();
    for (index, line) in lines {
        let line_no = index + 1;
        let mut tokens = line.split_whitespace();
        let Some(user_name) = tokens.next() else {
            continue;
        };

        let mut user = User::new(user_name);
        for movie in &columns {
            let token = tokens.next().ok_or_else(|| {
                AppError::Parse(format!(
                    "line {}: missing rating for {} (user {})",
                    line_no, movie, user_name
                ))
            })?;

            if token == NOT_RATED {
                continue;
            }

            let id = system.get_movie(movie.name(), movie.year()).ok_or_else(|| {
                tracing::error!(movie = %movie, line = line_no, "Rated movie missing from catalog");
                AppError::NotFound(format!("line {}: {} not in catalog", line_no, movie))
            })?;
            let rating = token.parse::<f64>().map_err(|_| {
                AppError::Parse(format!(
                    "line {}: invalid rating '{}' for {}",
                    line_no, token, movie
                ))
            })?;
            user.rate(system, id, rating)?;
        }

        tracing::debug!(user = %user.name(), ratings = user.ratings().len(), "Loaded user");
        users.push(user);
    }

    tracing::info!(users = users.len(), "Users loaded");

    Ok(users)
}

/// Splits a `<Name>-<Year>` token at its last dash
fn parse_movie_token(token: &str, line_no: usize) -> AppResult<Movie> {
    let (name, year) = token.rsplit_once('-').ok_or_else(|| {
        AppError::Parse(format!(
            "line {}: '{}' must separate name and year with '-'",
            line_no, token
        ))
    })?;

    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Parse(format!(
            "line {}: missing movie name in '{}'",
            line_no, token
        )));
    }

    let year = year.trim().parse::<i32>().map_err(|_| {
        AppError::Parse(format!("line {}: invalid year in '{}'", line_no, token))
    })?;

    Ok(Movie::new(name, year))
}
