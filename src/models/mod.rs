pub mod movie;
pub mod user;

pub use movie::{validate_features, Movie, MovieId, MAX_FEATURE, MIN_FEATURE};
pub use user::{validate_rating, RatingMap, User, MAX_RATING, MIN_RATING};
