pub mod collaborative;
pub mod content;
pub mod feature_store;
pub mod providers;
pub mod recommendations;
pub mod similarity;

pub use feature_store::FeatureStore;
pub use recommendations::RecommendationSystem;
pub use similarity::cosine_similarity;
