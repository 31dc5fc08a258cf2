//! Engine crate: the recommendation service and its stores.
//!
//! This crate wires the strategy and fusion layers to their surrounding
//! infrastructure — the short-TTL list cache, the persisted record
//! store, and the orchestrating [`RecommendationService`].

pub mod cache;
pub mod service;
pub mod store;

pub use cache::{
    InMemoryCache, RecommendationCache, recommendations_cache_key, user_cache_prefix,
};
pub use service::{Recommendation, RecommendationService, TrackRequest};
pub use store::{InMemoryRecommendationStore, RecommendationStore};
