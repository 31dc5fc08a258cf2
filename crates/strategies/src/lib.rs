//! # Strategies Crate
//!
//! Candidate generation strategies for product recommendations.
//!
//! ## Components
//!
//! Five independent strategies behind one interface:
//!
//! - **CollaborativeFilter**: "shoppers like you also bought" via cosine
//!   similarity over sparse interaction profiles
//! - **ContentBasedFilter**: products from the user's preferred categories
//! - **TrendingAnalyzer**: most active products in a trailing window,
//!   shared by all users
//! - **SimilarProductFinder**: rubric-scored neighbors of recent purchases
//! - **FrequentlyBoughtTogether**: market-basket co-occurrence over orders
//!
//! ## Example Usage
//!
//! ```ignore
//! use strategies::{CollaborativeFilter, ScoringStrategy, build_shopper_context};
//! use std::sync::Arc;
//!
//! let context = build_shopper_context(&log, user_id, chrono::Utc::now());
//!
//! let collaborative = CollaborativeFilter::new(Arc::clone(&log));
//! let candidates = collaborative.recommend(&context)?;
//! ```
//!
//! Strategies are pure read-only computations over shared snapshots and
//! can run concurrently; the orchestrator simply concatenates their
//! outputs before fusion.

// Public modules
pub mod collaborative;
pub mod content_based;
pub mod context;
pub mod frequently_bought;
pub mod similar_products;
pub mod similarity;
pub mod trending;
pub mod types;

// Re-export commonly used types
pub use collaborative::CollaborativeFilter;
pub use content_based::ContentBasedFilter;
pub use context::{ShopperContext, build_shopper_context};
pub use frequently_bought::FrequentlyBoughtTogether;
pub use similar_products::SimilarProductFinder;
pub use similarity::{ProfileKey, UserProfile, cosine_similarity};
pub use trending::TrendingAnalyzer;
pub use types::{Candidate, ScoringStrategy};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use data_store::{BehaviorLog, InMemoryCatalog, InMemoryOrders, Strategy};
    use std::sync::Arc;

    #[test]
    fn test_strategy_kinds_and_names() {
        let log = Arc::new(BehaviorLog::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let orders = Arc::new(InMemoryOrders::new());

        let all: Vec<Box<dyn ScoringStrategy>> = vec![
            Box::new(CollaborativeFilter::new(Arc::clone(&log))),
            Box::new(ContentBasedFilter::new(catalog.clone())),
            Box::new(TrendingAnalyzer::new(Arc::clone(&log), catalog.clone())),
            Box::new(SimilarProductFinder::new(catalog.clone())),
            Box::new(FrequentlyBoughtTogether::new(orders)),
        ];

        let kinds: Vec<Strategy> = all.iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                Strategy::Collaborative,
                Strategy::ContentBased,
                Strategy::Trending,
                Strategy::Similar,
                Strategy::FrequentlyBought,
            ]
        );

        for strategy in &all {
            assert_eq!(strategy.name(), strategy.kind().as_str());
        }
    }

    #[test]
    fn test_all_strategies_empty_on_empty_stores() {
        let log = Arc::new(BehaviorLog::new());
        let catalog = Arc::new(InMemoryCatalog::new());
        let orders = Arc::new(InMemoryOrders::new());
        let context = build_shopper_context(&log, 1, Utc::now());

        let all: Vec<Box<dyn ScoringStrategy>> = vec![
            Box::new(CollaborativeFilter::new(Arc::clone(&log))),
            Box::new(ContentBasedFilter::new(catalog.clone())),
            Box::new(TrendingAnalyzer::new(Arc::clone(&log), catalog.clone())),
            Box::new(SimilarProductFinder::new(catalog.clone())),
            Box::new(FrequentlyBoughtTogether::new(orders)),
        ];

        for strategy in &all {
            assert!(strategy.recommend(&context).unwrap().is_empty());
        }
    }
}
