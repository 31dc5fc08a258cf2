//! Content-based filtering from category preferences.
//!
//! ## Algorithm
//! 1. Normalize the user's per-category interaction weights by the
//!    maximum, so the top category scores 1.0
//! 2. For each preferred category, fetch a handful of active products
//!    the user hasn't purchased
//! 3. Score each as `category preference * 0.8` — category affinity is
//!    capped below a perfect behavioral match

use crate::context::ShopperContext;
use crate::types::{Candidate, ScoringStrategy};
use anyhow::Result;
use data_store::{CatalogReader, CategoryId, Strategy};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

const ALGORITHM: &str = "category_based";

/// Category-preference content filter.
#[derive(Clone)]
pub struct ContentBasedFilter {
    catalog: Arc<dyn CatalogReader>,

    /// Candidates taken per preferred category
    per_category_limit: usize,

    /// Multiplier applied to the normalized preference
    weight: f32,
}

impl ContentBasedFilter {
    /// Create a content-based filter over the catalog collaborator
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self {
            catalog,
            per_category_limit: 5,
            weight: 0.8,
        }
    }

    /// Configure candidates per category (default: 5)
    pub fn with_per_category_limit(mut self, limit: usize) -> Self {
        self.per_category_limit = limit;
        self
    }

    /// Configure the strategy multiplier (default: 0.8)
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Preferences normalized by the maximum category weight,
    /// strongest first, ties by category id.
    fn normalized_preferences(&self, context: &ShopperContext) -> Vec<(CategoryId, f32)> {
        let max_weight = context
            .category_weights
            .values()
            .copied()
            .fold(0.0f32, f32::max);
        if max_weight <= 0.0 {
            return Vec::new();
        }

        let mut preferences: Vec<(CategoryId, f32)> = context
            .category_weights
            .iter()
            .filter(|&(_, &weight)| weight > 0.0)
            .map(|(&category_id, &weight)| (category_id, weight / max_weight))
            .collect();

        preferences.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        preferences
    }
}

impl ScoringStrategy for ContentBasedFilter {
    fn name(&self) -> &'static str {
        "content_based"
    }

    fn kind(&self) -> Strategy {
        Strategy::ContentBased
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    fn recommend(&self, context: &ShopperContext) -> Result<Vec<Candidate>> {
        let preferences = self.normalized_preferences(context);
        if preferences.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates = Vec::new();
        for (category_id, preference) in preferences {
            let products = self.catalog.get_active_products_by_category(category_id)?;

            for product in products
                .iter()
                .filter(|p| !context.purchased.contains(&p.id))
                .take(self.per_category_limit)
            {
                let mut candidate = Candidate::new(
                    product.id,
                    Strategy::ContentBased,
                    preference * self.weight,
                    ALGORITHM,
                );
                candidate.metadata.insert("category_id".into(), json!(category_id));
                candidate.metadata.insert("preference_score".into(), json!(preference));
                candidates.push(candidate);
            }
        }

        debug!("Generated {} content-based candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::build_shopper_context;
    use chrono::Utc;
    use data_store::{BehaviorEvent, BehaviorLog, BehaviorType, InMemoryCatalog, Product, ProductId};

    fn product(id: ProductId, category_id: CategoryId) -> Product {
        Product {
            id,
            title: format!("Product {}", id),
            price: 25.0,
            category_id,
            seller_id: 1,
            is_active: true,
        }
    }

    fn seeded_catalog() -> Arc<InMemoryCatalog> {
        let catalog = InMemoryCatalog::new();
        for id in 1..=8 {
            catalog.insert_product(product(id, 100));
        }
        catalog.insert_product(product(20, 200));
        Arc::new(catalog)
    }

    fn context_preferring_100() -> (Arc<BehaviorLog>, ShopperContext) {
        let log = BehaviorLog::new();
        let now = Utc::now();
        // Category 100 twice as preferred as 200; product 1 purchased
        log.append(
            BehaviorEvent::new(1, BehaviorType::CategoryView, now)
                .with_category(100)
                .with_weight(2.0),
        );
        log.append(BehaviorEvent::new(1, BehaviorType::CategoryView, now).with_category(200));
        log.append(
            BehaviorEvent::new(1, BehaviorType::Purchase, now)
                .with_product(1)
                .with_category(100),
        );
        let log = Arc::new(log);
        let context = build_shopper_context(&log, 1, now);
        (log, context)
    }

    #[test]
    fn test_top_category_scores_full_weight() {
        let (_log, context) = context_preferring_100();
        let filter = ContentBasedFilter::new(seeded_catalog());

        let candidates = filter.recommend(&context).unwrap();
        assert!(!candidates.is_empty());

        // Category 100 dominates (weight 3.0 of max 3.0) => 1.0 * 0.8
        let top = candidates
            .iter()
            .find(|c| c.metadata["category_id"] == json!(100))
            .unwrap();
        assert!((top.score - 0.8).abs() < 1e-6);

        // Category 200 preference is 1/3 of the max
        let other = candidates
            .iter()
            .find(|c| c.metadata["category_id"] == json!(200))
            .unwrap();
        assert!((other.score - (1.0 / 3.0) * 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_skips_purchased_and_caps_per_category() {
        let (_log, context) = context_preferring_100();
        let filter = ContentBasedFilter::new(seeded_catalog());

        let candidates = filter.recommend(&context).unwrap();
        let in_100: Vec<_> = candidates
            .iter()
            .filter(|c| c.metadata["category_id"] == json!(100))
            .collect();

        assert_eq!(in_100.len(), 5);
        assert!(in_100.iter().all(|c| c.product_id != 1));
    }

    #[test]
    fn test_no_category_signal_yields_nothing() {
        let log = Arc::new(BehaviorLog::new());
        let context = build_shopper_context(&log, 1, Utc::now());
        let filter = ContentBasedFilter::new(seeded_catalog());

        assert!(filter.recommend(&context).unwrap().is_empty());
    }
}
