//! Similar products to recent purchases.
//!
//! ## Algorithm
//! For each of the user's most recent purchases, scan active products in
//! the same category and score each candidate against the purchase with
//! a fixed rubric:
//! - same category: +0.4
//! - price proximity: +0.3 scaled by how close the prices are
//! - same seller: +0.2
//! - title token overlap (Jaccard): +0.1 scaled
//!
//! Candidates above 0.3 survive; the contributed score is the rubric
//! total times the 0.6 strategy multiplier.

use crate::context::ShopperContext;
use crate::types::{Candidate, ScoringStrategy};
use anyhow::Result;
use data_store::{CatalogReader, Product, Strategy};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

const ALGORITHM: &str = "product_similarity";

// Rubric weights; they sum to 1.0 so the total stays on the shared scale
const SAME_CATEGORY: f32 = 0.4;
const PRICE_PROXIMITY: f32 = 0.3;
const SAME_SELLER: f32 = 0.2;
const TITLE_OVERLAP: f32 = 0.1;

/// Rubric-scored similar-product finder.
#[derive(Clone)]
pub struct SimilarProductFinder {
    catalog: Arc<dyn CatalogReader>,

    /// How many recent purchases seed the scan
    seed_limit: usize,

    /// Candidates kept per seed purchase, best first
    per_seed_limit: usize,

    /// Minimum rubric total for a candidate to survive
    min_similarity: f32,

    /// Multiplier applied to the rubric total
    weight: f32,
}

impl SimilarProductFinder {
    /// Create a similar-product finder over the catalog collaborator
    pub fn new(catalog: Arc<dyn CatalogReader>) -> Self {
        Self {
            catalog,
            seed_limit: 5,
            per_seed_limit: 5,
            min_similarity: 0.3,
            weight: 0.6,
        }
    }

    /// Configure how many recent purchases are used as seeds (default: 5)
    pub fn with_seed_limit(mut self, limit: usize) -> Self {
        self.seed_limit = limit;
        self
    }

    /// Configure candidates kept per seed (default: 5)
    pub fn with_per_seed_limit(mut self, limit: usize) -> Self {
        self.per_seed_limit = limit;
        self
    }

    /// Configure the strategy multiplier (default: 0.6)
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

impl ScoringStrategy for SimilarProductFinder {
    fn name(&self) -> &'static str {
        "similar"
    }

    fn kind(&self) -> Strategy {
        Strategy::Similar
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    fn recommend(&self, context: &ShopperContext) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for &seed_id in context.recent_purchases.iter().take(self.seed_limit) {
            // Purchased product no longer in the catalog: skip the seed
            let Some(seed) = self.catalog.get_product(seed_id)? else {
                continue;
            };

            let mut scored: Vec<(Product, f32)> = Vec::new();
            for product in self.catalog.get_active_products_by_category(seed.category_id)? {
                if product.id == seed.id || context.purchased.contains(&product.id) {
                    continue;
                }
                let similarity = product_similarity(&seed, &product);
                if similarity > self.min_similarity {
                    scored.push((product, similarity));
                }
            }

            scored.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.id.cmp(&b.0.id))
            });
            scored.truncate(self.per_seed_limit);

            for (product, similarity) in scored {
                let mut candidate = Candidate::new(
                    product.id,
                    Strategy::Similar,
                    similarity * self.weight,
                    ALGORITHM,
                );
                candidate.metadata.insert("based_on_product".into(), json!(seed.id));
                candidate.metadata.insert("similarity_score".into(), json!(similarity));
                candidates.push(candidate);
            }
        }

        debug!("Generated {} similar-product candidates", candidates.len());
        Ok(candidates)
    }
}

/// Fixed-rubric similarity between two products, capped at 1.0.
fn product_similarity(a: &Product, b: &Product) -> f32 {
    let mut score = 0.0;

    if a.category_id == b.category_id {
        score += SAME_CATEGORY;
    }

    let max_price = a.price.max(b.price);
    if max_price > 0.0 {
        let proximity = 1.0 - ((a.price - b.price).abs() / max_price) as f32;
        score += proximity * PRICE_PROXIMITY;
    }

    if a.seller_id == b.seller_id {
        score += SAME_SELLER;
    }

    score += title_overlap(&a.title, &b.title) * TITLE_OVERLAP;

    score.min(1.0)
}

/// Jaccard similarity of lower-cased whitespace-tokenized titles.
fn title_overlap(a: &str, b: &str) -> f32 {
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let tokens_a: HashSet<&str> = a_lower.split_whitespace().collect();
    let tokens_b: HashSet<&str> = b_lower.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count();
    intersection as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::build_shopper_context;
    use chrono::Utc;
    use data_store::{
        BehaviorEvent, BehaviorLog, BehaviorType, CategoryId, InMemoryCatalog, ProductId, SellerId,
    };

    fn product(
        id: ProductId,
        title: &str,
        price: f64,
        category_id: CategoryId,
        seller_id: SellerId,
    ) -> Product {
        Product {
            id,
            title: title.to_string(),
            price,
            category_id,
            seller_id,
            is_active: true,
        }
    }

    #[test]
    fn test_rubric_full_match() {
        let a = product(1, "Trail Running Shoes", 80.0, 100, 5);
        let b = product(2, "Trail Running Shoes", 80.0, 100, 5);
        // 0.4 + 0.3 + 0.2 + 0.1 capped at 1.0
        assert!((product_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rubric_price_proximity() {
        let a = product(1, "Alpha", 100.0, 100, 5);
        let b = product(2, "Beta", 50.0, 100, 6);
        // category 0.4 + price 0.3 * (1 - 50/100) = 0.55, no seller/title match
        assert!((product_similarity(&a, &b) - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_rubric_zero_price_guard() {
        let a = product(1, "Alpha", 0.0, 100, 5);
        let b = product(2, "Beta", 0.0, 100, 6);
        // Division guarded; only the category term contributes
        assert!((product_similarity(&a, &b) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_title_overlap_jaccard() {
        assert!((title_overlap("Red Shoes", "red shoes") - 1.0).abs() < 1e-6);
        assert!((title_overlap("Red Shoes", "Blue Shoes") - (1.0 / 3.0)).abs() < 1e-6);
        assert_eq!(title_overlap("", "anything"), 0.0);
    }

    #[test]
    fn test_recommends_category_neighbors_not_purchased() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_product(product(1, "Espresso Grinder Pro", 120.0, 100, 5));
        catalog.insert_product(product(2, "Espresso Grinder Mini", 110.0, 100, 5));
        catalog.insert_product(product(3, "Tea Kettle", 1200.0, 100, 9));
        catalog.insert_product(product(4, "Desk Lamp", 30.0, 200, 5));
        let catalog = Arc::new(catalog);

        let log = BehaviorLog::new();
        log.append(
            BehaviorEvent::new(1, BehaviorType::Purchase, Utc::now()).with_product(1),
        );
        let log = Arc::new(log);
        let context = build_shopper_context(&log, 1, Utc::now());

        let finder = SimilarProductFinder::new(catalog);
        let candidates = finder.recommend(&context).unwrap();

        // Product 2 is a strong match; 3 shares only the category (0.4
        // + negligible price term); 4 is in another category entirely
        assert!(candidates.iter().any(|c| c.product_id == 2));
        assert!(candidates.iter().all(|c| c.product_id != 1));
        assert!(candidates.iter().all(|c| c.product_id != 4));

        let best = candidates.iter().find(|c| c.product_id == 2).unwrap();
        assert_eq!(best.metadata["based_on_product"], json!(1));
        assert!(best.score > 0.3 * 0.6);
        assert!(best.score <= 0.6);
    }

    #[test]
    fn test_missing_seed_product_is_skipped() {
        let catalog = Arc::new(InMemoryCatalog::new());
        let log = BehaviorLog::new();
        log.append(
            BehaviorEvent::new(1, BehaviorType::Purchase, Utc::now()).with_product(77),
        );
        let log = Arc::new(log);
        let context = build_shopper_context(&log, 1, Utc::now());

        let finder = SimilarProductFinder::new(catalog);
        assert!(finder.recommend(&context).unwrap().is_empty());
    }
}
