//! Frequently bought together (market-basket analysis).
//!
//! ## Algorithm
//! 1. Take the user's full purchase set from order history
//! 2. Find every past order containing at least one of those products
//! 3. Count how often each *other* product co-occurs across those orders
//! 4. Normalize by the maximum co-occurrence and apply the 0.5 multiplier
//!
//! With fewer than two prior purchases the co-occurrence signal is
//! meaningless, so the strategy returns nothing.

use crate::context::ShopperContext;
use crate::types::{Candidate, ScoringStrategy};
use anyhow::Result;
use data_store::{OrderReader, ProductId, Strategy};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

const ALGORITHM: &str = "market_basket_analysis";

/// Order co-occurrence strategy.
#[derive(Clone)]
pub struct FrequentlyBoughtTogether {
    orders: Arc<dyn OrderReader>,

    /// Minimum prior purchases before the signal is usable
    min_purchases: usize,

    /// How many co-occurring products are emitted, most frequent first
    result_limit: usize,

    /// Multiplier applied to the normalized co-occurrence frequency
    weight: f32,
}

impl FrequentlyBoughtTogether {
    /// Create a market-basket strategy over the order-history collaborator
    pub fn new(orders: Arc<dyn OrderReader>) -> Self {
        Self {
            orders,
            min_purchases: 2,
            result_limit: 10,
            weight: 0.5,
        }
    }

    /// Configure the minimum purchase count (default: 2)
    pub fn with_min_purchases(mut self, min: usize) -> Self {
        self.min_purchases = min;
        self
    }

    /// Configure the result cap (default: 10)
    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    /// Configure the strategy multiplier (default: 0.5)
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

impl ScoringStrategy for FrequentlyBoughtTogether {
    fn name(&self) -> &'static str {
        "frequently_bought"
    }

    fn kind(&self) -> Strategy {
        Strategy::FrequentlyBought
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    fn recommend(&self, context: &ShopperContext) -> Result<Vec<Candidate>> {
        let purchases = self.orders.get_purchases(context.user_id)?;
        if purchases.len() < self.min_purchases {
            return Ok(Vec::new());
        }
        let purchased: HashSet<ProductId> = purchases.iter().copied().collect();

        let order_ids = self.orders.get_orders_containing(&purchases)?;
        let items = self.orders.get_order_items(&order_ids)?;

        let mut frequencies: HashMap<ProductId, u32> = HashMap::new();
        for (_, product_id) in items {
            if !purchased.contains(&product_id) {
                *frequencies.entry(product_id).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(ProductId, u32)> = frequencies.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.result_limit);

        let Some(&(_, max_frequency)) = ranked.first() else {
            return Ok(Vec::new());
        };

        let candidates = ranked
            .into_iter()
            .map(|(product_id, frequency)| {
                let normalized = frequency as f32 / max_frequency as f32;
                let mut candidate = Candidate::new(
                    product_id,
                    Strategy::FrequentlyBought,
                    normalized * self.weight,
                    ALGORITHM,
                );
                candidate.metadata.insert("frequency".into(), json!(frequency));
                candidate.metadata.insert("based_on_orders".into(), json!(order_ids.len()));
                candidate
            })
            .collect::<Vec<_>>();

        debug!("Generated {} co-purchase candidates", candidates.len());
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use data_store::InMemoryOrders;

    fn context(user_id: u64) -> ShopperContext {
        ShopperContext::new(user_id, Utc::now())
    }

    /// User 1 bought {100, 101}. Product 200 co-occurs in two related
    /// orders, product 201 in one.
    fn seeded_orders() -> Arc<InMemoryOrders> {
        let orders = InMemoryOrders::new();
        orders.insert_order(1, 1, &[100]);
        orders.insert_order(2, 1, &[101]);
        orders.insert_order(3, 2, &[100, 200]);
        orders.insert_order(4, 3, &[101, 200, 201]);
        orders.insert_order(5, 4, &[900]);
        Arc::new(orders)
    }

    #[test]
    fn test_co_occurrence_ranking_and_normalization() {
        let strategy = FrequentlyBoughtTogether::new(seeded_orders());
        let candidates = strategy.recommend(&context(1)).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].product_id, 200);
        assert!((candidates[0].score - 0.5).abs() < 1e-6);
        assert_eq!(candidates[0].metadata["frequency"], json!(2));

        assert_eq!(candidates[1].product_id, 201);
        assert!((candidates[1].score - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_own_purchases_never_recommended() {
        let strategy = FrequentlyBoughtTogether::new(seeded_orders());
        let candidates = strategy.recommend(&context(1)).unwrap();

        assert!(candidates.iter().all(|c| c.product_id != 100));
        assert!(candidates.iter().all(|c| c.product_id != 101));
    }

    #[test]
    fn test_requires_two_purchases() {
        let orders = InMemoryOrders::new();
        orders.insert_order(1, 1, &[100]);
        orders.insert_order(2, 2, &[100, 200]);
        let strategy = FrequentlyBoughtTogether::new(Arc::new(orders));

        assert!(strategy.recommend(&context(1)).unwrap().is_empty());
    }

    #[test]
    fn test_result_limit_caps_output() {
        let orders = InMemoryOrders::new();
        orders.insert_order(1, 1, &[100]);
        orders.insert_order(2, 1, &[101]);
        orders.insert_order(3, 2, &[100, 200, 201, 202, 203]);
        let strategy = FrequentlyBoughtTogether::new(Arc::new(orders)).with_result_limit(2);

        let candidates = strategy.recommend(&context(1)).unwrap();
        assert_eq!(candidates.len(), 2);
    }
}
