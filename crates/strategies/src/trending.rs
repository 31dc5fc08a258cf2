//! Trending products from recent activity.
//!
//! ## Algorithm
//! 1. Count behavior events per product across all users in a trailing
//!    window (default 7 days)
//! 2. Keep the most active products (default top 20), active catalog
//!    entries only
//! 3. Normalize by the maximum count so the most active product scores
//!    1.0, then apply the 0.7 multiplier
//!
//! No personalization: at a given instant every user sees the same
//! trending list, which makes this the fallback for users with no
//! history.

use crate::context::ShopperContext;
use crate::types::{Candidate, ScoringStrategy};
use anyhow::Result;
use chrono::Duration;
use data_store::{BehaviorLog, CatalogReader, ProductId, Strategy};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

const ALGORITHM: &str = "trending_analysis";

/// Window-counted trending analyzer.
#[derive(Clone)]
pub struct TrendingAnalyzer {
    log: Arc<BehaviorLog>,
    catalog: Arc<dyn CatalogReader>,

    /// Trailing window size in days
    window_days: i64,

    /// How many products make the trending list
    top_count: usize,

    /// Multiplier applied to the normalized activity count
    weight: f32,
}

impl TrendingAnalyzer {
    /// Create a trending analyzer over the behavior log and catalog
    pub fn new(log: Arc<BehaviorLog>, catalog: Arc<dyn CatalogReader>) -> Self {
        Self {
            log,
            catalog,
            window_days: 7,
            top_count: 20,
            weight: 0.7,
        }
    }

    /// Configure the trailing window in days (default: 7)
    pub fn with_window_days(mut self, days: i64) -> Self {
        self.window_days = days;
        self
    }

    /// Configure the trending list size (default: 20)
    pub fn with_top_count(mut self, count: usize) -> Self {
        self.top_count = count;
        self
    }

    /// Configure the strategy multiplier (default: 0.7)
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

impl ScoringStrategy for TrendingAnalyzer {
    fn name(&self) -> &'static str {
        "trending"
    }

    fn kind(&self) -> Strategy {
        Strategy::Trending
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    fn recommend(&self, context: &ShopperContext) -> Result<Vec<Candidate>> {
        let cutoff = context.requested_at - Duration::days(self.window_days);
        let counts = self.log.product_activity_since(cutoff);

        // Products gone from the catalog or deactivated don't trend
        let mut active: Vec<(ProductId, u32)> = Vec::new();
        for (product_id, count) in counts {
            match self.catalog.get_product(product_id)? {
                Some(product) if product.is_active => active.push((product_id, count)),
                _ => {}
            }
        }

        active.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        active.truncate(self.top_count);

        let Some(&(_, max_count)) = active.first() else {
            return Ok(Vec::new());
        };

        let window_label = json!(format!("{}_days", self.window_days));
        let candidates = active
            .into_iter()
            .map(|(product_id, count)| {
                let normalized = count as f32 / max_count as f32;
                let mut candidate = Candidate::new(
                    product_id,
                    Strategy::Trending,
                    normalized * self.weight,
                    ALGORITHM,
                );
                candidate.metadata.insert("activity_count".into(), json!(count));
                candidate.metadata.insert("time_period".into(), window_label.clone());
                candidate
            })
            .collect::<Vec<_>>();

        debug!("Generated {} trending candidates", candidates.len());
        Ok(candidates)
    }
}
