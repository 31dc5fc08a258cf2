//! Candidate type and the shared strategy interface.

use anyhow::Result;
use data_store::{Metadata, ProductId, Strategy};
use serde::{Deserialize, Serialize};

use crate::context::ShopperContext;

/// One scored product proposed by a strategy.
///
/// Scores are clamped into `[0, 1]` at construction so every strategy
/// emits on the shared scale regardless of its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub product_id: ProductId,
    pub strategy: Strategy,
    pub score: f32,
    /// Identifier of the scoring method that produced this candidate
    pub algorithm: String,
    pub metadata: Metadata,
}

impl Candidate {
    /// Create a candidate, clamping `score` into `[0, 1]`
    pub fn new(
        product_id: ProductId,
        strategy: Strategy,
        score: f32,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            product_id,
            strategy,
            score: score.clamp(0.0, 1.0),
            algorithm: algorithm.into(),
            metadata: Metadata::new(),
        }
    }
}

/// Common interface of the five scoring strategies.
///
/// Implementations are pure read-only computations over the behavior,
/// catalog, and order snapshots, so they are safe to run in parallel.
/// Returning `Err` means the strategy contributes nothing to this
/// request; the orchestrator logs it and carries on.
pub trait ScoringStrategy: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Which strategy label this implementation emits under
    fn kind(&self) -> Strategy;

    /// Score candidate products for one shopper
    fn recommend(&self, context: &ShopperContext) -> Result<Vec<Candidate>>;
}
