//! Score fusion and deduplication of strategy outputs.
//!
//! ## Algorithm
//! 1. Group the concatenated candidates by product, preserving the order
//!    in which products were first discovered
//! 2. A product proposed once passes through unchanged
//! 3. A product proposed multiple times collapses to a single `hybrid`
//!    entry whose score is the arithmetic mean of the contributions and
//!    whose metadata is the union of the contributors'
//! 4. Sort descending by score; the sort is stable, so ties keep
//!    discovery order
//!
//! The mean (rather than max or sum) keeps a weak-but-present strategy
//! from dominating or inflating a score past the shared scale.

use data_store::{ProductId, Strategy};
use std::collections::HashMap;
use strategies::Candidate;
use tracing::debug;

const COMBINED_ALGORITHM: &str = "combined";

/// Merge strategy outputs into one ranked, deduplicated list.
pub fn fuse(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let input_count = candidates.len();

    let mut discovery_order: Vec<ProductId> = Vec::new();
    let mut groups: HashMap<ProductId, Vec<Candidate>> = HashMap::new();
    for candidate in candidates {
        let group = groups.entry(candidate.product_id).or_default();
        if group.is_empty() {
            discovery_order.push(candidate.product_id);
        }
        group.push(candidate);
    }

    let mut fused: Vec<Candidate> = discovery_order
        .iter()
        .filter_map(|product_id| groups.remove(product_id).map(combine))
        .collect();

    fused.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    debug!(
        "Fused {} candidates into {} unique products",
        input_count,
        fused.len()
    );
    fused
}

/// Collapse one product's contributions into a single entry.
fn combine(mut group: Vec<Candidate>) -> Candidate {
    if group.len() == 1 {
        return group.pop().expect("single-entry group");
    }

    let count = group.len() as f32;
    let total: f32 = group.iter().map(|c| c.score).sum();

    let mut metadata = data_store::Metadata::new();
    for contribution in &group {
        // Last writer wins per key, in discovery order
        for (key, value) in &contribution.metadata {
            metadata.insert(key.clone(), value.clone());
        }
    }

    let mut fused = Candidate::new(
        group[0].product_id,
        Strategy::Hybrid,
        total / count,
        COMBINED_ALGORITHM,
    );
    fused.metadata = metadata;
    fused
}
