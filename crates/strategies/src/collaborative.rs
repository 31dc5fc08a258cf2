//! Collaborative filtering over behavior similarity.
//!
//! "Shoppers whose activity looks like yours also bought these."
//!
//! ## Algorithm
//! 1. Build the target user's sparse interaction profile
//! 2. Compare it against every other user's profile via cosine similarity
//! 3. Keep neighbors above the similarity threshold, best first, capped
//! 4. Score each neighbor purchase the target hasn't made as
//!    `similarity * event weight`

use crate::context::ShopperContext;
use crate::similarity::{UserProfile, cosine_similarity};
use crate::types::{Candidate, ScoringStrategy};
use anyhow::Result;
use data_store::{BehaviorLog, Strategy, UserId};
use rayon::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

const ALGORITHM: &str = "user_based_cf";

/// User-based collaborative filter.
#[derive(Clone)]
pub struct CollaborativeFilter {
    log: Arc<BehaviorLog>,

    /// Minimum cosine similarity for a user to count as a neighbor.
    /// Filters out users who share at most a single weak signal.
    min_similarity: f32,

    /// Maximum number of neighbors considered
    neighbor_limit: usize,
}

impl CollaborativeFilter {
    /// Create a collaborative filter over the shared behavior log
    pub fn new(log: Arc<BehaviorLog>) -> Self {
        Self {
            log,
            min_similarity: 0.1,
            neighbor_limit: 10,
        }
    }

    /// Configure the neighbor similarity threshold (default: 0.1)
    pub fn with_min_similarity(mut self, threshold: f32) -> Self {
        self.min_similarity = threshold;
        self
    }

    /// Configure the neighbor cap (default: 10)
    pub fn with_neighbor_limit(mut self, limit: usize) -> Self {
        self.neighbor_limit = limit;
        self
    }

    /// Find the most similar users, best first.
    ///
    /// Every other user's profile is built and compared in parallel;
    /// the log is read-only here so the scan needs no coordination.
    fn find_neighbors(&self, context: &ShopperContext) -> Vec<(UserId, f32)> {
        let user_ids = self.log.user_ids();

        let mut neighbors: Vec<(UserId, f32)> = user_ids
            .par_iter()
            .filter(|&&user_id| user_id != context.user_id)
            .filter_map(|&user_id| {
                let events = self.log.events_for(user_id);
                let profile = UserProfile::from_events(&events);
                let similarity = cosine_similarity(&context.profile, &profile);
                (similarity > self.min_similarity).then_some((user_id, similarity))
            })
            .collect();

        neighbors.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        neighbors.truncate(self.neighbor_limit);
        neighbors
    }
}

impl ScoringStrategy for CollaborativeFilter {
    fn name(&self) -> &'static str {
        "collaborative"
    }

    fn kind(&self) -> Strategy {
        Strategy::Collaborative
    }

    #[instrument(skip(self, context), fields(user_id = context.user_id))]
    fn recommend(&self, context: &ShopperContext) -> Result<Vec<Candidate>> {
        if context.profile.is_empty() {
            return Ok(Vec::new());
        }

        let neighbors = self.find_neighbors(context);
        debug!("Found {} similar users", neighbors.len());

        let mut candidates = Vec::new();
        for (neighbor_id, similarity) in neighbors {
            for event in self.log.purchase_events(neighbor_id) {
                let Some(product_id) = event.product_id else { continue };
                if context.purchased.contains(&product_id) {
                    continue;
                }

                let mut candidate = Candidate::new(
                    product_id,
                    Strategy::Collaborative,
                    similarity * event.weight,
                    ALGORITHM,
                );
                candidate.metadata.insert("similar_user".into(), json!(neighbor_id));
                candidate.metadata.insert("similarity_score".into(), json!(similarity));
                candidates.push(candidate);
            }
        }

        debug!("Generated {} collaborative candidates", candidates.len());
        Ok(candidates)
    }
}
