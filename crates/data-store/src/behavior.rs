//! The append-only behavior store.
//!
//! All recommendation signals originate here. Events are appended while
//! requests are being served, so the log keeps its interior state behind
//! a read-write lock; queries take a read guard and return owned data.

use crate::types::{BehaviorEvent, BehaviorType, ProductId, UserId};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct LogInner {
    /// Events in arrival order; never mutated or removed
    events: Vec<BehaviorEvent>,
    /// Indices into `events` per user, in arrival order
    by_user: HashMap<UserId, Vec<usize>>,
}

/// Append-only log of shopper interaction events.
///
/// Appends are single atomic writes; queries aggregate over a consistent
/// snapshot taken under the read lock.
#[derive(Debug, Default)]
pub struct BehaviorLog {
    inner: RwLock<LogInner>,
}

impl BehaviorLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one event
    pub fn append(&self, event: BehaviorEvent) {
        let mut inner = self.inner.write();
        let idx = inner.events.len();
        inner.by_user.entry(event.user_id).or_default().push(idx);
        inner.events.push(event);
    }

    /// Total number of events recorded
    pub fn len(&self) -> usize {
        self.inner.read().events.len()
    }

    /// Whether the log holds no events
    pub fn is_empty(&self) -> bool {
        self.inner.read().events.is_empty()
    }

    /// All events for one user, in arrival order
    pub fn events_for(&self, user_id: UserId) -> Vec<BehaviorEvent> {
        let inner = self.inner.read();
        inner
            .by_user
            .get(&user_id)
            .map(|indices| indices.iter().map(|&i| inner.events[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Every user that has at least one event, in ascending id order
    pub fn user_ids(&self) -> Vec<UserId> {
        let inner = self.inner.read();
        let mut ids: Vec<UserId> = inner.by_user.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Purchase events (with a product reference) for one user, in arrival order
    pub fn purchase_events(&self, user_id: UserId) -> Vec<BehaviorEvent> {
        let inner = self.inner.read();
        inner
            .by_user
            .get(&user_id)
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| &inner.events[i])
                    .filter(|e| e.behavior_type == BehaviorType::Purchase && e.product_id.is_some())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The set of products a user has purchased
    pub fn purchased_products(&self, user_id: UserId) -> HashSet<ProductId> {
        self.purchase_events(user_id)
            .into_iter()
            .filter_map(|e| e.product_id)
            .collect()
    }

    /// Product ids of a user's most recent purchases, newest first,
    /// deduplicated, capped at `limit`
    pub fn recent_purchases(&self, user_id: UserId, limit: usize) -> Vec<ProductId> {
        let mut seen = HashSet::new();
        let mut recent = Vec::new();
        for event in self.purchase_events(user_id).into_iter().rev() {
            let Some(product_id) = event.product_id else { continue };
            if seen.insert(product_id) {
                recent.push(product_id);
                if recent.len() == limit {
                    break;
                }
            }
        }
        recent
    }

    /// Count events per referenced product since `cutoff`, across all users
    pub fn product_activity_since(&self, cutoff: DateTime<Utc>) -> HashMap<ProductId, u32> {
        let inner = self.inner.read();
        let mut counts: HashMap<ProductId, u32> = HashMap::new();
        for event in &inner.events {
            if event.created_at < cutoff {
                continue;
            }
            if let Some(product_id) = event.product_id {
                *counts.entry(product_id).or_insert(0) += 1;
            }
        }
        counts
    }
}
