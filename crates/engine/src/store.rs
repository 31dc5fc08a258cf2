//! Persisted recommendation records.
//!
//! Longer-lived than the cache: records carry a 24-hour expiry and
//! support idempotent upsert on `(user, product, strategy)` plus offline
//! inspection of what was recommended and why.

use chrono::{DateTime, Utc};
use data_store::{ProductId, RecommendationRecord, Result, Strategy, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Persistence-store collaborator interface.
pub trait RecommendationStore: Send + Sync {
    /// Insert or replace the record for its `(user, product, strategy)` key
    fn upsert(&self, record: RecommendationRecord) -> Result<()>;

    /// Delete a user's records whose expiry is before `before`;
    /// returns how many were removed
    fn delete_expired(&self, user_id: UserId, before: DateTime<Utc>) -> Result<usize>;
}

type RecordKey = (UserId, ProductId, Strategy);

/// In-memory recommendation record store.
#[derive(Default)]
pub struct InMemoryRecommendationStore {
    records: RwLock<HashMap<RecordKey, RecommendationRecord>>,
}

impl InMemoryRecommendationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total records held, expired included
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// All of a user's records, best score first, ties by product id
    pub fn records_for(&self, user_id: UserId) -> Vec<RecommendationRecord> {
        let mut records: Vec<RecommendationRecord> = self
            .records
            .read()
            .values()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        records
    }

    /// A user's records that are still fresh at `now`
    pub fn live_records_for(&self, user_id: UserId, now: DateTime<Utc>) -> Vec<RecommendationRecord> {
        self.records_for(user_id)
            .into_iter()
            .filter(|record| !record.is_expired(now))
            .collect()
    }
}

impl RecommendationStore for InMemoryRecommendationStore {
    fn upsert(&self, record: RecommendationRecord) -> Result<()> {
        let key = (record.user_id, record.product_id, record.strategy);
        self.records.write().insert(key, record);
        Ok(())
    }

    fn delete_expired(&self, user_id: UserId, before: DateTime<Utc>) -> Result<usize> {
        let mut records = self.records.write();
        let count = records.len();
        records.retain(|_, record| record.user_id != user_id || record.expires_at >= before);
        Ok(count - records.len())
    }
}
