//! Short-TTL cache of ranked recommendation lists.
//!
//! Keys are scoped hierarchically per user (`recommendations:{user}:`)
//! so that invalidating one shopper's lists is a targeted prefix delete
//! rather than a wildcard scan over the whole keyspace.

use crate::service::Recommendation;
use data_store::{Result, Strategy, UserId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Cache-store collaborator interface.
///
/// A failing backend degrades gracefully: a failed `get` is a miss, a
/// failed `set` only loses the shortcut, a failed `delete_by_prefix`
/// only delays freshness.
pub trait RecommendationCache: Send + Sync {
    /// Fetch a cached list, `None` on miss or expiry
    fn get(&self, key: &str) -> Result<Option<Vec<Recommendation>>>;

    /// Store a list for `ttl`
    fn set(&self, key: &str, value: Vec<Recommendation>, ttl: Duration) -> Result<()>;

    /// Remove every key under `prefix`; returns how many were removed
    fn delete_by_prefix(&self, prefix: &str) -> Result<usize>;
}

/// Namespace holding all of one user's cached lists
pub fn user_cache_prefix(user_id: UserId) -> String {
    format!("recommendations:{}:", user_id)
}

/// Cache key for one `(user, strategy mix)` request.
///
/// Strategy names are sorted so equivalent requests share an entry.
pub fn recommendations_cache_key(user_id: UserId, strategies: &[Strategy]) -> String {
    let mut names: Vec<&str> = strategies.iter().map(|s| s.as_str()).collect();
    names.sort_unstable();
    format!("{}{}", user_cache_prefix(user_id), names.join(":"))
}

struct CacheEntry {
    value: Vec<Recommendation>,
    expires_at: Instant,
}

/// Process-local TTL cache.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, including any not yet swept
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl RecommendationCache for InMemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<Recommendation>>> {
        let entries = self.entries.read();
        let value = entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone());
        Ok(value)
    }

    fn set(&self, key: &str, value: Vec<Recommendation>, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write();
        // Sweep anything already expired while we hold the write lock
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_string(),
            CacheEntry { value, expires_at: now + ttl },
        );
        Ok(())
    }

    fn delete_by_prefix(&self, prefix: &str) -> Result<usize> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(product_id: u64, score: f32) -> Recommendation {
        Recommendation {
            product_id,
            score,
            strategy: Strategy::Trending,
            algorithm: "trending_analysis".to_string(),
            metadata: data_store::Metadata::new(),
        }
    }

    #[test]
    fn test_key_is_order_insensitive() {
        let a = recommendations_cache_key(1, &[Strategy::Trending, Strategy::Collaborative]);
        let b = recommendations_cache_key(1, &[Strategy::Collaborative, Strategy::Trending]);
        assert_eq!(a, b);
        assert!(a.starts_with(&user_cache_prefix(1)));
        assert_ne!(a, recommendations_cache_key(2, &[Strategy::Collaborative, Strategy::Trending]));
    }

    #[test]
    fn test_set_get_round_trip() {
        let cache = InMemoryCache::new();
        cache.set("k", vec![entry(1, 0.9)], Duration::from_secs(60)).unwrap();

        let got = cache.get("k").unwrap().unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].product_id, 1);
        assert!(cache.get("other").unwrap().is_none());
    }

    #[test]
    fn test_expired_entry_is_a_miss() {
        let cache = InMemoryCache::new();
        cache.set("k", vec![entry(1, 0.9)], Duration::from_secs(0)).unwrap();
        assert!(cache.get("k").unwrap().is_none());
    }

    #[test]
    fn test_prefix_delete_scopes_to_user() {
        let cache = InMemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.set(&recommendations_cache_key(1, &Strategy::DEFAULT), vec![entry(1, 0.5)], ttl).unwrap();
        cache.set(&recommendations_cache_key(1, &[Strategy::Trending]), vec![entry(2, 0.4)], ttl).unwrap();
        cache.set(&recommendations_cache_key(2, &Strategy::DEFAULT), vec![entry(3, 0.3)], ttl).unwrap();

        let removed = cache.delete_by_prefix(&user_cache_prefix(1)).unwrap();
        assert_eq!(removed, 2);

        assert!(cache.get(&recommendations_cache_key(1, &Strategy::DEFAULT)).unwrap().is_none());
        assert!(cache.get(&recommendations_cache_key(2, &Strategy::DEFAULT)).unwrap().is_some());
    }
}
