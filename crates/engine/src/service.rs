//! # Recommendation Service
//!
//! This module coordinates the whole recommendation flow:
//! 1. Cache lookup for the `(user, strategy mix)` key
//! 2. On miss, fan out the requested strategies in parallel
//! 3. Fuse and deduplicate the candidates
//! 4. Cache the full ranked list (1 hour TTL)
//! 5. Persist the top entries as 24-hour records, best effort
//! 6. Return the top `limit` entries
//!
//! Nothing here is fatal: a failed strategy contributes an empty list, a
//! failed cache or persistence write is logged and the request still
//! returns its computed result. Callers always get a (possibly empty)
//! ranked list, never an error.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use data_store::{
    BehaviorEvent, BehaviorLog, BehaviorType, CatalogReader, CategoryId, Metadata, OrderReader,
    ProductId, RecommendationRecord, Strategy, UserId,
};
use strategies::{
    Candidate, CollaborativeFilter, ContentBasedFilter, FrequentlyBoughtTogether, ScoringStrategy,
    ShopperContext, SimilarProductFinder, TrendingAnalyzer, build_shopper_context,
};

use crate::cache::{RecommendationCache, recommendations_cache_key, user_cache_prefix};
use crate::store::RecommendationStore;

/// One entry of a ranked recommendation list returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product_id: ProductId,
    pub score: f32,
    pub strategy: Strategy,
    pub algorithm: String,
    pub metadata: Metadata,
}

impl From<Candidate> for Recommendation {
    fn from(candidate: Candidate) -> Self {
        Self {
            product_id: candidate.product_id,
            score: candidate.score,
            strategy: candidate.strategy,
            algorithm: candidate.algorithm,
            metadata: candidate.metadata,
        }
    }
}

/// One observed shopper interaction, as reported by a calling feature.
#[derive(Debug, Clone)]
pub struct TrackRequest {
    pub user_id: UserId,
    pub behavior_type: BehaviorType,
    pub product_id: Option<ProductId>,
    pub category_id: Option<CategoryId>,
    pub weight: f32,
    pub metadata: Metadata,
    pub session_id: Option<String>,
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl TrackRequest {
    /// Start a request with weight 1.0 and no optional context
    pub fn new(user_id: UserId, behavior_type: BehaviorType) -> Self {
        Self {
            user_id,
            behavior_type,
            product_id: None,
            category_id: None,
            weight: 1.0,
            metadata: Metadata::new(),
            session_id: None,
            ip_address: None,
            user_agent: None,
        }
    }

    /// Attach the product this interaction refers to
    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// Attach the category this interaction refers to
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Override the default weight of 1.0
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    /// Attach opaque context to the event
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach the originating session id
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Attach client context captured at the calling edge
    pub fn with_client(mut self, ip_address: Option<IpAddr>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }
}

/// Orchestrates behavior ingestion and recommendation requests.
///
/// Constructed with its collaborators injected so tests can swap any of
/// them; there is no process-wide instance.
#[derive(Clone)]
pub struct RecommendationService {
    behavior: Arc<BehaviorLog>,
    cache: Arc<dyn RecommendationCache>,
    store: Arc<dyn RecommendationStore>,
    strategies: HashMap<Strategy, Arc<dyn ScoringStrategy>>,

    /// TTL of cached ranked lists
    cache_ttl: Duration,

    /// How many top entries are persisted per computation
    persist_limit: usize,

    /// Per-strategy time budget; an elapsed budget counts as a failure
    strategy_budget: Duration,
}

impl RecommendationService {
    /// Create a service with the five default strategies wired to the
    /// given collaborators
    pub fn new(
        behavior: Arc<BehaviorLog>,
        catalog: Arc<dyn CatalogReader>,
        orders: Arc<dyn OrderReader>,
        cache: Arc<dyn RecommendationCache>,
        store: Arc<dyn RecommendationStore>,
    ) -> Self {
        let mut strategies: HashMap<Strategy, Arc<dyn ScoringStrategy>> = HashMap::new();
        strategies.insert(
            Strategy::Collaborative,
            Arc::new(CollaborativeFilter::new(Arc::clone(&behavior))),
        );
        strategies.insert(
            Strategy::ContentBased,
            Arc::new(ContentBasedFilter::new(Arc::clone(&catalog))),
        );
        strategies.insert(
            Strategy::Trending,
            Arc::new(TrendingAnalyzer::new(Arc::clone(&behavior), Arc::clone(&catalog))),
        );
        strategies.insert(
            Strategy::Similar,
            Arc::new(SimilarProductFinder::new(Arc::clone(&catalog))),
        );
        strategies.insert(
            Strategy::FrequentlyBought,
            Arc::new(FrequentlyBoughtTogether::new(orders)),
        );

        Self {
            behavior,
            cache,
            store,
            strategies,
            cache_ttl: Duration::from_secs(3600),
            persist_limit: 20,
            strategy_budget: Duration::from_secs(5),
        }
    }

    /// Replace the implementation registered for a strategy's kind
    pub fn with_strategy(mut self, strategy: Arc<dyn ScoringStrategy>) -> Self {
        self.strategies.insert(strategy.kind(), strategy);
        self
    }

    /// Configure the ranked-list cache TTL (default: 1 hour)
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Configure how many top entries are persisted (default: 20)
    pub fn with_persist_limit(mut self, limit: usize) -> Self {
        self.persist_limit = limit;
        self
    }

    /// Configure the per-strategy time budget (default: 5 seconds)
    pub fn with_strategy_budget(mut self, budget: Duration) -> Self {
        self.strategy_budget = budget;
        self
    }

    /// Record one shopper interaction.
    ///
    /// Fire-and-forget: invalid input is a logged no-op and collaborator
    /// failures never surface to the calling feature. Returns the
    /// appended event, or `None` when the request was rejected.
    pub fn track_behavior(&self, request: TrackRequest) -> Option<BehaviorEvent> {
        if !request.weight.is_finite() || request.weight < 0.0 {
            warn!(
                user_id = request.user_id,
                weight = request.weight,
                "Ignoring behavior event with invalid weight"
            );
            return None;
        }

        let event = BehaviorEvent {
            user_id: request.user_id,
            behavior_type: request.behavior_type,
            product_id: request.product_id,
            category_id: request.category_id,
            weight: request.weight,
            metadata: request.metadata,
            session_id: request.session_id,
            ip_address: request.ip_address,
            user_agent: request.user_agent,
            created_at: Utc::now(),
        };
        self.behavior.append(event.clone());

        // The user's cached lists are now stale; a failed delete only
        // delays freshness until the TTL runs out
        if let Err(error) = self.cache.delete_by_prefix(&user_cache_prefix(request.user_id)) {
            warn!(
                user_id = request.user_id,
                error = %error,
                "Failed to invalidate cached recommendations"
            );
        }

        debug!(
            user_id = request.user_id,
            behavior = event.behavior_type.as_str(),
            "Tracked behavior"
        );
        Some(event)
    }

    /// Compute (or fetch) the ranked recommendation list for a user.
    ///
    /// An empty `requested` slice means the default mix of
    /// collaborative, content-based, and trending.
    pub async fn get_recommendations(
        &self,
        user_id: UserId,
        limit: usize,
        requested: &[Strategy],
    ) -> Vec<Recommendation> {
        let started = Instant::now();
        let kinds = self.normalize_request(requested);
        let key = recommendations_cache_key(user_id, &kinds);

        match self.cache.get(&key) {
            Ok(Some(mut cached)) => {
                info!(user_id, cache_hit = true, "Returning cached recommendations");
                cached.truncate(limit);
                return cached;
            }
            Ok(None) => {}
            Err(error) => {
                warn!(user_id, error = %error, "Cache read failed; recomputing");
            }
        }

        let now = Utc::now();
        let context = build_shopper_context(&self.behavior, user_id, now);

        let candidates = self.run_strategies(&kinds, &context).await;
        let ranked: Vec<Recommendation> = fusion::fuse(candidates)
            .into_iter()
            .map(Recommendation::from)
            .collect();

        if let Err(error) = self.cache.set(&key, ranked.clone(), self.cache_ttl) {
            warn!(user_id, error = %error, "Failed to cache recommendations");
        }

        self.persist(user_id, &ranked, now);

        info!(
            user_id,
            count = ranked.len(),
            elapsed = ?started.elapsed(),
            "Computed recommendations"
        );

        let mut top = ranked;
        top.truncate(limit);
        top
    }

    /// Deduplicate the requested mix, drop non-runnable entries, and
    /// fall back to the default mix when nothing was requested.
    fn normalize_request(&self, requested: &[Strategy]) -> Vec<Strategy> {
        let requested = if requested.is_empty() {
            &Strategy::DEFAULT[..]
        } else {
            requested
        };

        let mut kinds = Vec::new();
        for &kind in requested {
            if kind == Strategy::Hybrid {
                warn!("`hybrid` is an output label, not a runnable strategy; skipping");
                continue;
            }
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }

    /// Run the requested strategies concurrently and concatenate what
    /// survives.
    ///
    /// Strategies are pure reads over shared snapshots, so each runs on
    /// the blocking pool with no coordination. A strategy that fails,
    /// panics, or exceeds its budget contributes nothing; the others
    /// proceed unaffected.
    async fn run_strategies(
        &self,
        kinds: &[Strategy],
        context: &ShopperContext,
    ) -> Vec<Candidate> {
        let mut handles = Vec::new();
        for &kind in kinds {
            let Some(strategy) = self.strategies.get(&kind) else {
                warn!(strategy = %kind, "No implementation registered; skipping");
                continue;
            };
            let strategy = Arc::clone(strategy);
            let context = context.clone();
            handles.push((
                kind,
                tokio::task::spawn_blocking(move || strategy.recommend(&context)),
            ));
        }

        let mut candidates = Vec::new();
        for (kind, handle) in handles {
            match tokio::time::timeout(self.strategy_budget, handle).await {
                Ok(Ok(Ok(found))) => {
                    debug!(strategy = %kind, count = found.len(), "Strategy completed");
                    candidates.extend(found);
                }
                Ok(Ok(Err(error))) => {
                    warn!(strategy = %kind, error = %error, "Strategy failed; contributing nothing");
                }
                Ok(Err(join_error)) => {
                    warn!(strategy = %kind, error = %join_error, "Strategy panicked; contributing nothing");
                }
                Err(_) => {
                    warn!(
                        strategy = %kind,
                        budget = ?self.strategy_budget,
                        "Strategy exceeded its time budget; contributing nothing"
                    );
                }
            }
        }
        candidates
    }

    /// Persist the top entries as 24-hour records, best effort.
    fn persist(&self, user_id: UserId, ranked: &[Recommendation], now: DateTime<Utc>) {
        if let Err(error) = self.store.delete_expired(user_id, now) {
            warn!(user_id, error = %error, "Failed to clear expired recommendation records");
        }

        for recommendation in ranked.iter().take(self.persist_limit) {
            let record = RecommendationRecord::new(
                user_id,
                recommendation.product_id,
                recommendation.strategy,
                recommendation.score,
                recommendation.algorithm.clone(),
                recommendation.metadata.clone(),
                now,
            );
            if let Err(error) = self.store.upsert(record) {
                warn!(
                    user_id,
                    product_id = recommendation.product_id,
                    error = %error,
                    "Failed to persist recommendation"
                );
            }
        }
    }
}
