//! Core domain types for the recommendation system.
//!
//! This module defines the facts the engine computes over: behavior
//! events, catalog products, and persisted recommendation records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

// =============================================================================
// Type Aliases
// =============================================================================
// These make the domain clearer and prevent mixing up the various ids

/// Unique identifier for a shopper
pub type UserId = u64;

/// Unique identifier for a catalog product
pub type ProductId = u64;

/// Unique identifier for a product category
pub type CategoryId = u64;

/// Unique identifier for a seller
pub type SellerId = u64;

/// Unique identifier for a completed order
pub type OrderId = u64;

/// Opaque key-value context attached to events and recommendations
pub type Metadata = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// Behavior Types
// =============================================================================

/// The kinds of shopper activity the engine learns from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorType {
    View,
    AddToCart,
    RemoveFromCart,
    Purchase,
    Wishlist,
    Review,
    Search,
    CategoryView,
}

impl BehaviorType {
    /// Wire name for this behavior type
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviorType::View => "view",
            BehaviorType::AddToCart => "add_to_cart",
            BehaviorType::RemoveFromCart => "remove_from_cart",
            BehaviorType::Purchase => "purchase",
            BehaviorType::Wishlist => "wishlist",
            BehaviorType::Review => "review",
            BehaviorType::Search => "search",
            BehaviorType::CategoryView => "category_view",
        }
    }

    /// Parse a wire name back into a behavior type
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "view" => Some(BehaviorType::View),
            "add_to_cart" => Some(BehaviorType::AddToCart),
            "remove_from_cart" => Some(BehaviorType::RemoveFromCart),
            "purchase" => Some(BehaviorType::Purchase),
            "wishlist" => Some(BehaviorType::Wishlist),
            "review" => Some(BehaviorType::Review),
            "search" => Some(BehaviorType::Search),
            "category_view" => Some(BehaviorType::CategoryView),
            _ => None,
        }
    }
}

/// An immutable fact about one shopper interaction.
///
/// Events are only ever appended to the [`BehaviorLog`](crate::BehaviorLog);
/// nothing in the system mutates or deletes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorEvent {
    pub user_id: UserId,
    pub behavior_type: BehaviorType,
    pub product_id: Option<ProductId>,
    pub category_id: Option<CategoryId>,
    /// Importance of this interaction; must be finite and >= 0
    pub weight: f32,
    pub metadata: Metadata,
    pub session_id: Option<String>,
    pub ip_address: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BehaviorEvent {
    /// Create an event with weight 1.0 and no optional context
    pub fn new(user_id: UserId, behavior_type: BehaviorType, created_at: DateTime<Utc>) -> Self {
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
            created_at,
        }
    }

    /// Attach the product this event refers to
    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// Attach the category this event refers to
    pub fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Override the default weight of 1.0
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }
}

// =============================================================================
// Catalog Types
// =============================================================================

/// A product as seen through the catalog collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    pub category_id: CategoryId,
    pub seller_id: SellerId,
    pub is_active: bool,
}

// =============================================================================
// Recommendation Types
// =============================================================================

/// Which scoring strategy produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Collaborative,
    ContentBased,
    Trending,
    Similar,
    FrequentlyBought,
    /// Fused label for products recommended by more than one strategy
    Hybrid,
}

impl Strategy {
    /// The default strategy mix for a recommendation request
    pub const DEFAULT: [Strategy; 3] =
        [Strategy::Collaborative, Strategy::ContentBased, Strategy::Trending];

    /// Wire name for this strategy
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Collaborative => "collaborative",
            Strategy::ContentBased => "content_based",
            Strategy::Trending => "trending",
            Strategy::Similar => "similar",
            Strategy::FrequentlyBought => "frequently_bought",
            Strategy::Hybrid => "hybrid",
        }
    }

    /// Parse a wire name back into a strategy
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "collaborative" => Some(Strategy::Collaborative),
            "content_based" => Some(Strategy::ContentBased),
            "trending" => Some(Strategy::Trending),
            "similar" => Some(Strategy::Similar),
            "frequently_bought" => Some(Strategy::FrequentlyBought),
            "hybrid" => Some(Strategy::Hybrid),
            _ => None,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long a persisted recommendation stays fresh
pub const RECORD_TTL_HOURS: i64 = 24;

/// A persisted recommendation decision for offline inspection.
///
/// At most one record exists per `(user_id, product_id, strategy)`;
/// recomputation upserts in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub strategy: Strategy,
    /// Confidence score in [0, 1]
    pub score: f32,
    /// Identifier of the scoring method that produced this record
    pub algorithm: String,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
    /// Always `created_at` + 24 hours
    pub expires_at: DateTime<Utc>,
}

impl RecommendationRecord {
    /// Build a record expiring 24 hours after `created_at`
    pub fn new(
        user_id: UserId,
        product_id: ProductId,
        strategy: Strategy,
        score: f32,
        algorithm: impl Into<String>,
        metadata: Metadata,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            product_id,
            strategy,
            score,
            algorithm: algorithm.into(),
            metadata,
            created_at,
            expires_at: created_at + Duration::hours(RECORD_TTL_HOURS),
        }
    }

    /// Whether this record is stale and should be ignored
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
