//! Helper to build a ShopperContext from the behavior log.
//!
//! The context is a gather-once snapshot of everything the strategies
//! need about the target user, so candidate generation never goes back
//! to the log for the same user mid-request.

use crate::similarity::UserProfile;
use chrono::{DateTime, Utc};
use data_store::{BehaviorLog, CategoryId, ProductId, UserId};
use std::collections::{HashMap, HashSet};

/// Per-request snapshot of one shopper's history.
#[derive(Debug, Clone)]
pub struct ShopperContext {
    pub user_id: UserId,
    /// When this request started; all windowed computations key off it
    pub requested_at: DateTime<Utc>,
    /// Products the user has purchased (exclusion set)
    pub purchased: HashSet<ProductId>,
    /// Purchased product ids, newest first, deduplicated
    pub recent_purchases: Vec<ProductId>,
    /// Accumulated interaction weight per category
    pub category_weights: HashMap<CategoryId, f32>,
    /// Sparse interaction profile over products and categories
    pub profile: UserProfile,
}

impl ShopperContext {
    /// Create an empty context for a user with no history
    pub fn new(user_id: UserId, requested_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            requested_at,
            purchased: HashSet::new(),
            recent_purchases: Vec::new(),
            category_weights: HashMap::new(),
            profile: UserProfile::new(),
        }
    }
}

/// Build a ShopperContext by aggregating the user's events.
///
/// A user with no events yields an empty context; strategies treat that
/// as "no personalized signal" rather than an error.
pub fn build_shopper_context(
    log: &BehaviorLog,
    user_id: UserId,
    requested_at: DateTime<Utc>,
) -> ShopperContext {
    let mut context = ShopperContext::new(user_id, requested_at);

    let events = log.events_for(user_id);
    if events.is_empty() {
        return context;
    }

    for event in &events {
        if let Some(category_id) = event.category_id {
            *context.category_weights.entry(category_id).or_insert(0.0) += event.weight;
        }
    }

    context.profile = UserProfile::from_events(&events);
    context.purchased = log.purchased_products(user_id);
    context.recent_purchases = log.recent_purchases(user_id, usize::MAX);

    context
}
