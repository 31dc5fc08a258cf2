//! Sparse weighted profiles and cosine similarity.
//!
//! A profile maps the entities a user has interacted with (products and
//! categories) to accumulated interaction weight. Profiles are built on
//! demand from behavior events and live only for the duration of one
//! similarity computation.

use data_store::{BehaviorEvent, CategoryId, ProductId};
use std::collections::HashMap;

/// Entity key of one profile dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKey {
    Product(ProductId),
    Category(CategoryId),
}

/// Sparse weighted interaction vector for one user.
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    weights: HashMap<ProfileKey, f32>,
}

impl UserProfile {
    /// Create an empty profile
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a user's events into entity-weight sums.
    ///
    /// An event referencing both a product and a category contributes
    /// its weight to both keys.
    pub fn from_events(events: &[BehaviorEvent]) -> Self {
        let mut profile = Self::new();
        for event in events {
            if let Some(product_id) = event.product_id {
                profile.add(ProfileKey::Product(product_id), event.weight);
            }
            if let Some(category_id) = event.category_id {
                profile.add(ProfileKey::Category(category_id), event.weight);
            }
        }
        profile
    }

    /// Accumulate weight onto one dimension
    pub fn add(&mut self, key: ProfileKey, weight: f32) {
        *self.weights.entry(key).or_insert(0.0) += weight;
    }

    /// Weight of one dimension (0.0 when absent)
    pub fn weight(&self, key: &ProfileKey) -> f32 {
        self.weights.get(key).copied().unwrap_or(0.0)
    }

    /// Whether this profile has no dimensions
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Number of dimensions with accumulated weight
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    fn norm(&self) -> f32 {
        self.weights.values().map(|w| w * w).sum::<f32>().sqrt()
    }
}

/// Cosine similarity between two profiles.
///
/// Dot product over the union of keys divided by the product of the
/// Euclidean norms; `0.0` when either norm is zero. Symmetric, and in
/// `[0, 1]` for the non-negative weights this system produces.
pub fn cosine_similarity(a: &UserProfile, b: &UserProfile) -> f32 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    // Keys missing from `b` contribute nothing, so iterating `a` covers
    // the union.
    let dot: f32 = a
        .weights
        .iter()
        .map(|(key, weight)| weight * b.weight(key))
        .sum();

    (dot / (norm_a * norm_b)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use data_store::BehaviorType;

    fn profile(entries: &[(ProfileKey, f32)]) -> UserProfile {
        let mut profile = UserProfile::new();
        for &(key, weight) in entries {
            profile.add(key, weight);
        }
        profile
    }

    #[test]
    fn test_self_similarity_is_one() {
        let a = profile(&[
            (ProfileKey::Product(1), 2.0),
            (ProfileKey::Product(2), 1.0),
            (ProfileKey::Category(7), 0.5),
        ]);
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = profile(&[(ProfileKey::Product(1), 1.0), (ProfileKey::Product(2), 3.0)]);
        let b = profile(&[(ProfileKey::Product(2), 2.0), (ProfileKey::Category(5), 1.0)]);
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
        assert!(ab > 0.0 && ab <= 1.0);
    }

    #[test]
    fn test_zero_norm_yields_zero() {
        let a = profile(&[(ProfileKey::Product(1), 1.0)]);
        let empty = UserProfile::new();
        assert_eq!(cosine_similarity(&a, &empty), 0.0);
        assert_eq!(cosine_similarity(&empty, &a), 0.0);
    }

    #[test]
    fn test_disjoint_profiles_are_orthogonal() {
        let a = profile(&[(ProfileKey::Product(1), 1.0)]);
        let b = profile(&[(ProfileKey::Product(2), 1.0)]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_from_events_sums_both_references() {
        let now = Utc::now();
        let events = vec![
            data_store::BehaviorEvent::new(1, BehaviorType::View, now)
                .with_product(10)
                .with_category(100),
            data_store::BehaviorEvent::new(1, BehaviorType::Purchase, now)
                .with_product(10)
                .with_weight(3.0),
        ];

        let profile = UserProfile::from_events(&events);
        assert_eq!(profile.len(), 2);
        assert!((profile.weight(&ProfileKey::Product(10)) - 4.0).abs() < f32::EPSILON);
        assert!((profile.weight(&ProfileKey::Category(100)) - 1.0).abs() < f32::EPSILON);
    }
}
