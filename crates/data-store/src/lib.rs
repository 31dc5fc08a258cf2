//! # Data Store Crate
//!
//! Domain types and the data-access surface of the recommendation core.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (BehaviorEvent, Product, RecommendationRecord)
//! - **behavior**: The append-only behavior log, source of all signals
//! - **catalog**: Catalog collaborator trait + in-memory index
//! - **orders**: Order-history collaborator trait + in-memory index
//! - **error**: The shared store error type
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_store::{BehaviorEvent, BehaviorLog, BehaviorType};
//! use chrono::Utc;
//!
//! let log = BehaviorLog::new();
//! log.append(
//!     BehaviorEvent::new(1, BehaviorType::Purchase, Utc::now()).with_product(42),
//! );
//!
//! let purchased = log.purchased_products(1);
//! assert!(purchased.contains(&42));
//! ```

// Public modules
pub mod behavior;
pub mod catalog;
pub mod error;
pub mod orders;
pub mod types;

// Re-export commonly used types for convenience
pub use behavior::BehaviorLog;
pub use catalog::{CatalogReader, InMemoryCatalog};
pub use error::{Result, StoreError};
pub use orders::{InMemoryOrders, OrderReader};
pub use types::{
    // Type aliases
    CategoryId,
    Metadata,
    OrderId,
    ProductId,
    SellerId,
    UserId,
    // Core types
    BehaviorEvent,
    Product,
    RecommendationRecord,
    // Enums
    BehaviorType,
    Strategy,
};
