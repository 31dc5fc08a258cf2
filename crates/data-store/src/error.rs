//! Error type for collaborator stores.

use thiserror::Error;

/// Errors raised by catalog, order, cache, and persistence backends.
///
/// Every failure here is transient from the engine's point of view: the
/// affected strategy or sub-step contributes nothing and the request
/// proceeds with best-effort results.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backing store replied with data the caller cannot use
    #[error("corrupt reply from store: {0}")]
    Corrupt(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, StoreError>;
