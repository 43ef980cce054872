//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! None of these errors escape through the [`CacheService`] trait: the
//! engine logs and swallows them so a cache failure can never take the
//! caller down with it. They are surfaced by the internal `try_*` methods
//! for tests and observability.
//!
//! [`CacheService`]: crate::service::CacheService

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not present in either tier
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Stored bytes are structurally invalid (e.g. a corrupt storage file)
    #[error("Invalid data in cache: {0}")]
    InvalidData(String),

    /// Envelope encoding or decoding failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// Entry was present but past its TTL
    #[error("Key expired: {0}")]
    Expired(String),

    /// Durable storage access failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A single entry is larger than the fast tier's entire byte budget
    #[error("Capacity exceeded: entry of {size} bytes exceeds fast tier budget of {limit} bytes")]
    CapacityExceeded {
        /// Encoded size of the offending entry
        size: usize,
        /// Fast tier total byte budget
        limit: usize,
    },

    /// Empty or over-long cache key
    #[error("Invalid cache key")]
    InvalidKey,

    /// Anything that doesn't fit the kinds above
    #[error("Unknown cache error: {0}")]
    Unknown(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
