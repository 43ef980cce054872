//! Cache Module
//!
//! The tiered caching engine: envelope codec, bounded fast tier with its
//! residency index, statistics, and the orchestrating engine.

mod engine;
mod envelope;
mod fast;
mod index;
mod stats;


// Re-export public types
pub use engine::CacheManager;
pub use envelope::{decode_metadata, encode, Envelope, EnvelopeMetadata};
pub use fast::{FastSlot, FastTier};
pub use index::KeyIndex;
pub use stats::CacheStats;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
