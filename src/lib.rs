//! Tiercache - An embeddable two-tier object cache
//!
//! Pairs a bounded in-memory fast tier with an unbounded durable tier
//! behind one service contract, with per-entry TTL expiration and
//! namespaced key derivation for different data categories.
//!
//! Callers never touch the tiers directly: everything goes through
//! [`CacheService`], which [`CacheManager`] implements by consulting the
//! fast tier first, falling back to the durable tier, and re-promoting
//! durable hits. The cache is best-effort by contract — a cache failure
//! is logged and surfaces as a miss, never as an error to the caller.
//!
//! ```no_run
//! use tiercache::{
//!     CacheConfig, CacheExpiration, CacheManager, CacheService, FileStore,
//! };
//!
//! # fn main() -> tiercache::Result<()> {
//! let config = CacheConfig::from_env();
//! let store = FileStore::open(&config.storage_path)?;
//! let cache = CacheManager::new(&config, store);
//!
//! cache.save(&vec![1, 2, 3], "recent_ids", CacheExpiration::Minutes(30.0));
//! let ids: Option<Vec<i32>> = cache.get("recent_ids");
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod expiration;
pub mod keys;
pub mod mock;
pub mod service;
pub mod store;
pub mod tasks;

pub use cache::{CacheManager, CacheStats};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use expiration::CacheExpiration;
pub use keys::{CacheCategory, DefaultKeyPolicy, KeyPolicy};
pub use mock::CacheServiceMock;
pub use service::{Cacheable, CacheService};
pub use store::{DurableStore, FileStore, MemoryStore};
pub use tasks::spawn_sweep_task;
