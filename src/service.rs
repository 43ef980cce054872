//! Cache Service Contract
//!
//! The abstract interface application code depends on. Both the tiered
//! [`CacheManager`] and the in-memory [`CacheServiceMock`] implement it,
//! so consumers can be tested without real storage side effects.
//!
//! [`CacheManager`]: crate::cache::CacheManager
//! [`CacheServiceMock`]: crate::mock::CacheServiceMock

use serde::{de::DeserializeOwned, Serialize};

use crate::expiration::CacheExpiration;

// == Cacheable ==
/// Bound alias for values the cache can store.
pub trait Cacheable: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}
impl<T> Cacheable for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

// == Cache Service ==
/// The external API surface of the cache.
///
/// All methods are best-effort and never fail: a cache problem is logged
/// and surfaces to the caller as a miss at worst, forcing a refetch from
/// the caller's own source of truth.
pub trait CacheService: Send + Sync {
    /// Stores a payload under `key` with the given expiration policy.
    ///
    /// Overwrites any existing entry under the same key.
    fn save<T: Cacheable>(&self, payload: &T, key: &str, expiration: CacheExpiration);

    /// Retrieves the payload stored under `key`, or `None` on a miss.
    ///
    /// A returned value is guaranteed fresh at the time of the call.
    fn get<T: Cacheable>(&self, key: &str) -> Option<T>;

    /// Removes the entry stored under `key`. Removing an absent key is a no-op.
    fn remove_object(&self, key: &str);

    /// Empties the cache entirely, including entries that never expire.
    fn clear_cache(&self);

    /// Removes every expired entry without touching fresh ones.
    fn clear_expired_cache(&self);
}
