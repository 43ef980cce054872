//! Cache Engine Module
//!
//! Orchestrates the bounded fast tier and the unbounded durable tier
//! behind the [`CacheService`] contract.
//!
//! Reads consult the fast tier first and fall back to the durable tier,
//! re-promoting durable hits into the fast tier. Writes go to both tiers;
//! a fast-tier capacity rejection never blocks the durable write. The two
//! tiers are not updated atomically: a crash between writes can leave a
//! key in one tier only, which reads tolerate by re-validating freshness
//! from whichever tier answers.
//!
//! Every public method swallows errors after logging them; the `try_*`
//! methods expose the structured error kinds for tests and observability.

use std::collections::HashSet;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::cache::envelope::{self, Envelope};
use crate::cache::fast::{FastSlot, FastTier};
use crate::cache::stats::CacheStats;
use crate::cache::MAX_KEY_LENGTH;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::expiration::CacheExpiration;
use crate::service::{Cacheable, CacheService};
use crate::store::DurableStore;

// == Cache Manager ==
/// The tiered cache engine.
///
/// Thread-safe: the fast tier (slots, residency index, byte accounting)
/// lives behind one lock, and the durable store synchronizes internally.
pub struct CacheManager<S: DurableStore> {
    /// Bounded in-memory tier
    fast: RwLock<FastTier>,
    /// Unbounded durable tier, the system of record
    durable: S,
    /// Performance counters
    stats: RwLock<CacheStats>,
}

impl<S: DurableStore> CacheManager<S> {
    // == Constructor ==
    /// Creates an engine with the configured fast-tier bounds on top of
    /// the given durable store.
    pub fn new(config: &CacheConfig, durable: S) -> Self {
        Self {
            fast: RwLock::new(FastTier::new(config.max_entries, config.max_cost_bytes)),
            durable,
            stats: RwLock::new(CacheStats::new()),
        }
    }

    /// Returns the underlying durable store.
    pub fn durable(&self) -> &S {
        &self.durable
    }

    // == Stats ==
    /// Returns a snapshot of the counters with current residency gauges.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.read().clone();
        let fast = self.fast.read();
        stats.fast_entries = fast.len();
        stats.fast_bytes = fast.resident_bytes();
        stats
    }

    // == Key Validation ==
    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey);
        }
        Ok(())
    }

    // == Save ==
    /// Encodes an envelope and writes it to both tiers.
    ///
    /// An entry larger than the fast tier's entire byte budget fails the
    /// fast-tier write with [`CacheError::CapacityExceeded`]; the durable
    /// write still proceeds.
    pub fn try_save<T: Cacheable>(
        &self,
        payload: &T,
        key: &str,
        expiration: CacheExpiration,
    ) -> Result<()> {
        Self::validate_key(key)?;

        let created_at = Utc::now();
        let minutes = expiration.minutes();
        let bytes = envelope::encode(payload, created_at, minutes)?;

        let fast_result = {
            let mut fast = self.fast.write();
            fast.insert(key, FastSlot::new(bytes.clone(), created_at, minutes))
        };
        match fast_result {
            Ok(evicted) => {
                if evicted > 0 {
                    self.stats.write().record_evictions(evicted as u64);
                    debug!(key, evicted, "Evicted entries to admit new entry");
                }
            }
            Err(err @ CacheError::CapacityExceeded { .. }) => {
                warn!(key, error = %err, "Entry too large for the fast tier, storing durably only");
            }
            Err(err) => return Err(err),
        }

        self.durable.set(key, bytes)?;
        Ok(())
    }

    // == Get ==
    /// Retrieves a fresh payload, fast tier first, then durable tier with
    /// promotion back into the fast tier.
    ///
    /// An expired entry found in either tier is removed from both before
    /// the miss is reported, so a successful get never returns a stale
    /// payload.
    pub fn try_get<T: Cacheable>(&self, key: &str) -> Result<T> {
        Self::validate_key(key)?;

        // Bind the lookup first so the tier lock is released before any
        // removal below re-acquires it
        let fast_hit = self.fast.write().get(key);
        if let Some(slot) = fast_hit {
            if slot.is_expired_at(Utc::now()) {
                self.purge(key)?;
                self.stats.write().record_expirations(1);
                return Err(CacheError::Expired(key.to_string()));
            }
            let decoded: Envelope<T> = Envelope::decode(&slot.bytes)?;
            return Ok(decoded.payload);
        }

        let Some(bytes) = self.durable.get(key)? else {
            return Err(CacheError::NotFound(key.to_string()));
        };
        let decoded: Envelope<T> = Envelope::decode(&bytes)?;
        if decoded.is_expired() {
            self.purge(key)?;
            self.stats.write().record_expirations(1);
            return Err(CacheError::Expired(key.to_string()));
        }

        // Promote the durable hit, keeping the original creation time so
        // the entry still expires at its original deadline
        let promotion = self.fast.write().insert(
            key,
            FastSlot::new(bytes, decoded.created_at, decoded.expiration_minutes),
        );
        match promotion {
            Ok(evicted) => {
                if evicted > 0 {
                    self.stats.write().record_evictions(evicted as u64);
                }
            }
            Err(err @ CacheError::CapacityExceeded { .. }) => {
                debug!(key, error = %err, "Durable hit too large to promote");
            }
            Err(err) => return Err(err),
        }

        Ok(decoded.payload)
    }

    // == Remove ==
    /// Removes the key from both tiers. Absent keys are a no-op.
    pub fn try_remove(&self, key: &str) -> Result<()> {
        self.purge(key)
    }

    // == Clear ==
    /// Empties both tiers, including entries that never expire.
    pub fn try_clear(&self) -> Result<()> {
        self.fast.write().clear();
        self.durable.clear()?;
        Ok(())
    }

    // == Clear Expired ==
    /// Sweeps expired entries out of both tiers.
    ///
    /// Two independent passes: the fast-tier index is swept first (fast
    /// tier only), then every durable key is metadata-decoded and expired
    /// entries are removed from both tiers. The passes are not atomic
    /// across tiers. Undecodable durable blobs are logged and left alone.
    ///
    /// Returns the number of distinct keys removed.
    pub fn try_clear_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut removed: HashSet<String> = self
            .fast
            .write()
            .sweep_expired(now)
            .into_iter()
            .collect();

        for key in self.durable.keys()? {
            let Some(bytes) = self.durable.get(&key)? else {
                continue;
            };
            match envelope::decode_metadata(&bytes) {
                Ok(metadata) if metadata.is_expired_at(now) => {
                    self.purge(&key)?;
                    removed.insert(key);
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(key = %key, error = %err, "Skipping undecodable entry during sweep");
                }
            }
        }

        if !removed.is_empty() {
            self.stats.write().record_expirations(removed.len() as u64);
        }
        Ok(removed.len())
    }

    // == Purge ==
    /// Unconditional removal from both tiers.
    fn purge(&self, key: &str) -> Result<()> {
        self.fast.write().remove(key);
        self.durable.remove(key)?;
        Ok(())
    }

    #[cfg(test)]
    fn fast_slot(&self, key: &str) -> Option<FastSlot> {
        self.fast.write().get(key)
    }

    #[cfg(test)]
    fn fast_contains(&self, key: &str) -> bool {
        self.fast.read().contains(key)
    }
}

// == Cache Service Implementation ==
impl<S: DurableStore> CacheService for CacheManager<S> {
    fn save<T: Cacheable>(&self, payload: &T, key: &str, expiration: CacheExpiration) {
        if let Err(err) = self.try_save(payload, key, expiration) {
            warn!(key, error = %err, "Cache save failed");
        }
    }

    fn get<T: Cacheable>(&self, key: &str) -> Option<T> {
        match self.try_get(key) {
            Ok(payload) => {
                self.stats.write().record_hit();
                Some(payload)
            }
            Err(err) => {
                self.stats.write().record_miss();
                match err {
                    CacheError::NotFound(_) | CacheError::Expired(_) => {
                        debug!(key, error = %err, "Cache miss")
                    }
                    _ => warn!(key, error = %err, "Cache read failed"),
                }
                None
            }
        }
    }

    fn remove_object(&self, key: &str) {
        if let Err(err) = self.try_remove(key) {
            warn!(key, error = %err, "Cache removal failed");
        }
    }

    fn clear_cache(&self) {
        if let Err(err) = self.try_clear() {
            warn!(error = %err, "Cache clear failed");
        }
    }

    fn clear_expired_cache(&self) {
        match self.try_clear_expired() {
            Ok(0) => debug!("Expiration sweep removed no entries"),
            Ok(removed) => info!(removed, "Expiration sweep removed expired entries"),
            Err(err) => warn!(error = %err, "Expiration sweep failed"),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::{Deserialize, Serialize};
    use std::thread::sleep;
    use std::time::Duration;

    fn test_engine() -> CacheManager<MemoryStore> {
        let config = CacheConfig {
            max_entries: 100,
            max_cost_bytes: 1024 * 1024,
            ..CacheConfig::default()
        };
        CacheManager::new(&config, MemoryStore::new())
    }

    fn bounded_engine(max_entries: usize, max_cost_bytes: usize) -> CacheManager<MemoryStore> {
        let config = CacheConfig {
            max_entries,
            max_cost_bytes,
            ..CacheConfig::default()
        };
        CacheManager::new(&config, MemoryStore::new())
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        id: u64,
        title: String,
        price: f64,
    }

    fn sample_product() -> Product {
        Product {
            id: 1,
            title: "Wireless Earbuds".to_string(),
            price: 99.99,
        }
    }

    #[test]
    fn test_save_and_get_roundtrip() {
        let cache = test_engine();

        cache.save(&sample_product(), "product", CacheExpiration::Never);

        assert_eq!(cache.get::<Product>("product"), Some(sample_product()));
    }

    #[test]
    fn test_get_missing_key() {
        let cache = test_engine();
        assert_eq!(cache.get::<Product>("missing"), None);
    }

    #[test]
    fn test_save_writes_both_tiers() {
        let cache = test_engine();

        cache.save(&42u64, "answer", CacheExpiration::Never);

        assert!(cache.fast_contains("answer"));
        assert!(cache.durable().get("answer").unwrap().is_some());
    }

    #[test]
    fn test_empty_key_save_is_noop() {
        let cache = test_engine();

        let result = cache.try_save(&1u8, "", CacheExpiration::Never);
        assert!(matches!(result, Err(CacheError::InvalidKey)));
        assert!(cache.durable().is_empty());

        // The swallowing wrapper must not panic either
        cache.save(&1u8, "", CacheExpiration::Never);
        assert_eq!(cache.get::<u8>(""), None);
    }

    #[test]
    fn test_overwrite_returns_latest() {
        let cache = test_engine();

        cache.save(&"x".to_string(), "dup", CacheExpiration::Never);
        cache.save(&"y".to_string(), "dup", CacheExpiration::Never);

        assert_eq!(cache.get::<String>("dup"), Some("y".to_string()));
    }

    #[test]
    fn test_expired_entry_removed_from_both_tiers() {
        let cache = test_engine();

        cache.save(
            &7u32,
            "short",
            CacheExpiration::Custom(Duration::from_millis(20)),
        );
        assert_eq!(cache.get::<u32>("short"), Some(7));

        sleep(Duration::from_millis(50));

        assert_eq!(cache.get::<u32>("short"), None);
        // Fully removed, not just hidden
        assert!(!cache.fast_contains("short"));
        assert!(cache.durable().get("short").unwrap().is_none());
        assert_eq!(cache.get::<u32>("short"), None);
    }

    #[test]
    fn test_durable_fallback_and_promotion() {
        let cache = test_engine();

        cache.save(&sample_product(), "product", CacheExpiration::Never);
        let original = cache.fast_slot("product").unwrap();

        // Simulate a fast-tier wipe (e.g. a restart of the bounded tier)
        cache.fast.write().clear();
        assert!(!cache.fast_contains("product"));

        assert_eq!(cache.get::<Product>("product"), Some(sample_product()));

        // The durable hit was promoted with its creation time intact
        let promoted = cache.fast_slot("product").unwrap();
        assert_eq!(promoted.created_at, original.created_at);
    }

    #[test]
    fn test_expired_durable_entry_not_promoted() {
        let cache = test_engine();

        // Plant a back-dated envelope directly in the durable tier
        let created = Utc::now() - chrono::Duration::minutes(31);
        let bytes = envelope::encode(&"stale".to_string(), created, Some(30.0)).unwrap();
        cache.durable().set("old", bytes).unwrap();

        assert_eq!(cache.get::<String>("old"), None);
        assert!(!cache.fast_contains("old"));
        assert!(cache.durable().get("old").unwrap().is_none());
    }

    #[test]
    fn test_oversized_entry_skips_fast_tier_but_persists() {
        let cache = bounded_engine(10, 32);

        let big = "x".repeat(256);
        cache.save(&big, "big", CacheExpiration::Never);

        assert!(!cache.fast_contains("big"));
        // Served from the durable tier; promotion is refused again quietly
        assert_eq!(cache.get::<String>("big"), Some(big));
        assert!(!cache.fast_contains("big"));
    }

    #[test]
    fn test_eviction_keeps_durable_copy() {
        let cache = bounded_engine(2, 1024 * 1024);

        cache.save(&1u8, "a", CacheExpiration::Never);
        cache.save(&2u8, "b", CacheExpiration::Never);
        cache.save(&3u8, "c", CacheExpiration::Never);

        // "a" was evicted from the fast tier but survives durably
        assert!(!cache.fast_contains("a"));
        assert_eq!(cache.get::<u8>("a"), Some(1));
    }

    #[test]
    fn test_decode_type_mismatch_returns_none() {
        let cache = test_engine();

        cache.save(&sample_product(), "product", CacheExpiration::Never);

        assert_eq!(cache.get::<Vec<String>>("product"), None);
        // The entry is left in place for readers of the right type
        assert_eq!(cache.get::<Product>("product"), Some(sample_product()));
    }

    #[test]
    fn test_remove_object_is_idempotent() {
        let cache = test_engine();

        cache.save(&1u8, "a", CacheExpiration::Never);
        cache.remove_object("a");
        cache.remove_object("a");
        cache.remove_object("never_existed");

        assert_eq!(cache.get::<u8>("a"), None);
    }

    #[test]
    fn test_clear_cache_removes_immortal_entries() {
        let cache = test_engine();

        cache.save(&1u8, "a", CacheExpiration::Never);
        cache.save(&2u8, "b", CacheExpiration::Days(1.0));
        cache.clear_cache();

        assert_eq!(cache.get::<u8>("a"), None);
        assert_eq!(cache.get::<u8>("b"), None);
        assert!(cache.durable().is_empty());
        assert_eq!(cache.stats().fast_entries, 0);
    }

    #[test]
    fn test_sweep_is_selective() {
        let cache = test_engine();

        cache.save(
            &"doomed".to_string(),
            "a",
            CacheExpiration::Custom(Duration::from_millis(20)),
        );
        cache.save(&"kept".to_string(), "b", CacheExpiration::Hours(1.0));

        sleep(Duration::from_millis(50));
        let removed = cache.try_clear_expired().unwrap();

        assert_eq!(removed, 1);
        assert!(cache.durable().get("a").unwrap().is_none());
        assert_eq!(cache.get::<String>("b"), Some("kept".to_string()));
    }

    #[test]
    fn test_sweep_covers_durable_only_entries() {
        let cache = test_engine();

        // Expired entry present only in the durable tier
        let created = Utc::now() - chrono::Duration::hours(2);
        let bytes = envelope::encode(&1u8, created, Some(60.0)).unwrap();
        cache.durable().set("cold", bytes).unwrap();

        let removed = cache.try_clear_expired().unwrap();

        assert_eq!(removed, 1);
        assert!(cache.durable().get("cold").unwrap().is_none());
    }

    #[test]
    fn test_sweep_leaves_undecodable_blobs() {
        let cache = test_engine();

        cache.durable().set("junk", b"not an envelope".to_vec()).unwrap();

        let removed = cache.try_clear_expired().unwrap();

        assert_eq!(removed, 0);
        assert!(cache.durable().get("junk").unwrap().is_some());
    }

    #[test]
    fn test_stats_track_hits_misses_and_residency() {
        let cache = test_engine();

        cache.save(&1u8, "a", CacheExpiration::Never);
        cache.get::<u8>("a");
        cache.get::<u8>("absent");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.fast_entries, 1);
        assert!(stats.fast_bytes > 0);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_concurrent_access() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(bounded_engine(16, 1024 * 1024));
        let mut handles = Vec::new();

        for worker in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    let key = format!("key{}", i % 10);
                    cache.save(&(worker * 1000 + i), &key, CacheExpiration::Never);
                    let _ = cache.get::<i32>(&key);
                    if i % 7 == 0 {
                        cache.remove_object(&key);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = cache.stats();
        assert!(stats.fast_entries <= 16);
    }
}
