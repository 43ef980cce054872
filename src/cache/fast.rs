//! Fast Tier Module
//!
//! The bounded in-memory tier: encoded envelopes keyed by string, limited
//! by entry count and by a total byte budget, with LRU eviction.
//!
//! The tier is type-agnostic: it stores only opaque envelope bytes plus
//! copies of the expiration metadata, so freshness checks never decode a
//! payload.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::cache::envelope::is_expired_at;
use crate::cache::index::KeyIndex;
use crate::error::{CacheError, Result};

// == Fast Slot ==
/// One fast-tier entry: encoded envelope bytes plus expiration metadata.
#[derive(Debug, Clone)]
pub struct FastSlot {
    /// Encoded envelope, exactly what the durable tier holds for this key
    pub bytes: Vec<u8>,
    /// Creation timestamp carried alongside the bytes
    pub created_at: DateTime<Utc>,
    /// TTL in minutes, None = no expiration
    pub expiration_minutes: Option<f64>,
}

impl FastSlot {
    // == Constructor ==
    pub fn new(bytes: Vec<u8>, created_at: DateTime<Utc>, expiration_minutes: Option<f64>) -> Self {
        Self {
            bytes,
            created_at,
            expiration_minutes,
        }
    }

    // == Cost ==
    /// Byte cost charged against the tier budget.
    pub fn cost(&self) -> usize {
        self.bytes.len()
    }

    // == Is Expired ==
    /// Checks the slot's TTL against `now` without decoding the payload.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired_at(self.created_at, self.expiration_minutes, now)
    }
}

// == Fast Tier ==
/// Bounded in-memory store with LRU eviction.
///
/// The slot map and the key index are mutated only together; the index is
/// exactly the set of keys with a live slot.
#[derive(Debug)]
pub struct FastTier {
    /// Resident entries
    slots: HashMap<String, FastSlot>,
    /// Residency index in LRU order
    index: KeyIndex,
    /// Running total of resident bytes
    resident_bytes: usize,
    /// Maximum number of resident entries
    max_entries: usize,
    /// Total byte budget for resident entries
    max_cost_bytes: usize,
}

impl FastTier {
    // == Constructor ==
    /// Creates an empty tier with the given bounds.
    pub fn new(max_entries: usize, max_cost_bytes: usize) -> Self {
        Self {
            slots: HashMap::new(),
            index: KeyIndex::new(),
            resident_bytes: 0,
            max_entries,
            max_cost_bytes,
        }
    }

    // == Insert ==
    /// Stores a slot under `key`, overwriting any existing slot.
    ///
    /// Entries larger than the entire byte budget are rejected with
    /// [`CacheError::CapacityExceeded`] and the tier is left untouched.
    /// Otherwise the least recently used entries are evicted until both
    /// the count limit and the byte budget hold.
    ///
    /// Returns the number of entries evicted to make room.
    pub fn insert(&mut self, key: &str, slot: FastSlot) -> Result<usize> {
        let cost = slot.cost();
        if cost > self.max_cost_bytes {
            return Err(CacheError::CapacityExceeded {
                size: cost,
                limit: self.max_cost_bytes,
            });
        }

        // Overwrite: release the old slot's cost before re-admitting
        if let Some(old) = self.slots.remove(key) {
            self.resident_bytes -= old.cost();
            self.index.remove(key);
        }

        let mut evicted = 0;
        while self.slots.len() >= self.max_entries
            || self.resident_bytes + cost > self.max_cost_bytes
        {
            let Some(victim) = self.index.pop_lru() else {
                break;
            };
            if let Some(old) = self.slots.remove(&victim) {
                self.resident_bytes -= old.cost();
                evicted += 1;
            }
        }

        self.resident_bytes += cost;
        self.slots.insert(key.to_string(), slot);
        self.index.touch(key);

        Ok(evicted)
    }

    // == Get ==
    /// Returns a copy of the slot under `key` and refreshes its recency.
    pub fn get(&mut self, key: &str) -> Option<FastSlot> {
        let slot = self.slots.get(key).cloned()?;
        self.index.touch(key);
        Some(slot)
    }

    // == Remove ==
    /// Drops the slot under `key`. Returns whether a slot was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.slots.remove(key) {
            Some(old) => {
                self.resident_bytes -= old.cost();
                self.index.remove(key);
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Drops every slot and resets the byte total.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.index.clear();
        self.resident_bytes = 0;
    }

    // == Sweep Expired ==
    /// Removes every expired slot, returning the removed keys.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let expired: Vec<String> = self
            .index
            .keys()
            .filter(|key| {
                // An index entry without a live slot is stale; sweep it too
                self.slots
                    .get(key.as_str())
                    .map(|slot| slot.is_expired_at(now))
                    .unwrap_or(true)
            })
            .cloned()
            .collect();

        for key in &expired {
            self.remove(key);
        }
        expired
    }

    // == Length ==
    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    // == Is Empty ==
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // == Resident Bytes ==
    /// Current total of resident bytes.
    pub fn resident_bytes(&self) -> usize {
        self.resident_bytes
    }

    // == Contains ==
    /// Checks whether `key` has a live slot.
    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }
}
