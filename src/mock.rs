//! Cache Service Mock Module
//!
//! An in-memory test double for [`CacheService`]: no envelope codec, no
//! tiers, no storage side effects. Values are kept as raw typed objects
//! alongside a parallel map of expiration deadlines, with the same
//! externally observable semantics as the real engine (expiry-on-read,
//! idempotent remove, full clear).

use std::any::Any;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::expiration::CacheExpiration;
use crate::service::{Cacheable, CacheService};

// == Mock State ==
/// Values and deadlines live behind one lock so they can't diverge.
#[derive(Default)]
struct MockState {
    objects: HashMap<String, Box<dyn Any + Send + Sync>>,
    deadlines: HashMap<String, DateTime<Utc>>,
}

// == Cache Service Mock ==
/// In-memory stand-in for the tiered cache.
#[derive(Default)]
pub struct CacheServiceMock {
    state: RwLock<MockState>,
}

impl CacheServiceMock {
    // == Constructor ==
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.state.read().objects.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.state.read().objects.is_empty()
    }
}

impl CacheService for CacheServiceMock {
    fn save<T: Cacheable>(&self, payload: &T, key: &str, expiration: CacheExpiration) {
        if key.is_empty() {
            return;
        }
        let mut state = self.state.write();
        state.objects.insert(key.to_string(), Box::new(payload.clone()));
        match expiration.as_duration() {
            Some(ttl) => {
                let deadline = Utc::now() + Duration::milliseconds(ttl.as_millis() as i64);
                state.deadlines.insert(key.to_string(), deadline);
            }
            None => {
                state.deadlines.remove(key);
            }
        }
    }

    fn get<T: Cacheable>(&self, key: &str) -> Option<T> {
        if key.is_empty() {
            return None;
        }
        let expired = {
            let state = self.state.read();
            state
                .deadlines
                .get(key)
                .map(|deadline| Utc::now() > *deadline)
                .unwrap_or(false)
        };
        if expired {
            self.remove_object(key);
            return None;
        }

        let state = self.state.read();
        state
            .objects
            .get(key)
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .cloned()
    }

    fn remove_object(&self, key: &str) {
        let mut state = self.state.write();
        state.objects.remove(key);
        state.deadlines.remove(key);
    }

    fn clear_cache(&self) {
        let mut state = self.state.write();
        state.objects.clear();
        state.deadlines.clear();
    }

    fn clear_expired_cache(&self) {
        let now = Utc::now();
        let mut state = self.state.write();
        let expired: Vec<String> = state
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline < now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            state.objects.remove(&key);
            state.deadlines.remove(&key);
        }
    }
}
