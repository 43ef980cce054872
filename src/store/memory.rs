//! In-memory durable store.
//!
//! Volatile backing for tests and caches that don't need to survive a
//! restart. Thread-safe without external synchronization.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;
use crate::store::DurableStore;

// == Memory Store ==
/// In-memory key-value store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.blobs.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.blobs.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.blobs.read().keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        self.blobs.write().clear();
        Ok(())
    }
}
