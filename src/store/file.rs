//! File-backed durable store.
//!
//! Holds the blob map in memory and writes the whole map through to a
//! single file on every mutation, so the file is always the current state
//! of the durable tier.
//!
//! # File Format
//!
//! ```text
//! magic (4 bytes): "TCHE"
//! version (1 byte): 1
//! body (variable): JSON map of key to blob bytes
//! ```
//!
//! Saves go to a temp file first and are renamed into place, so a crash
//! mid-write never corrupts the previous state.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::DurableStore;

/// File format magic bytes
const MAGIC: &[u8; 4] = b"TCHE";
/// Current file format version
const VERSION: u8 = 1;
/// Header length: magic + version
const HEADER_LEN: usize = 5;

// == File Store ==
/// File-backed key-value store.
#[derive(Debug)]
pub struct FileStore {
    /// Path of the storage file
    path: PathBuf,
    /// Current state; the file mirrors this after every mutation
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl FileStore {
    // == Open ==
    /// Opens a store at `path`, loading existing contents if the file
    /// exists. The file itself is created on the first write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let blobs = if path.exists() {
            Self::load(&path)?
        } else {
            HashMap::new()
        };

        debug!(path = %path.display(), entries = blobs.len(), "Opened durable store");
        Ok(Self {
            path,
            blobs: RwLock::new(blobs),
        })
    }

    /// Returns the storage file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }

    // == Load ==
    /// Reads and validates the storage file.
    fn load(path: &Path) -> Result<HashMap<String, Vec<u8>>> {
        let contents = fs::read(path)?;

        if contents.len() < HEADER_LEN {
            return Err(CacheError::InvalidData(format!(
                "storage file {} is too short",
                path.display()
            )));
        }
        if &contents[0..4] != MAGIC {
            return Err(CacheError::InvalidData(format!(
                "storage file {} has invalid magic bytes",
                path.display()
            )));
        }
        let version = contents[4];
        if version != VERSION {
            return Err(CacheError::InvalidData(format!(
                "storage file {} has unsupported version {}",
                path.display(),
                version
            )));
        }

        Ok(serde_json::from_slice(&contents[HEADER_LEN..])?)
    }

    // == Persist ==
    /// Writes the current state to disk atomically (temp file + rename).
    ///
    /// Callers hold the write lock, so saves are serialized.
    fn persist(&self, blobs: &HashMap<String, Vec<u8>>) -> Result<()> {
        let body = serde_json::to_vec(blobs)?;

        let mut contents = Vec::with_capacity(HEADER_LEN + body.len());
        contents.extend_from_slice(MAGIC);
        contents.push(VERSION);
        contents.extend_from_slice(&body);

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, &contents)?;
        fs::rename(&temp_path, &self.path)?;

        debug!(path = %self.path.display(), entries = blobs.len(), "Persisted durable store");
        Ok(())
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut blobs = self.blobs.write();
        blobs.insert(key.to_string(), value);
        self.persist(&blobs)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut blobs = self.blobs.write();
        if blobs.remove(key).is_some() {
            self.persist(&blobs)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.blobs.read().keys().cloned().collect())
    }

    fn clear(&self) -> Result<()> {
        let mut blobs = self.blobs.write();
        blobs.clear();
        self.persist(&blobs)
    }
}
