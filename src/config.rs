//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the fast tier can hold
    pub max_entries: usize,
    /// Total byte budget for entries resident in the fast tier
    pub max_cost_bytes: usize,
    /// Background expiration sweep interval in seconds
    pub sweep_interval: u64,
    /// Path of the durable tier's storage file
    pub storage_path: PathBuf,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum fast-tier entries (default: 100)
    /// - `CACHE_MAX_COST_BYTES` - Fast-tier byte budget (default: 50 MiB)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `CACHE_STORAGE_PATH` - Durable storage file (default: tiercache.db)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            max_cost_bytes: env::var("CACHE_MAX_COST_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50 * 1024 * 1024),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            storage_path: env::var("CACHE_STORAGE_PATH")
                .ok()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("tiercache.db")),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            max_cost_bytes: 50 * 1024 * 1024,
            sweep_interval: 60,
            storage_path: PathBuf::from("tiercache.db"),
        }
    }
}
