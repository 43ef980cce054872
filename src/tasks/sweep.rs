//! Expiration Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//!
//! The sweep itself is a synchronous engine operation; hosts that want it
//! run on an interval (instead of wiring it to their own lifecycle events)
//! can spawn this task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheManager;
use crate::store::DurableStore;

/// Spawns a background task that periodically sweeps expired entries.
///
/// The task loops forever, sleeping for the configured interval between
/// sweeps. Abort the returned handle during shutdown.
pub fn spawn_sweep_task<S: DurableStore + 'static>(
    cache: Arc<CacheManager<S>>,
    sweep_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiration sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            match cache.try_clear_expired() {
                Ok(0) => debug!("Expiration sweep: nothing to remove"),
                Ok(removed) => info!("Expiration sweep: removed {} expired entries", removed),
                Err(err) => warn!("Expiration sweep failed: {}", err),
            }
        }
    })
}
