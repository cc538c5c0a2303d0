//! Expiry Sweep Task
//!
//! Background task that periodically drops expired records and tombstones so
//! long-running caches don't grow without bound.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Cache;

/// Spawns a background task that periodically purges expired records.
///
/// Purged records already read as absent, so the sweep never changes what
/// a query resolves to. It only reclaims memory. The task reads the wall
/// clock; the cache operations themselves stay clock-free.
///
/// # Arguments
/// * `cache` - Shared cache to sweep
/// * `sweep_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, to abort it on shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Cache::new(config.clone()));
/// let sweep_handle = spawn_sweep_task(cache.clone(), config.sweep_interval);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task(cache: Arc<Cache>, sweep_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(sweep_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            sweep_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.purge_expired(Utc::now());

            if removed > 0 {
                info!("Expiry sweep: removed {} stale records", removed);
            } else {
                debug!("Expiry sweep: no stale records found");
            }
        }
    })
}
