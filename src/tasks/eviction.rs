//! Eviction Task
//!
//! Background task that periodically removes expired in-memory entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::{DEFAULT_CLEANUP_INTERVAL, MAX_CLEANUP_INTERVAL};
use crate::ramcache::Store;

/// Spawns a background task that sweeps expired entries from `store`.
///
/// The task wakes every `interval` and runs [`sweep_expired`]. It ends when
/// `true` is sent on the stop channel or when the sender is dropped; a
/// stopped task cannot be restarted. A zero interval falls back to the
/// default of five minutes and longer intervals are capped at
/// [`MAX_CLEANUP_INTERVAL`].
///
/// Must be called from within a Tokio runtime.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Store::new());
/// let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);
/// let handle = spawn_eviction_task(store.clone(), Duration::from_secs(60), stop_rx);
/// // Later, during shutdown:
/// stop_tx.send_replace(true);
/// ```
pub fn spawn_eviction_task(
    store: Arc<Store>,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let interval = if interval.is_zero() {
        DEFAULT_CLEANUP_INTERVAL
    } else {
        interval.min(MAX_CLEANUP_INTERVAL)
    };

    tokio::spawn(async move {
        info!("Starting eviction task with interval of {:?}", interval);

        let start = Instant::now()
            .checked_add(interval)
            .unwrap_or_else(Instant::now);
        let mut ticker = time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = sweep_expired(&store).await;
                    if removed > 0 {
                        info!("Eviction sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Eviction sweep: no expired entries found");
                    }
                }
                // Either an explicit stop or the driver being dropped
                _ = stop.changed() => break,
            }
        }

        info!("Eviction task stopped");
    })
}

/// Removes expired entries from `store` and returns how many were removed.
///
/// The snapshot is ordered by expiry, so the walk stops at the first live
/// item. An item that expires between the snapshot and the walk is left
/// for the next sweep.
pub async fn sweep_expired(store: &Store) -> usize {
    sweep_expired_at(store, std::time::Instant::now()).await
}

/// Like [`sweep_expired`], treating `now` as the current time.
pub async fn sweep_expired_at(store: &Store, now: std::time::Instant) -> usize {
    let mut removed = 0;

    for (key, item) in store.snapshot_sorted_by_expiry().await {
        if !item.is_expired_at(now) {
            break;
        }
        if store.delete_expired_at(&key, now).await {
            removed += 1;
        }
    }

    removed
}
