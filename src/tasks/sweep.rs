//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries, so that
//! entries nobody reads again do not stay in memory forever.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{SharedCache, DEFAULT_SWEEP_INTERVAL};

// == Sweep Handle ==
/// Owns a running sweep task.
///
/// The task exits when [`SweepHandle::stop`] is called or the handle is
/// dropped; [`SweepHandle::abort`] kills it outright.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the task to exit and waits for it.
    ///
    /// A sweep already in progress finishes first.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            warn!("Sweep task ended abnormally: {}", e);
        }
    }

    /// Aborts the task without waiting.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a background task that sweeps expired entries out of `cache`
/// every `interval`.
///
/// The write lock is held only for the duration of one sweep. A zero
/// `interval` is replaced with [`DEFAULT_SWEEP_INTERVAL`].
///
/// # Example
/// ```ignore
/// let cache = cache::shared(CacheStore::<Value>::new(DEFAULT_TTL));
/// let sweeper = spawn_sweep_task(cache.clone(), DEFAULT_SWEEP_INTERVAL);
/// // Later, during shutdown:
/// sweeper.stop().await;
/// ```
pub fn spawn_sweep_task<V>(cache: SharedCache<V>, interval: Duration) -> SweepHandle
where
    V: Clone + Send + Sync + 'static,
{
    let interval = if interval.is_zero() {
        warn!(
            "Sweep interval must be positive, using {} seconds",
            DEFAULT_SWEEP_INTERVAL.as_secs()
        );
        DEFAULT_SWEEP_INTERVAL
    } else {
        interval
    };

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Cache sweep task stopping");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = cache.write().await.sweep_expired();

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    });

    SweepHandle {
        shutdown: Some(shutdown_tx),
        task,
    }
}
