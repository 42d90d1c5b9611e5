//! TTL Sweep Task
//!
//! Background task that periodically removes expired cache entries.
//! Reads never depend on it; it only reclaims memory held by entries that
//! expired without being read again.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::SharedCache;

// == Sweep Handle ==
/// Owner of a running sweep task.
///
/// Dropping the handle without calling [`SweepHandle::shutdown`] also stops
/// the task, since the shutdown channel closes.
#[derive(Debug)]
pub struct SweepHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SweepHandle {
    /// Signals the task to stop and waits for it to exit.
    pub async fn shutdown(self) {
        // The receiver is gone only if the task already exited.
        let _ = self.shutdown.send(());
        if let Err(err) = self.task.await {
            warn!("Sweep task ended abnormally: {}", err);
        }
    }
}

/// Spawns a background task that sweeps expired entries every `every`.
///
/// The first sweep runs one full interval after spawning.
///
/// # Example
/// ```ignore
/// let sweeper = spawn_sweep_task(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// sweeper.shutdown().await;
/// ```
pub fn spawn_sweep_task(cache: SharedCache, every: Duration) -> SweepHandle {
    let (shutdown, mut stop) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        info!("Starting TTL sweep task with interval of {:?}", every);

        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    let removed = cache.write().await.cleanup_expired();
                    if removed > 0 {
                        info!("TTL sweep: removed {} expired entries", removed);
                    } else {
                        debug!("TTL sweep: no expired entries found");
                    }
                }
            }
        }

        info!("TTL sweep task stopped");
    });

    SweepHandle { shutdown, task }
}
