//! Background cleanup of expired local entries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info};

use crate::core::CacheCore;

/// Default interval between cleanup passes.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

/// Anything holding entries that can expire.
#[async_trait]
pub trait ExpiredCleanup: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Drops expired entries and returns how many were removed.
    async fn cleanup_expired(&self) -> usize;
}

#[async_trait]
impl<V> ExpiredCleanup for CacheCore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        CacheCore::name(self)
    }

    async fn cleanup_expired(&self) -> usize {
        CacheCore::cleanup_expired(self).await
    }
}

/// Handle for controlling a running cleanup scheduler.
pub struct CleanupHandle {
    /// Sender to signal shutdown.
    shutdown_tx: watch::Sender<bool>,
}

impl CleanupHandle {
    /// Signals the scheduler to stop.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

impl Drop for CleanupHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Periodically removes expired entries from a set of caches.
pub struct CleanupScheduler {
    targets: Vec<Arc<dyn ExpiredCleanup>>,
    interval: Duration,
}

impl CleanupScheduler {
    /// Creates a scheduler running every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            targets: Vec::new(),
            interval: interval.max(Duration::from_secs(1)),
        }
    }

    /// Adds a cache to clean.
    pub fn with_target(mut self, target: Arc<dyn ExpiredCleanup>) -> Self {
        self.targets.push(target);
        self
    }

    /// Starts the background task.
    ///
    /// Returns a handle that stops the scheduler when dropped.
    pub fn start(self) -> CleanupHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = CleanupHandle { shutdown_tx };

        tokio::spawn(self.run(shutdown_rx));

        handle
    }

    /// Runs one pass over every target and returns the total removed.
    pub async fn run_once(&self) -> usize {
        let mut removed = 0;
        for target in &self.targets {
            let n = target.cleanup_expired().await;
            if n > 0 {
                debug!(cache = target.name(), removed = n, "Cleanup pass");
            }
            removed += n;
        }
        removed
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);

        info!(
            "Starting cleanup scheduler with interval {:?} for {} caches",
            self.interval,
            self.targets.len()
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_once().await;
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        info!("Cleanup scheduler shutting down");
                        break;
                    }
                }
            }
        }
    }
}
