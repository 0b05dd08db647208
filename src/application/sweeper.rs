//! Periodic removal of expired assets.

use crate::clock::Clock;
use crate::domain::{Asset, ExpiryTracker};
use crate::ports::storage::AssetStore;
use chrono::{DateTime, Utc};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

/// Outcome of one sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: Vec<String>,
    /// Still tracked, retried on the next sweep.
    pub failed: Vec<String>,
}

pub struct Sweeper {
    tracker: ExpiryTracker,
    store: Arc<dyn AssetStore>,
    clock: Arc<dyn Clock>,
}

impl Sweeper {
    pub fn new(tracker: ExpiryTracker, store: Arc<dyn AssetStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tracker,
            store,
            clock,
        }
    }

    /// Sweep every `every`, starting immediately.
    pub fn start(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let report = self.sweep().await;
                if report.removed.is_empty() && report.failed.is_empty() {
                    debug!(tracked = self.tracker.len(), "Sweep found nothing to clean");
                } else {
                    info!(
                        removed = report.removed.len(),
                        failed = report.failed.len(),
                        tracked = self.tracker.len(),
                        "Sweep finished"
                    );
                }
            }
        })
    }

    /// Remove every asset older than the retention window.
    ///
    /// The tracker lock is only held to snapshot and to drop entries, never across disk I/O.
    /// One asset failing to delete does not stop the others.
    pub async fn sweep(&self) -> SweepReport {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        for (key, created_at) in self.tracker.expired(now) {
            info!(asset = %key, "Found expired file");
            let asset = Asset::from_key(&key);

            match self.store.remove_asset(&asset).await {
                Ok(()) => {
                    self.tracker.remove_if_unchanged(&key, created_at);
                    info!(asset = %key, "Cleaned up expired files");
                    report.removed.push(key);
                }
                Err(e) => {
                    error!(asset = %key, "Error cleaning up: {}", e);
                    report.failed.push(key);
                }
            }
        }

        report
    }

    /// Track assets left on disk by a previous run, aged from their modification time.
    pub async fn adopt_existing(&self) -> io::Result<usize> {
        let mut adopted = 0;
        for (key, modified) in self.store.discover().await? {
            if self.tracker.get(&key).is_none() {
                self.tracker.record(&key, DateTime::<Utc>::from(modified));
                adopted += 1;
            }
        }
        if adopted > 0 {
            info!(adopted, "Re-tracked assets found on disk");
        }
        Ok(adopted)
    }
}
