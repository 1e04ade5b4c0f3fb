//! Recurring batch sync.
//!
//! The timer keeps running while auto-sync is off; each tick re-reads the
//! configuration and skips the batch when disabled.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::engine::SyncEngine;
use promptsync_core::{SyncResult, MAX_SYNC_INTERVAL_MINUTES};

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub result: SyncResult,
}

pub struct SyncScheduler {
    handle: JoinHandle<()>,
    interval: Duration,
    reports: watch::Receiver<TickReport>,
}

impl SyncScheduler {
    /// Start ticking every `interval`. The first tick fires one interval from now.
    ///
    /// The interval is clamped between 1ms and the configured maximum.
    pub fn spawn(engine: Arc<SyncEngine>, interval: Duration) -> Self {
        let max = Duration::from_secs(MAX_SYNC_INTERVAL_MINUTES * 60);
        let interval = interval.clamp(Duration::from_millis(1), max);
        let (tx, reports) = watch::channel(TickReport::default());

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut tick = 0u64;

            loop {
                ticker.tick().await;
                tick += 1;
                let result = engine.periodic_sync().await;
                debug!(
                    "Sync tick {}: attempted={}, failed={}",
                    tick,
                    result.attempted,
                    result.failed()
                );
                if tx.send(TickReport { tick, result }).is_err() {
                    debug!("No tick observers left");
                }
            }
        });

        info!("Periodic sync scheduled every {:?}", interval);
        Self {
            handle,
            interval,
            reports,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Watch tick reports. Holds the latest report only.
    pub fn subscribe(&self) -> watch::Receiver<TickReport> {
        self.reports.clone()
    }

    pub fn stop(self) {
        self.handle.abort();
        info!("Periodic sync stopped");
    }
}
