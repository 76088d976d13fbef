//! # GPS Polling Ingestor
//!
//! Keeps the [`MarkerCache`] current by polling the feed on a fixed interval.
//!
//! ## Cycle
//! Every tick runs fetch, parse and install in sequence:
//!
//! ```text
//! Idle --tick--> Refreshing --installed / failed--> Idle
//!   \--cancelled--> Stopped
//! ```
//!
//! - Cycles are awaited inside the loop, so two never run at once. Ticks missed
//!   while a slow fetch is in flight are skipped, not queued.
//! - A failed fetch leaves the current snapshot in place; the next tick tries
//!   again. Nothing in here ends the process.
//! - Cancellation is checked between cycles. A cycle already running finishes
//!   first.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::{MarkerCache, RefreshState};
use crate::markers::Snapshot;
use crate::retrieve::{FeedSource, FetchError};

/// Default pause between cycles.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest accepted pause between cycles; tokio's interval rejects zero.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// Why a refresh cycle did not install a new snapshot.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The feed could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Self-scheduling poller feeding a [`MarkerCache`].
pub struct GpsPollingIngestor<S> {
    source: S,
    cache: Arc<MarkerCache>,
    interval: Duration,
}

impl<S: FeedSource> GpsPollingIngestor<S> {
    /// Creates a poller that refreshes `cache` from `source` every `interval`.
    ///
    /// Intervals below [`MIN_REFRESH_INTERVAL`] are raised to it.
    pub fn new(source: S, cache: Arc<MarkerCache>, interval: Duration) -> Self {
        Self {
            source,
            cache,
            interval: interval.max(MIN_REFRESH_INTERVAL),
        }
    }

    /// Pause between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The cache this poller writes to.
    pub fn cache(&self) -> &Arc<MarkerCache> {
        &self.cache
    }

    /// Runs until `shutdown` is cancelled.
    ///
    /// The first cycle starts immediately.
    pub async fn run(&self, shutdown: CancellationToken) {
        log::info!("GPS polling started, interval {:?}", self.interval);

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    log::info!("GPS polling received shutdown signal.");
                    break;
                }
                _ = ticker.tick() => {
                    // Errors are logged and recorded inside; keep ticking.
                    let _ = self.refresh_once().await;
                }
            }
        }

        self.cache.set_state(RefreshState::Stopped);
        log::info!("GPS polling stopped.");
    }

    /// Runs one fetch, parse and install cycle.
    ///
    /// Returns the number of markers installed. On failure the cache keeps its
    /// previous snapshot and the error is recorded in its status.
    pub async fn refresh_once(&self) -> Result<usize, RefreshError> {
        self.cache.set_state(RefreshState::Refreshing);
        let started = Instant::now();

        let result = match self.source.fetch().await {
            Ok(raw) => {
                let snapshot = Snapshot::parse(&raw);
                let count = snapshot.len();
                self.cache.replace(snapshot);
                log::debug!("updated gps: {} markers in {:?}", count, started.elapsed());
                Ok(count)
            }
            Err(e) => {
                log::warn!("GPS refresh failed, keeping previous snapshot: {}", e);
                self.cache.record_failure(e.to_string());
                Err(RefreshError::Fetch(e))
            }
        };

        self.cache.set_state(RefreshState::Idle);
        result
    }
}
