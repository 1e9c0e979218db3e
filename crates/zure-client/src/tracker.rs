//! Location tracker: drives a [`ClientResultCache`] from a stream of fixes.
//!
//! Fixes closer together than the throttle interval (by their own timestamps)
//! are skipped. Every accepted fix is handled on its own task, so a slow
//! fetch never blocks the stream; the cache's single-flight slot decides what
//! actually hits the network.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use zure_core::Coordinate;

use crate::cache::{ClientResultCache, UpdateOutcome};
use crate::error::ClientError;
use crate::http::PlaceSource;

pub const DEFAULT_LOCATION_THROTTLE: Duration = Duration::from_millis(3_000);

/// One sample from the device's location stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub coordinate: Coordinate,
    pub timestamp: DateTime<Utc>,
}

impl LocationFix {
    pub fn new(coordinate: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            timestamp,
        }
    }
}

/// Counters for one tracker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerSummary {
    pub accepted: usize,
    pub throttled: usize,
    pub fetched: usize,
    pub cached: usize,
    pub in_flight: usize,
    pub superseded: usize,
    pub failed: usize,
}

impl TrackerSummary {
    fn record(&mut self, result: &Result<UpdateOutcome, ClientError>) {
        match result {
            Ok(UpdateOutcome::Fetched { .. }) => self.fetched += 1,
            Ok(UpdateOutcome::Cached { .. }) => self.cached += 1,
            Ok(UpdateOutcome::InFlight) => self.in_flight += 1,
            Ok(UpdateOutcome::Superseded) => self.superseded += 1,
            Err(_) => self.failed += 1,
        }
    }
}

pub struct LocationTracker<S> {
    cache: Arc<ClientResultCache<S>>,
    throttle: TimeDelta,
}

impl<S: PlaceSource> LocationTracker<S> {
    pub fn new(cache: Arc<ClientResultCache<S>>, throttle: Duration) -> Self {
        Self {
            cache,
            throttle: TimeDelta::from_std(throttle).unwrap_or(TimeDelta::MAX),
        }
    }

    pub fn cache(&self) -> &Arc<ClientResultCache<S>> {
        &self.cache
    }

    /// Consume fixes until the channel closes or `cancel` fires.
    ///
    /// On channel close the updates already dispatched are awaited; on
    /// cancellation they are aborted.
    pub async fn run(
        self,
        mut fixes: mpsc::Receiver<LocationFix>,
        cancel: CancellationToken,
    ) -> TrackerSummary {
        let mut summary = TrackerSummary::default();
        let mut last_accepted: Option<DateTime<Utc>> = None;
        let mut updates = JoinSet::new();

        loop {
            let fix = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(pending = updates.len(), "tracker cancelled");
                    updates.abort_all();
                    break;
                }
                fix = fixes.recv() => match fix {
                    Some(fix) => fix,
                    None => break,
                },
            };

            if let Some(prev) = last_accepted {
                if fix.timestamp - prev < self.throttle {
                    trace!(at = %fix.timestamp, "fix throttled");
                    summary.throttled += 1;
                    continue;
                }
            }
            last_accepted = Some(fix.timestamp);
            summary.accepted += 1;

            let cache = Arc::clone(&self.cache);
            updates.spawn(async move { cache.on_location_update(fix.coordinate).await });

            while let Some(done) = updates.try_join_next() {
                collect(&mut summary, done);
            }
        }

        while let Some(done) = updates.join_next().await {
            collect(&mut summary, done);
        }
        summary
    }
}

fn collect(
    summary: &mut TrackerSummary,
    done: Result<Result<UpdateOutcome, ClientError>, tokio::task::JoinError>,
) {
    match done {
        Ok(result) => {
            if let Err(e) = &result {
                warn!(error = %e, "location update failed");
            }
            summary.record(&result);
        }
        Err(e) if e.is_cancelled() => {}
        Err(e) => {
            warn!(error = %e, "location update task panicked");
            summary.failed += 1;
        }
    }
}
