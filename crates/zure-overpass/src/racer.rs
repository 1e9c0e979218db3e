//! Mirror race: sends one query to every mirror at once and keeps the first
//! valid answer.
//!
//! Each mirror runs on its own task, bounded by the per-request timeout. The
//! first success cancels the shared [`CancellationToken`] and aborts the
//! remaining tasks, so losers stop holding sockets and have no further
//! effect. Individual failures are only logged; the race fails with
//! [`RaceError::UpstreamUnavailable`] when no mirror succeeds. There is no
//! retry here: the escalation loop's next radius is the only retry.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use zure_core::{Coordinate, RawGeoElement, SpatialSource, TagFilter};

use crate::dto::OverpassResponse;
use crate::query::{proximity_query, DEFAULT_QUERY_TIMEOUT_S};
use crate::transport::{MirrorError, MirrorTransport};

/// Default bound on a single mirror request.
pub const DEFAULT_PER_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

/// Why the race produced no answer.
#[derive(Debug, Error)]
pub enum RaceError {
    #[error("no mirrors configured")]
    NoMirrors,

    #[error("all {} mirrors failed: {}", .failures.len(), summarize(.failures))]
    UpstreamUnavailable { failures: Vec<MirrorError> },
}

fn summarize(failures: &[MirrorError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Races a query across interchangeable Overpass mirrors.
pub struct MirrorRacer<T> {
    transport: Arc<T>,
    mirrors: Vec<String>,
    per_request_timeout: Duration,
    query_timeout_s: u32,
}

impl<T: MirrorTransport> MirrorRacer<T> {
    pub fn new(transport: T, mirrors: Vec<String>) -> Self {
        Self {
            transport: Arc::new(transport),
            mirrors,
            per_request_timeout: DEFAULT_PER_REQUEST_TIMEOUT,
            query_timeout_s: DEFAULT_QUERY_TIMEOUT_S,
        }
    }

    pub fn with_per_request_timeout(mut self, timeout: Duration) -> Self {
        self.per_request_timeout = timeout;
        self
    }

    pub fn with_query_timeout(mut self, seconds: u32) -> Self {
        self.query_timeout_s = seconds;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Post `query` to every mirror concurrently and return the first valid
    /// response.
    pub async fn race(&self, query: &str) -> Result<OverpassResponse, RaceError> {
        if self.mirrors.is_empty() {
            return Err(RaceError::NoMirrors);
        }

        let cancel = CancellationToken::new();
        let query: Arc<str> = Arc::from(query);
        let mut tasks = JoinSet::new();

        for endpoint in self.mirrors.iter().cloned() {
            let transport = Arc::clone(&self.transport);
            let query = Arc::clone(&query);
            let token = cancel.child_token();
            let timeout = self.per_request_timeout;

            tasks.spawn(async move {
                let attempt =
                    tokio::time::timeout(timeout, transport.post_query(&endpoint, &query));
                let outcome = tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    result = attempt => {
                        Some(result.unwrap_or_else(|_| {
                            Err(MirrorError::Timeout {
                                endpoint: endpoint.clone(),
                                timeout,
                            })
                        }))
                    }
                };
                (endpoint, outcome)
            });
        }

        let mut failures = Vec::with_capacity(self.mirrors.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((endpoint, Some(Ok(response)))) => {
                    cancel.cancel();
                    tasks.abort_all();
                    debug!(%endpoint, elements = response.elements.len(), "mirror won the race");
                    return Ok(response);
                }
                Ok((endpoint, Some(Err(err)))) => {
                    debug!(%endpoint, error = %err, "mirror failed");
                    failures.push(err);
                }
                Ok((_, None)) => {}
                Err(join_err) => failures.push(MirrorError::Aborted(join_err.to_string())),
            }
        }

        warn!(mirrors = self.mirrors.len(), "every overpass mirror failed");
        Err(RaceError::UpstreamUnavailable { failures })
    }
}

impl<T: MirrorTransport> SpatialSource for MirrorRacer<T> {
    type Error = RaceError;

    async fn elements_within(
        &self,
        origin: Coordinate,
        radius_m: u32,
        tags: &[TagFilter],
    ) -> Result<Vec<RawGeoElement>, RaceError> {
        let query = proximity_query(origin, radius_m, tags, self.query_timeout_s);
        Ok(self.race(&query).await?.into_raw_elements())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
