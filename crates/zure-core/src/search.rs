//! Radius escalation: repeats a spatial query at growing radii until enough
//! places are found or the maximum radius has been searched.
//!
//! ```text
//! radius = min(initial, max)
//! loop:
//!     places = assemble(source.elements_within(radius))
//!     places.len() >= target  ──► Found
//!     radius >= max           ──► Exhausted
//!     radius = min(radius + step, max)
//! ```
//!
//! Each attempt replaces the previous one; results are never merged across
//! radii. A failing source aborts the whole run. Clamping an overshooting step
//! to `max` is what guarantees a final attempt exactly at the maximum radius.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::assemble::{assemble, DEFAULT_MAX_RESULTS};
use crate::types::{Coordinate, Place, RawGeoElement, SearchRequest, TagFilter};

/// Default number of places that ends escalation early.
pub const DEFAULT_TARGET_COUNT: usize = 5;

/// A backend able to list raw elements around a point.
///
/// Implemented by the Overpass mirror racer; tests substitute scripted
/// sources.
pub trait SpatialSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn elements_within(
        &self,
        origin: Coordinate,
        radius_m: u32,
        tags: &[TagFilter],
    ) -> impl Future<Output = Result<Vec<RawGeoElement>, Self::Error>> + Send;
}

/// Errors that end a search without a result.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request cannot be searched (no tags, zero radius, zero step).
    #[error("invalid search request: {0}")]
    InvalidRequest(String),

    /// Every mirror failed at some radius; nothing partial is returned.
    #[error("upstream unavailable at radius {radius_m} m: {reason}")]
    UpstreamUnavailable { radius_m: u32, reason: String },

    /// The whole escalation run exceeded its deadline.
    #[error("search did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}

/// How the escalation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// The target count was met at or below the maximum radius.
    Found,
    /// The maximum radius was searched without meeting the target.
    Exhausted,
}

/// The result of one escalation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    /// Places from the final attempt only.
    pub places: Vec<Place>,
    /// Radius of the final attempt.
    pub searched_radius_m: u32,
    /// Every radius queried, in order.
    pub attempts: Vec<u32>,
}

/// Tunables for [`Escalator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationPolicy {
    pub target_count: usize,
    pub max_results: usize,
    /// Deadline across the whole run; `None` disables it.
    pub overall_deadline: Option<Duration>,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            target_count: DEFAULT_TARGET_COUNT,
            max_results: DEFAULT_MAX_RESULTS,
            overall_deadline: Some(Duration::from_secs(20)),
        }
    }
}

/// Drives a [`SpatialSource`] through the radius escalation loop.
pub struct Escalator<S> {
    source: S,
    policy: EscalationPolicy,
}

impl<S: SpatialSource> Escalator<S> {
    pub fn new(source: S, policy: EscalationPolicy) -> Self {
        Self { source, policy }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run the escalation loop for `request`.
    pub async fn run(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        validate(request)?;

        match self.policy.overall_deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.escalate(request))
                .await
                .map_err(|_| SearchError::DeadlineExceeded(deadline))?,
            None => self.escalate(request).await,
        }
    }

    async fn escalate(&self, request: &SearchRequest) -> Result<SearchOutcome, SearchError> {
        let max = request.max_radius_m;
        let mut radius = request.initial_radius_m.min(max);
        let mut attempts = Vec::new();

        loop {
            attempts.push(radius);
            info!(radius_m = radius, origin = %request.origin, "searching");

            let elements = self
                .source
                .elements_within(request.origin, radius, &request.tags)
                .await
                .map_err(|e| SearchError::UpstreamUnavailable {
                    radius_m: radius,
                    reason: e.to_string(),
                })?;
            let fetched = elements.len();
            let places = assemble(elements, request, self.policy.max_results);
            debug!(radius_m = radius, fetched, kept = places.len(), "attempt assembled");

            let status = if places.len() >= self.policy.target_count {
                SearchStatus::Found
            } else if radius >= max {
                SearchStatus::Exhausted
            } else {
                radius = radius.saturating_add(request.radius_step_m).min(max);
                continue;
            };

            info!(radius_m = radius, found = places.len(), ?status, "search finished");
            return Ok(SearchOutcome {
                status,
                places,
                searched_radius_m: radius,
                attempts,
            });
        }
    }
}

fn validate(request: &SearchRequest) -> Result<(), SearchError> {
    if request.tags.is_empty() {
        return Err(SearchError::InvalidRequest("no tags requested".into()));
    }
    if request.initial_radius_m == 0 || request.max_radius_m == 0 {
        return Err(SearchError::InvalidRequest("radius must be positive".into()));
    }
    if request.radius_step_m == 0 {
        return Err(SearchError::InvalidRequest("radius step must be positive".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
