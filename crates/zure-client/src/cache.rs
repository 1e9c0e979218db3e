//! Client result cache: the set of places discovered during one session.
//!
//! A location update only triggers a fetch when the device has moved at least
//! the refetch threshold since the last successful fetch. New places are
//! merged by [`PlaceKey`]; a place already cached keeps the distance and
//! bearing it was first seen with. When the set grows past capacity the
//! places farthest from the current position are evicted.
//!
//! At most one fetch runs at a time per cache. An update that arrives while a
//! fetch is running returns [`UpdateOutcome::InFlight`] and does nothing.

use std::collections::HashMap;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info};
use zure_core::config::ClientConfig;
use zure_core::geo::distance_meters;
use zure_core::{Coordinate, Place, PlaceKey};

use crate::error::ClientError;
use crate::http::PlaceSource;

pub const DEFAULT_REFETCH_THRESHOLD_M: f64 = 300.0;
pub const DEFAULT_CAPACITY_MAX: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachePolicy {
    /// Minimum movement since the last fetch before fetching again.
    pub refetch_threshold_m: f64,
    /// Largest number of places kept.
    pub capacity_max: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            refetch_threshold_m: DEFAULT_REFETCH_THRESHOLD_M,
            capacity_max: DEFAULT_CAPACITY_MAX,
        }
    }
}

impl From<&ClientConfig> for CachePolicy {
    fn from(config: &ClientConfig) -> Self {
        Self {
            refetch_threshold_m: config.refetch_threshold_m,
            capacity_max: config.capacity_max,
        }
    }
}

/// What a location update did.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Moved less than the threshold; the cache was served as is.
    Cached { moved_m: f64 },
    /// Another fetch was already running.
    InFlight,
    /// A fetch completed and was merged.
    Fetched { added: usize, evicted: usize },
    /// A fetch completed after a reset and its places were dropped.
    Superseded,
}

/// Read-only view of the cache, published after every merge and reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSnapshot {
    /// Cached places ordered by their stored distance.
    pub places: Vec<Place>,
    pub last_fetch_origin: Option<Coordinate>,
}

#[derive(Default)]
struct CacheState {
    places: HashMap<PlaceKey, Place>,
    last_fetch_origin: Option<Coordinate>,
    tags: Vec<String>,
    /// Bumped on reset so a fetch started before it is not merged.
    generation: u64,
}

impl CacheState {
    /// Distance moved since the last fetch, if it is below `threshold`.
    fn moved_within(&self, origin: Coordinate, threshold: f64) -> Option<f64> {
        let last = self.last_fetch_origin?;
        let moved = distance_meters(last, origin);
        (moved < threshold).then_some(moved)
    }

    fn snapshot(&self) -> CacheSnapshot {
        let mut places: Vec<Place> = self.places.values().cloned().collect();
        places.sort_by(|a, b| {
            a.distance_m
                .total_cmp(&b.distance_m)
                .then_with(|| a.name.cmp(&b.name))
        });
        CacheSnapshot {
            places,
            last_fetch_origin: self.last_fetch_origin,
        }
    }

    fn clear(&mut self) {
        self.places.clear();
        self.last_fetch_origin = None;
        self.generation += 1;
    }
}

/// Per-session place cache in front of a [`PlaceSource`].
pub struct ClientResultCache<S> {
    source: S,
    policy: CachePolicy,
    state: Mutex<CacheState>,
    flight: Mutex<()>,
    snapshots: watch::Sender<CacheSnapshot>,
}

impl<S: PlaceSource> ClientResultCache<S> {
    pub fn new(source: S, policy: CachePolicy, tags: Vec<String>) -> Self {
        let (snapshots, _) = watch::channel(CacheSnapshot::default());
        Self {
            source,
            policy,
            state: Mutex::new(CacheState {
                tags,
                ..Default::default()
            }),
            flight: Mutex::new(()),
            snapshots,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// React to the device reaching `origin`.
    ///
    /// On failure the cache and the last fetch origin are left untouched, so
    /// the next update retries.
    pub async fn on_location_update(
        &self,
        origin: Coordinate,
    ) -> Result<UpdateOutcome, ClientError> {
        let threshold = self.policy.refetch_threshold_m;
        if let Some(moved_m) = self.state.lock().await.moved_within(origin, threshold) {
            return Ok(UpdateOutcome::Cached { moved_m });
        }

        let Ok(_flight) = self.flight.try_lock() else {
            debug!(%origin, "fetch already in flight");
            return Ok(UpdateOutcome::InFlight);
        };

        // A fetch may have finished between the first check and the slot.
        let (tags, generation) = {
            let state = self.state.lock().await;
            if let Some(moved_m) = state.moved_within(origin, threshold) {
                return Ok(UpdateOutcome::Cached { moved_m });
            }
            (state.tags.clone(), state.generation)
        };
        if tags.is_empty() {
            return Err(ClientError::NoTags);
        }

        let fetched = self.source.fetch_places(origin, &tags).await?;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(%origin, "cache was reset during fetch, dropping results");
            return Ok(UpdateOutcome::Superseded);
        }

        let mut added = 0;
        for place in fetched {
            state.places.entry(place.key()).or_insert_with(|| {
                added += 1;
                place
            });
        }
        let evicted = evict_farthest(&mut state.places, origin, self.policy.capacity_max);
        state.last_fetch_origin = Some(origin);
        info!(%origin, added, evicted, cached = state.places.len(), "merged places");

        self.snapshots.send_replace(state.snapshot());
        Ok(UpdateOutcome::Fetched { added, evicted })
    }

    /// Forget every place and the last fetch origin.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.clear();
        self.snapshots.send_replace(state.snapshot());
    }

    /// Replace the tags used by later fetches. Places found for the old tags
    /// are dropped, so the next location update fetches again.
    pub async fn set_tags(&self, tags: Vec<String>) {
        let mut state = self.state.lock().await;
        if state.tags == tags {
            return;
        }
        state.tags = tags;
        state.clear();
        self.snapshots.send_replace(state.snapshot());
    }

    /// The cached place closest to `from`, with its live distance.
    pub async fn nearest(&self, from: Coordinate) -> Option<(Place, f64)> {
        let state = self.state.lock().await;
        state
            .places
            .values()
            .map(|p| (p, distance_meters(from, p.coordinate)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, d)| (p.clone(), d))
    }

    pub async fn places(&self) -> Vec<Place> {
        self.state.lock().await.snapshot().places
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.places.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn last_fetch_origin(&self) -> Option<Coordinate> {
        self.state.lock().await.last_fetch_origin
    }

    pub fn subscribe(&self) -> watch::Receiver<CacheSnapshot> {
        self.snapshots.subscribe()
    }
}

/// Drop the places farthest from `origin` until at most `capacity` remain.
fn evict_farthest(
    places: &mut HashMap<PlaceKey, Place>,
    origin: Coordinate,
    capacity: usize,
) -> usize {
    let excess = places.len().saturating_sub(capacity);
    if excess == 0 {
        return 0;
    }
    let mut by_distance: Vec<(f64, PlaceKey)> = places
        .iter()
        .map(|(key, p)| (distance_meters(origin, p.coordinate), key.clone()))
        .collect();
    by_distance.sort_by(|a, b| b.0.total_cmp(&a.0));
    for (_, key) in by_distance.into_iter().take(excess) {
        places.remove(&key);
    }
    excess
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
