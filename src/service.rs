//! The explore use case: validate a request, run the radius escalation, and
//! shape the outcome for the wire.

use thiserror::Error;
use tracing::warn;
use zure_core::config::{Config, SearchConfig};
use zure_core::wire::{ExploreRequest, ExploreSuccess, ValidationError, WireDirection, WirePlace};
use zure_core::{Escalator, SearchError, SpatialSource};
use zure_overpass::{MirrorRacer, ReqwestTransport};

#[derive(Debug, Error)]
pub enum ExploreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Runs explore requests against one [`SpatialSource`].
pub struct ExploreService<S> {
    escalator: Escalator<S>,
    search: SearchConfig,
}

/// The production service: escalation over racing Overpass mirrors.
pub type OverpassExploreService = ExploreService<MirrorRacer<ReqwestTransport>>;

impl<S: SpatialSource> ExploreService<S> {
    pub fn new(source: S, search: SearchConfig) -> Self {
        Self {
            escalator: Escalator::new(source, search.escalation_policy()),
            search,
        }
    }

    pub async fn explore(&self, body: &ExploreRequest) -> Result<ExploreSuccess, ExploreError> {
        let request = body.to_search_request(&self.search)?;
        if body.direction.is_some() && request.direction.is_none() {
            warn!(direction = ?body.direction, "ignoring unrecognised direction");
        }

        let outcome = self.escalator.run(&request).await?;
        Ok(ExploreSuccess {
            searched_radius: outcome.searched_radius_m,
            direction: request.direction.map(WireDirection::from),
            places: outcome.places.iter().map(WirePlace::from).collect(),
        })
    }
}

impl OverpassExploreService {
    /// Build the production service from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let upstream = &config.upstream;
        let transport = ReqwestTransport::new(&upstream.user_agent)?;
        let racer = MirrorRacer::new(transport, upstream.mirrors.clone())
            .with_per_request_timeout(upstream.per_request_timeout())
            .with_query_timeout(upstream.query_timeout_s);
        Ok(Self::new(racer, config.search.clone()))
    }
}
