//! Fetching places from the explore endpoint.

use std::future::Future;
use std::time::Duration;

use tracing::debug;
use zure_core::config::ClientConfig;
use zure_core::wire::{ExploreRequest, ExploreResponse};
use zure_core::{Coordinate, Place};

use crate::error::ClientError;

/// Where the cache gets its places from.
///
/// `tags` are raw `key=value` strings; the server validates them.
pub trait PlaceSource: Send + Sync + 'static {
    fn fetch_places(
        &self,
        origin: Coordinate,
        tags: &[String],
    ) -> impl Future<Output = Result<Vec<Place>, ClientError>> + Send;
}

/// [`PlaceSource`] backed by `POST {endpoint}/api/explore`.
#[derive(Clone)]
pub struct HttpPlaceSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPlaceSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}/api/explore", endpoint.trim_end_matches('/')),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.endpoint,
            Duration::from_millis(config.request_timeout_ms),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl PlaceSource for HttpPlaceSource {
    async fn fetch_places(
        &self,
        origin: Coordinate,
        tags: &[String],
    ) -> Result<Vec<Place>, ClientError> {
        let body = ExploreRequest {
            current_lat: Some(origin.lat()),
            current_lng: Some(origin.lng()),
            osm_tags: tags.to_vec(),
            ..Default::default()
        };
        debug!(url = %self.url, %origin, tags = tags.len(), "fetching places");

        let response = self.client.post(&self.url).json(&body).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        decode_explore(status, &bytes)
    }
}

/// Turn an explore response into places or a [`ClientError`].
pub(crate) fn decode_explore(status: u16, body: &[u8]) -> Result<Vec<Place>, ClientError> {
    let ok = (200..300).contains(&status);
    match serde_json::from_slice::<ExploreResponse>(body) {
        Ok(ExploreResponse::Success(success)) if ok => success
            .places
            .into_iter()
            .map(|p| Place::try_from(p).map_err(|e| ClientError::Malformed(e.to_string())))
            .collect(),
        Ok(ExploreResponse::Success(_)) => Err(ClientError::Server {
            status,
            message: "success body with an error status".to_string(),
            detail: None,
        }),
        Ok(ExploreResponse::Error(envelope)) => Err(ClientError::Server {
            status,
            message: envelope.message,
            detail: envelope.detail,
        }),
        Err(e) if ok => Err(ClientError::Malformed(e.to_string())),
        Err(_) => Err(ClientError::Server {
            status,
            message: String::from_utf8_lossy(body).chars().take(200).collect(),
            detail: None,
        }),
    }
}
