//! HTTP transport for one Overpass mirror.
//!
//! [`MirrorTransport`] is the seam the racer talks to, so tests can swap in
//! scripted mirrors. [`ReqwestTransport`] is the real implementation.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::trace;

use crate::dto::OverpassResponse;

/// Why a single mirror did not produce a usable answer.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Connection, TLS or body-read failure.
    #[error("request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    /// The mirror answered with a non-success status (overloaded, rate
    /// limited, query rejected).
    #[error("{endpoint} answered HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The body was not an Overpass JSON document.
    #[error("{endpoint} returned an unreadable body: {reason}")]
    Decode { endpoint: String, reason: String },

    /// No answer within the per-request timeout.
    #[error("{endpoint} did not answer within {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    /// The mirror's task died before reporting.
    #[error("mirror task aborted: {0}")]
    Aborted(String),
}

/// Posts an Overpass QL query to one mirror endpoint.
pub trait MirrorTransport: Send + Sync + 'static {
    fn post_query(
        &self,
        endpoint: &str,
        query: &str,
    ) -> impl Future<Output = Result<OverpassResponse, MirrorError>> + Send;
}

/// Longest error body kept in [`MirrorError::Status`].
const MAX_ERROR_BODY: usize = 200;

/// Real transport using reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }
}

impl MirrorTransport for ReqwestTransport {
    async fn post_query(
        &self,
        endpoint: &str,
        query: &str,
    ) -> Result<OverpassResponse, MirrorError> {
        trace!(endpoint, "posting overpass query");
        let response = self
            .client
            .post(endpoint)
            .form(&[("data", query)])
            .send()
            .await
            .map_err(|e| MirrorError::Transport {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MirrorError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: truncate(body, MAX_ERROR_BODY),
            });
        }

        let bytes = response.bytes().await.map_err(|e| MirrorError::Transport {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| MirrorError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

fn truncate(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut cut = max;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
    }
    s
}
