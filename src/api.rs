//! HTTP boundary: `POST /api/explore` and `GET /healthz`.
//!
//! Every explore response uses the `{ status, ... }` envelope, including
//! malformed bodies and handler panics.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::FutureExt;
use tracing::{error, warn};
use zure_core::wire::{ErrorEnvelope, ExploreRequest, ExploreResponse};
use zure_core::{SearchError, SpatialSource};

use crate::service::{ExploreError, ExploreService};

pub fn router<S>(service: Arc<ExploreService<S>>) -> Router
where
    S: SpatialSource + 'static,
{
    Router::new()
        .route("/api/explore", post(explore::<S>))
        .route("/healthz", get(healthz))
        .with_state(service)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn explore<S>(State(service): State<Arc<ExploreService<S>>>, body: Bytes) -> Response
where
    S: SpatialSource + 'static,
{
    let request: ExploreRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return ApiError::new(StatusCode::BAD_REQUEST, "malformed request body")
                .with_detail(e.to_string())
                .into_response()
        }
    };

    match AssertUnwindSafe(service.explore(&request)).catch_unwind().await {
        Ok(Ok(success)) => Json(ExploreResponse::Success(success)).into_response(),
        Ok(Err(e)) => ApiError::from(e).into_response(),
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            error!(%reason, "explore handler panicked");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
                .with_detail(reason)
                .into_response()
        }
    }
}

/// An error envelope with its status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ExploreError> for ApiError {
    fn from(e: ExploreError) -> Self {
        let detail = e.to_string();
        let (status, message) = match &e {
            ExploreError::Validation(_) | ExploreError::Search(SearchError::InvalidRequest(_)) => {
                (StatusCode::BAD_REQUEST, "invalid request")
            }
            ExploreError::Search(SearchError::UpstreamUnavailable { .. }) => {
                (StatusCode::BAD_GATEWAY, "upstream unavailable")
            }
            ExploreError::Search(SearchError::DeadlineExceeded(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "search timed out")
            }
        };
        warn!(status = status.as_u16(), %detail, "explore failed");
        ApiError::new(status, message).with_detail(detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ExploreResponse::Error(ErrorEnvelope {
            message: self.message,
            detail: self.detail,
        });
        (self.status, Json(body)).into_response()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
