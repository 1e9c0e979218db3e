//! Shared fixtures: the reference origin, the reference cafe, and helpers to
//! stand up the explore service against fake mirrors.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;
use zure::{router, OverpassExploreService};
use zure_core::config::SearchConfig;
use zure_core::Coordinate;
use zure_overpass::{MirrorRacer, ReqwestTransport};

use super::builders::ElementBuilder;

pub const ORIGIN_LAT: f64 = 35.0;
pub const ORIGIN_LNG: f64 = 135.0;

pub const TEST_USER_AGENT: &str = "zure-tests/0.1";

pub fn origin() -> Coordinate {
    Coordinate::new(ORIGIN_LAT, ORIGIN_LNG).unwrap()
}

/// The reference element: a cafe about 144 m north-east of the origin.
pub fn test_cafe() -> Value {
    ElementBuilder::node(1001)
        .at(35.001, 135.001)
        .name("Test Cafe")
        .tag("amenity", "cafe")
        .build()
}

/// Search defaults with a short overall deadline so failing tests end fast.
pub fn search_config() -> SearchConfig {
    SearchConfig {
        overall_deadline_ms: 5_000,
        ..SearchConfig::default()
    }
}

/// A racer over real HTTP against the given mirror URLs.
pub fn racer(mirrors: Vec<String>, per_request: Duration) -> MirrorRacer<ReqwestTransport> {
    MirrorRacer::new(ReqwestTransport::new(TEST_USER_AGENT).unwrap(), mirrors)
        .with_per_request_timeout(per_request)
}

/// The production service wired to the given mirror URLs.
pub fn service(mirrors: Vec<String>, search: SearchConfig) -> Arc<OverpassExploreService> {
    Arc::new(OverpassExploreService::new(
        racer(mirrors, Duration::from_secs(2)),
        search,
    ))
}

pub fn app(mirrors: Vec<String>) -> Router {
    router(service(mirrors, search_config()))
}

/// Send a raw body to `POST /api/explore` and decode the JSON reply.
pub async fn post_raw(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/explore")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!("response is not JSON ({e}): {}", String::from_utf8_lossy(&bytes))
    });
    (status, json)
}

pub async fn post_explore(app: Router, body: Value) -> (StatusCode, Value) {
    post_raw(app, body.to_string()).await
}

/// Serve `app` on a random local port, for clients that need a real socket.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(5)).await;
    addr
}
