//! Fake Overpass mirror for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1 and serves `POST /api/interpreter`. The mirror holds a list of
//! Overpass elements and, when serving, answers with the ones lying inside
//! the `around:` circle of the posted query, the way a real mirror would.
//! Each mirror can be made slow, failing, or garbled.
//!
//! # Example
//!
//! ```rust,no_run
//! let mirror = FakeOverpass::start().await.unwrap();
//! mirror.add_element(ElementBuilder::node(1).at(35.001, 135.001).name("Test Cafe").tag("amenity", "cafe").build()).await;
//! mirror.set_delay(Duration::from_millis(50)).await;
//!
//! // Point a MirrorRacer at mirror.url()
//! ```

use axum::{
    extract::{Form, State},
    http::{header::USER_AGENT, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use zure_core::geo::distance_meters;
use zure_core::Coordinate;

/// How the mirror answers.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorBehavior {
    /// Elements inside the queried circle, as Overpass JSON.
    Serve,
    /// A bare error status (overloaded, rate limited, ...).
    Status(u16),
    /// HTTP 200 with a body that is not Overpass JSON.
    Garbage,
}

#[derive(Debug)]
struct MirrorState {
    behavior: MirrorBehavior,
    delay: Duration,
    elements: Vec<serde_json::Value>,
    queries: Vec<String>,
    user_agents: Vec<String>,
}

impl Default for MirrorState {
    fn default() -> Self {
        Self {
            behavior: MirrorBehavior::Serve,
            delay: Duration::ZERO,
            elements: Vec::new(),
            queries: Vec::new(),
            user_agents: Vec::new(),
        }
    }
}

/// Handle to a running fake mirror.
pub struct FakeOverpass {
    addr: SocketAddr,
    state: Arc<Mutex<MirrorState>>,
}

impl FakeOverpass {
    /// Start the mirror on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(MirrorState::default()));

        let app = Router::new()
            .route("/api/interpreter", post(interpreter))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the task a moment to register.
        tokio::time::sleep(Duration::from_millis(5)).await;

        Ok(Self { addr, state })
    }

    /// Start a mirror already holding `elements`.
    pub async fn with_elements(elements: Vec<serde_json::Value>) -> Self {
        let mirror = Self::start().await.unwrap();
        mirror.state.lock().await.elements = elements;
        mirror
    }

    /// Interpreter URL, e.g. `http://127.0.0.1:PORT/api/interpreter`.
    pub fn url(&self) -> String {
        format!("http://{}/api/interpreter", self.addr)
    }

    pub async fn set_behavior(&self, behavior: MirrorBehavior) {
        self.state.lock().await.behavior = behavior;
    }

    pub async fn set_delay(&self, delay: Duration) {
        self.state.lock().await.delay = delay;
    }

    pub async fn add_element(&self, element: serde_json::Value) {
        self.state.lock().await.elements.push(element);
    }

    /// Number of queries received so far.
    pub async fn hits(&self) -> usize {
        self.state.lock().await.queries.len()
    }

    /// Every Overpass QL query received, in order.
    pub async fn queries(&self) -> Vec<String> {
        self.state.lock().await.queries.clone()
    }

    /// The `around:` radius of every query received, in order.
    pub async fn radii(&self) -> Vec<u32> {
        self.queries()
            .await
            .iter()
            .filter_map(|q| parse_around(q).map(|(r, _)| r))
            .collect()
    }

    pub async fn user_agents(&self) -> Vec<String> {
        self.state.lock().await.user_agents.clone()
    }
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

async fn interpreter(
    State(state): State<Arc<Mutex<MirrorState>>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let query = form.get("data").cloned().unwrap_or_default();
    let (behavior, delay, elements) = {
        let mut s = state.lock().await;
        s.queries.push(query.clone());
        if let Some(ua) = headers.get(USER_AGENT).and_then(|v| v.to_str().ok()) {
            s.user_agents.push(ua.to_string());
        }
        (s.behavior.clone(), s.delay, s.elements.clone())
    };

    tokio::time::sleep(delay).await;

    match behavior {
        MirrorBehavior::Serve => {
            let Some((radius, centre)) = parse_around(&query) else {
                return (StatusCode::BAD_REQUEST, "query has no around: filter").into_response();
            };
            let inside: Vec<serde_json::Value> = elements
                .into_iter()
                .filter(|e| {
                    element_position(e).is_some_and(|p| distance_meters(centre, p) <= radius as f64)
                })
                .collect();
            Json(serde_json::json!({
                "version": 0.6,
                "generator": "fake-overpass",
                "elements": inside,
            }))
            .into_response()
        }
        MirrorBehavior::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "mirror unavailable").into_response()
        }
        MirrorBehavior::Garbage => {
            (StatusCode::OK, "<html><body>rate_limited</body></html>").into_response()
        }
    }
}

/// Radius and centre from the first `(around:R,lat,lng)` in a query.
pub fn parse_around(query: &str) -> Option<(u32, Coordinate)> {
    let start = query.find("(around:")? + "(around:".len();
    let end = start + query[start..].find(')')?;
    let mut parts = query[start..end].split(',');
    let radius = parts.next()?.trim().parse().ok()?;
    let lat = parts.next()?.trim().parse().ok()?;
    let lng = parts.next()?.trim().parse().ok()?;
    Some((radius, Coordinate::new(lat, lng).ok()?))
}

fn element_position(element: &serde_json::Value) -> Option<Coordinate> {
    let (lat, lon) = match (element["lat"].as_f64(), element["lon"].as_f64()) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => (element["center"]["lat"].as_f64()?, element["center"]["lon"].as_f64()?),
    };
    Coordinate::new(lat, lon).ok()
}
