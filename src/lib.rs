//! zure: proximity place discovery.
//!
//! The server side of zure: an HTTP endpoint that, given a position and a set
//! of OSM tags, searches outward in growing radii over racing Overpass mirrors
//! and returns the nearest named places. Exposed as a library so integration
//! tests can mount the router against fake mirrors.
//!
//! # Architecture
//!
//! ```text
//! POST /api/explore ──► ExploreService ──► Escalator ──► MirrorRacer ──► Overpass mirrors
//!                                              │
//!                                              └──► assemble ──► Place[]
//! ```
//!
//! The device-side cache lives in `zure-client` and talks to this endpoint.

pub mod api;
pub mod report;
pub mod service;

pub use api::{router, ApiError};
pub use service::{ExploreError, ExploreService, OverpassExploreService};
