//! zure-core: proximity place discovery core library.
//!
//! This crate holds everything that does not touch the network: the shared
//! types, geodesic math, the result assembler, the radius escalation loop and
//! the configuration layer. Network adapters live in `zure-overpass`
//! (upstream mirrors) and `zure-client` (device-side cache).
//!
//! # Pipeline
//!
//! ```text
//! SearchRequest ──► Escalator ──► SpatialSource (mirror race) ──► assemble ──► Place[]
//!                      ▲                                              │
//!                      └──────────── count < target ◄─────────────────┘
//! ```

pub mod assemble;
pub mod category;
pub mod config;
pub mod geo;
pub mod search;
pub mod types;
pub mod wire;

pub use search::{
    EscalationPolicy, Escalator, SearchError, SearchOutcome, SearchStatus, SpatialSource,
};
pub use types::{
    CoordError, Coordinate, DirectionFilter, ElementKind, Place, PlaceKey, RawGeoElement,
    SearchRequest, TagError, TagFilter,
};
