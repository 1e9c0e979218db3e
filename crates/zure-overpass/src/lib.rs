//! zure-overpass: Overpass API adapters for zure.
//!
//! Builds Overpass QL for a proximity query, posts it to every configured
//! mirror at once, and hands the first structurally valid answer to the
//! escalation loop as [`zure_core::RawGeoElement`] values.

pub mod dto;
pub mod query;
pub mod racer;
pub mod transport;

pub use racer::{MirrorRacer, RaceError};
pub use transport::{MirrorError, MirrorTransport, ReqwestTransport};
