//! zure-client: the device side of zure.
//!
//! [`ClientResultCache`] keeps the places discovered during one session and
//! decides when a fresh search is worth the network round trip.
//! [`LocationTracker`] feeds it from a stream of location fixes, and
//! [`HttpPlaceSource`] talks to the `/api/explore` endpoint.

pub mod cache;
pub mod error;
pub mod http;
pub mod tracker;

pub use cache::{CachePolicy, CacheSnapshot, ClientResultCache, UpdateOutcome};
pub use error::ClientError;
pub use http::{HttpPlaceSource, PlaceSource};
pub use tracker::{LocationFix, LocationTracker, TrackerSummary};
