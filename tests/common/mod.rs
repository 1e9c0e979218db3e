//! Shared test utilities for zure integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Harnesses talk real HTTP to `FakeOverpass` mirrors on
//! localhost, so they run on real time rather than `tokio::time::pause()`.

pub mod assertions;
pub mod builders;
pub mod fake_overpass;
pub mod fixtures;

pub use builders::*;
pub use fake_overpass::*;
pub use fixtures::*;
