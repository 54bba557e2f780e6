//! `swarm-boundary` — world bounds and zone enforcement.
//!
//! The single interception point a tick must pass a proposed post-physics
//! position through before it is published as state.
//!
//! # Modules
//!
//! - [`boundary`] — [`BoundaryManager`][boundary::BoundaryManager]: world
//!   rectangle, zone sets, enforcement modes, nearest-safe-point search.

pub mod boundary;

pub use boundary::{BoundaryManager, EnforcementMode, EnforcementOutcome};
