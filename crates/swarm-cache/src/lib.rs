//! `swarm-cache` — grid-indexed, TTL-expiring cache of agent snapshots.
//!
//! Serves neighbor queries without requiring callers to touch the registry
//! lock; every returned snapshot is a value-copied point-in-time view, never
//! a live reference.
//!
//! # Modules
//!
//! - [`grid`] — uniform grid spatial index.
//! - [`cache`] — [`SpatialCache`][cache::SpatialCache]: TTL primary map +
//!   memoized query cache + LRU eviction.

pub mod cache;
pub mod grid;

pub use cache::SpatialCache;
