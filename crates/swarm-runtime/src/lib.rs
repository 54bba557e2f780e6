//! `swarm-runtime` — owns every subsystem crate and exposes the engine's
//! control API as a single entry point.
//!
//! # Modules
//!
//! - [`controller`] — [`SystemController`]: constructs the registry, bus,
//!   boundary manager, cache, coordination manager, recovery controller,
//!   failure detector, performance monitor, and hardware adapter registry
//!   from one [`swarm_types::EngineConfig`], and runs the simulation and
//!   worker threads.
//! - [`state`] — [`RunFlag`]/[`RunState`]: the tri-state run flag checked by
//!   the simulation loop each tick.

pub mod controller;
pub mod state;

pub use controller::{SystemController, VisualizationUpdate};
pub use state::{RunFlag, RunState};
