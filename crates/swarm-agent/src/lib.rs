//! `swarm-agent` — per-agent physics, state, command queue, and tick.
//!
//! # Modules
//!
//! - [`physics`] — pure integration/steering/collision functions.
//! - [`state`] — [`AgentState`][state::AgentState] value type.
//! - [`queue`] — [`CommandQueue`][queue::CommandQueue] priority queue.
//! - [`actor`] — [`tick_agent`][actor::tick_agent]: the per-tick algorithm.
//! - [`error`] — tick-internal error type.

pub mod actor;
pub mod error;
pub mod physics;
pub mod queue;
pub mod state;

pub use actor::{tick_agent, TickConfig};
pub use error::AgentError;
pub use queue::CommandQueue;
pub use state::{AgentLimits, AgentState};
