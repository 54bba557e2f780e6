//! `swarm-bus` — the nervous system of the coordination engine.
//!
//! Routes state updates, task reports, and system events between the
//! simulation core and its subscribers (UI, hardware adapters, intelligence
//! layers) without caring about their meaning.
//!
//! # Modules
//!
//! - [`bus`] — synchronous, typed, subscription-ordered publish/subscribe
//!   event bus.

pub mod bus;

pub use bus::{EventBus, SubscriptionId};
