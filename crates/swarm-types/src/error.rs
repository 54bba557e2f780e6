//! Shared error type for control-API operations across the workspace.

use thiserror::Error;

/// Error kinds common to every crate's control-API surface. Individual
/// crates may define their own narrower error enum for tick-internal
/// failures and convert into this one at the boundary, the way `dt-core`'s
/// crates share `DtError`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SwarmError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("queue full: {0}")]
    QueueFull(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("hardware disconnected: {0}")]
    HardwareDisconnected(String),

    #[error("recovery exhausted for {0}")]
    RecoveryExhausted(String),
}
