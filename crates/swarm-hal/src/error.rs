use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HalError {
    #[error("no adapter registered for agent {0}")]
    NotFound(u32),

    #[error("adapter for agent {0} is disconnected")]
    Disconnected(u32),

    #[error("adapter fault for agent {0}: {1}")]
    Fault(u32, String),
}
