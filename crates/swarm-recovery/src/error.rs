use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecoveryError {
    #[error("recovery already running for agent {0}")]
    AlreadyRunning(u32),

    #[error("agent {0} has exhausted its recovery attempts")]
    Exhausted(u32),
}
