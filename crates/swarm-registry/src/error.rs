use swarm_types::AgentStatus;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    #[error("agent {0} not found")]
    NotFound(u32),

    #[error("agent {0} cannot move from {1:?} to {2:?}")]
    InvalidTransition(u32, AgentStatus, AgentStatus),
}
