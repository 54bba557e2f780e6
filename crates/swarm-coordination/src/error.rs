use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoordinationError {
    #[error("formation {0} not found")]
    NotFound(u32),

    #[error("need at least {needed} agents for this formation, got {got}")]
    NotEnoughAgents { needed: usize, got: usize },
}
