//! Tick-internal errors.
//!
//! Per the workspace's error propagation policy, these never escape the
//! tick: a command that fails for one of these reasons completes as
//! `FAILED` with the reason recorded in its completion report.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AgentError {
    #[error("missing required parameter: {0}")]
    MissingParam(String),

    #[error("command addressed to wrong agent: expected {expected}, got {got}")]
    WrongTargetAgent { expected: u32, got: u32 },
}
