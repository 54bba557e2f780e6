//! Failure detection and recovery dispatch.
//!
//! | module       | responsibility                                     |
//! |--------------|-----------------------------------------------------|
//! | `detector`   | heartbeat tracking + failure report intake          |
//! | `controller` | `RecoveryController`: per-kind dispatch, exhaustion |
//! | `error`      | `RecoveryError`                                     |

mod controller;
mod detector;
mod error;

pub use controller::RecoveryController;
pub use detector::{FailureDetector, FailureKind, FailureReport};
pub use error::RecoveryError;
