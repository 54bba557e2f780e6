//! Formation coordination: grouping agents into named geometric patterns
//! (line, circle) and keeping their commanded slots in sync as the
//! formation moves, rotates, or gains and loses members.
//!
//! | module         | responsibility                                 |
//! |----------------|-------------------------------------------------|
//! | `formation`    | formation kinds and pure slot-position math     |
//! | `coordination` | `CoordinationManager`: lifecycle + command fanout |
//! | `error`        | `CoordinationError`                             |

mod coordination;
mod error;
mod formation;

pub use coordination::CoordinationManager;
pub use error::CoordinationError;
pub use formation::{slot_position, Formation, FormationKind, POSITION_TOLERANCE};
