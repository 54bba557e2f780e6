//! Typed identifiers.
//!
//! Plain `u32`/`u64` ids get mixed up across domains easily; wrapping each in
//! its own newtype makes that a compile error instead of a 2am bug.

use std::fmt;

macro_rules! typed_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Sentinel used where "no id yet" must be representable without
            /// wrapping the whole field in `Option`.
            pub const INVALID: $name = $name(u32::MAX);

            #[inline]
            pub fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }

            #[inline]
            pub fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

typed_id!(AgentId, "Identifies a single agent for its entire lifetime.");
typed_id!(FormationId, "Identifies a formation managed by the coordination layer.");
typed_id!(ZoneId, "Identifies a boundary zone (world bounds or restricted area).");

/// Identifies a task assigned to an agent. Backed by a string rather than a
/// counter: formation-issued tasks use the human-readable
/// `formation_<f>_agent_<a>` form, while ad-hoc commands can use whatever
/// the issuer finds convenient. A task may genuinely not exist yet (an
/// agent with no outstanding assignment), so this is used as
/// `Option<TaskId>` at call sites rather than via a sentinel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    #[inline]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TaskId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}
