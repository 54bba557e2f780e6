//! Agent lifecycle status and its transition graph.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an agent.
///
/// Transition graph (§4.5):
///
/// ```text
/// ACTIVE <-> INACTIVE <-> MAINTENANCE
///   |            ^
///   v            |
/// BATTERY_LOW ----
///   |
///   v
/// FAILED (terminal unless reset)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentStatus {
    Active,
    Inactive,
    Maintenance,
    BatteryLow,
    Failed,
}

impl AgentStatus {
    /// Whether `self -> next` is a transition allowed by the lifecycle graph.
    /// `FAILED` is terminal: once failed, only an explicit reset (outside
    /// this graph, via the recovery controller) moves an agent out of it.
    pub fn is_valid_transition(self, next: AgentStatus) -> bool {
        use AgentStatus::*;
        if self == next {
            return true;
        }
        match (self, next) {
            (Active, Inactive) | (Inactive, Active) => true,
            (Inactive, Maintenance) | (Maintenance, Inactive) => true,
            (Active, BatteryLow) | (BatteryLow, Active) => true,
            (BatteryLow, Failed) => true,
            (Failed, _) => false,
            _ => false,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AgentStatus::Failed)
    }
}
