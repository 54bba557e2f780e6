//! Agent value type: identity, pose, energy, limits, and status.
//!
//! Invariants are enforced at the mutation sites inside the tick (see
//! `actor.rs`), not through a validating setter layer — direct field access
//! is the norm for this record, the way an `AgentStore` entry is mutated
//! directly elsewhere in the workspace.

use chrono::{DateTime, Utc};
use swarm_types::{AgentId, AgentStateSnapshot, AgentStatus, MovementCommand, Point2, Vec2};

#[derive(Debug, Clone)]
pub struct AgentLimits {
    pub max_speed: f64,
    pub comm_range: f64,
    pub max_turn_rate: f64,
}

impl Default for AgentLimits {
    fn default() -> Self {
        Self { max_speed: 50.0, comm_range: 100.0, max_turn_rate: std::f64::consts::PI }
    }
}

#[derive(Debug, Clone)]
pub struct AgentState {
    pub id: AgentId,
    pub name: String,
    pub position: Point2,
    pub velocity: Vec2,
    pub heading: f64,
    pub battery: f64,
    pub limits: AgentLimits,
    pub status: AgentStatus,
    pub last_update_ts: DateTime<Utc>,
    /// The command currently being executed, if any. Carried across ticks
    /// for commands that persist until arrival (`MOVE_TO_TARGET`,
    /// `FORMATION_POSITION`); commands that complete immediately never
    /// occupy this slot past the tick that dispatched them.
    pub current_command: Option<MovementCommand>,
}

impl AgentState {
    pub fn new(id: AgentId, position: Point2, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: format!("agent-{id}"),
            position,
            velocity: Vec2::ZERO,
            heading: 0.0,
            battery: 1.0,
            limits: AgentLimits::default(),
            status: AgentStatus::Active,
            last_update_ts: now,
            current_command: None,
        }
    }

    pub fn snapshot(&self) -> AgentStateSnapshot {
        AgentStateSnapshot {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            heading: self.heading,
            battery: self.battery,
            status: self.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_agent_starts_active_with_full_battery() {
        let state = AgentState::new(AgentId::new(1), Point2::new(0.0, 0.0), Utc::now());
        assert_eq!(state.status, AgentStatus::Active);
        assert_eq!(state.battery, 1.0);
    }

    #[test]
    fn snapshot_reflects_current_pose() {
        let mut state = AgentState::new(AgentId::new(1), Point2::new(0.0, 0.0), Utc::now());
        state.position = Point2::new(5.0, 5.0);
        assert_eq!(state.snapshot().position, Point2::new(5.0, 5.0));
    }
}
