//! Movement commands, their priority ordering, and task completion reports.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{AgentId, TaskId};

/// Command priority. `EMERGENCY` is the greatest, so a max-heap ordered by
/// `Priority` dequeues emergencies first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Normal,
    High,
    Emergency,
}

/// A command parameter value. Movement commands carry a small, open-ended
/// bag of named parameters (`target`, `combined_force`, `obstacle`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Point(crate::geom::Point2),
    Vector(crate::geom::Vec2),
    Number(f64),
}

pub type Params = HashMap<String, ParamValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    MoveToTarget,
    Flocking,
    FormationPosition,
    AvoidObstacle,
}

/// A prioritized movement command addressed to one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementCommand {
    pub target_agent_id: AgentId,
    pub kind: CommandKind,
    pub priority: Priority,
    /// Enqueue time, used for the staleness cutoff. The queue's FIFO order
    /// within a priority is the monotonic `seq` assigned at insertion, not
    /// this timestamp.
    pub created_ts: DateTime<Utc>,
    pub task_id: Option<TaskId>,
    pub params: Params,
}

impl MovementCommand {
    pub fn new(target_agent_id: AgentId, kind: CommandKind, priority: Priority, created_ts: DateTime<Utc>) -> Self {
        Self {
            target_agent_id,
            kind,
            priority,
            created_ts,
            task_id: None,
            params: Params::new(),
        }
    }

    pub fn with_task_id(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Age in whole milliseconds, clamped to zero against clock skew.
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_ts).num_milliseconds().max(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionStatus {
    Success,
    Failed,
    Timeout,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCompletionReport {
    pub task_id: Option<TaskId>,
    pub agent_id: AgentId,
    pub status: CompletionStatus,
    pub duration_s: f64,
    pub result_map: HashMap<String, String>,
}

impl TaskCompletionReport {
    pub fn new(task_id: Option<TaskId>, agent_id: AgentId, status: CompletionStatus, duration_s: f64) -> Self {
        Self {
            task_id,
            agent_id,
            status,
            duration_s,
            result_map: HashMap::new(),
        }
    }
}
