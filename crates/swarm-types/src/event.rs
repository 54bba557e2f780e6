//! Event kinds published on the swarm event bus.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::CompletionStatus;
use crate::ids::{AgentId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdateKind {
    Full,
    Position,
    Status,
    Battery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Discriminant used to key bus subscriptions without matching on the full
/// payload. One variant per [`SwarmEvent`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    AgentStateUpdate,
    TaskCompletionReport,
    SystemEvent,
    CommunicationEvent,
}

/// An immutable snapshot of agent pose/state, payload-copied into
/// `AgentStateUpdate` events — never a live reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStateSnapshot {
    pub id: AgentId,
    pub position: crate::geom::Point2,
    pub velocity: crate::geom::Vec2,
    pub heading: f64,
    pub battery: f64,
    pub status: crate::status::AgentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SwarmEvent {
    AgentStateUpdate {
        id: AgentId,
        snapshot: AgentStateSnapshot,
        update_kind: UpdateKind,
        ts: DateTime<Utc>,
    },
    TaskCompletionReport {
        task_id: Option<TaskId>,
        agent_id: AgentId,
        status: CompletionStatus,
        duration: f64,
        results: HashMap<String, String>,
    },
    SystemEvent {
        kind_tag: String,
        agent_id: Option<AgentId>,
        severity: Severity,
        message: String,
        metadata: HashMap<String, String>,
        ts: DateTime<Utc>,
    },
    CommunicationEvent {
        sender: AgentId,
        receiver: Option<AgentId>,
        message_tag: String,
        payload: Vec<u8>,
        range: f64,
        ts: DateTime<Utc>,
    },
}

impl SwarmEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SwarmEvent::AgentStateUpdate { .. } => EventKind::AgentStateUpdate,
            SwarmEvent::TaskCompletionReport { .. } => EventKind::TaskCompletionReport,
            SwarmEvent::SystemEvent { .. } => EventKind::SystemEvent,
            SwarmEvent::CommunicationEvent { .. } => EventKind::CommunicationEvent,
        }
    }

    pub fn system(kind_tag: impl Into<String>, severity: Severity, message: impl Into<String>, ts: DateTime<Utc>) -> Self {
        SwarmEvent::SystemEvent {
            kind_tag: kind_tag.into(),
            agent_id: None,
            severity,
            message: message.into(),
            metadata: HashMap::new(),
            ts,
        }
    }
}
