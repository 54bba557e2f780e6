//! [`FailureDetector`] — heartbeat tracking and failure-report intake.
//!
//! Mirrors the kernel watchdog's register/heartbeat/health/check_all shape,
//! renamed to the agent domain: agents "register" implicitly on their first
//! state update, `check_timeouts` plays the role of `check_all`, and
//! anything that isn't a simple timeout (collision, boundary violation,
//! battery depletion, ...) is pushed in directly by its origin component
//! via [`FailureDetector::report`] rather than polled.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use swarm_types::AgentId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    SystemError,
    BatteryDepleted,
    CommunicationLost,
    Collision,
    Timeout,
    BoundaryViolation,
    SensorFailure,
    Overload,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailureReport {
    pub agent_id: AgentId,
    pub kind: FailureKind,
    pub ts: DateTime<Utc>,
}

#[derive(Default)]
pub struct FailureDetector {
    heartbeats: Mutex<HashMap<AgentId, DateTime<Utc>>>,
    pending: Mutex<VecDeque<FailureReport>>,
}

impl FailureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a heartbeat for `agent_id`, resetting its timeout deadline.
    /// Called whenever an `AgentStateUpdate` is observed for the agent.
    pub fn heartbeat(&self, agent_id: AgentId, now: DateTime<Utc>) {
        self.heartbeats.lock().insert(agent_id, now);
    }

    /// Stop tracking `agent_id` — called on `remove_agent` so a departed
    /// agent cannot raise a phantom `TIMEOUT` after it's gone.
    pub fn forget(&self, agent_id: AgentId) {
        self.heartbeats.lock().remove(&agent_id);
    }

    /// Push an externally-observed failure (collision, boundary violation,
    /// battery depletion, sensor fault, overload) onto the pending queue for
    /// the controller to pick up on its next sweep.
    pub fn report(&self, agent_id: AgentId, kind: FailureKind, now: DateTime<Utc>) {
        self.pending.lock().push_back(FailureReport { agent_id, kind, ts: now });
    }

    /// Scan all tracked heartbeats and enqueue a `TIMEOUT` report for every
    /// agent silent for longer than `timeout`.
    pub fn check_timeouts(&self, now: DateTime<Utc>, timeout: Duration) {
        let timed_out: Vec<AgentId> = self
            .heartbeats
            .lock()
            .iter()
            .filter(|(_, &last)| (now - last).to_std().unwrap_or(Duration::ZERO) > timeout)
            .map(|(&id, _)| id)
            .collect();
        let mut pending = self.pending.lock();
        for id in timed_out {
            pending.push_back(FailureReport { agent_id: id, kind: FailureKind::Timeout, ts: now });
        }
    }

    /// Drain and return every pending report, oldest first.
    pub fn drain_pending(&self) -> Vec<FailureReport> {
        self.pending.lock().drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn fresh_heartbeat_does_not_time_out() {
        let d = FailureDetector::new();
        d.heartbeat(AgentId::new(1), at(0));
        d.check_timeouts(at(1), Duration::from_secs(5));
        assert_eq!(d.pending_count(), 0);
    }

    #[test]
    fn stale_heartbeat_raises_timeout() {
        let d = FailureDetector::new();
        d.heartbeat(AgentId::new(1), at(0));
        d.check_timeouts(at(10), Duration::from_secs(5));
        let pending = d.drain_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, FailureKind::Timeout);
        assert_eq!(pending[0].agent_id, AgentId::new(1));
    }

    #[test]
    fn forgotten_agent_never_times_out() {
        let d = FailureDetector::new();
        d.heartbeat(AgentId::new(1), at(0));
        d.forget(AgentId::new(1));
        d.check_timeouts(at(100), Duration::from_secs(5));
        assert_eq!(d.pending_count(), 0);
    }

    #[test]
    fn externally_reported_failures_are_queued() {
        let d = FailureDetector::new();
        d.report(AgentId::new(2), FailureKind::Collision, at(0));
        let pending = d.drain_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, FailureKind::Collision);
    }

    #[test]
    fn drain_pending_empties_the_queue() {
        let d = FailureDetector::new();
        d.report(AgentId::new(1), FailureKind::Overload, at(0));
        assert_eq!(d.drain_pending().len(), 1);
        assert_eq!(d.drain_pending().len(), 0);
    }
}
