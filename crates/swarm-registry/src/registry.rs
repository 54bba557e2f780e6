//! Agent lifecycle registry: the exclusive owner of agent state.
//!
//! Every other component — cache, boundary manager, coordination manager —
//! holds agents only by [`AgentId`] and reaches them through this registry
//! or through cached snapshots, the way a hardware registry dispatches to
//! drivers by id rather than holding direct references into caller state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use swarm_agent::{tick_agent, AgentState, CommandQueue, TickConfig};
use swarm_boundary::BoundaryManager;
use swarm_cache::SpatialCache;
use swarm_bus::EventBus;
use swarm_types::{AgentId, AgentStateSnapshot, AgentStatus, MovementCommand, Point2, Severity, SwarmEvent, Vec2};
use tracing::warn;

use crate::error::RegistryError;

struct AgentSlot {
    state: AgentState,
    queue: Arc<CommandQueue>,
}

pub struct AgentRegistry {
    agents: RwLock<HashMap<AgentId, AgentSlot>>,
    next_id: AtomicU32,
    bus: EventBus,
    boundary: Arc<BoundaryManager>,
    cache: Arc<SpatialCache>,
}

impl AgentRegistry {
    pub fn new(bus: EventBus, boundary: Arc<BoundaryManager>, cache: Arc<SpatialCache>) -> Self {
        Self { agents: RwLock::new(HashMap::new()), next_id: AtomicU32::new(0), bus, boundary, cache }
    }

    fn publish_lifecycle(&self, tag: &str, agent_id: AgentId, now: DateTime<Utc>) {
        self.bus.publish(SwarmEvent::SystemEvent {
            kind_tag: tag.to_string(),
            agent_id: Some(agent_id),
            severity: Severity::Info,
            message: format!("{tag} {agent_id}"),
            metadata: HashMap::new(),
            ts: now,
        });
    }

    /// Create an agent at `position`, assigning the next id from a
    /// monotonically increasing counter. Publishes `AGENT_CREATED`.
    pub fn create_agent(&self, position: Point2) -> AgentId {
        let now = Utc::now();
        let id = AgentId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let state = AgentState::new(id, position, now);
        self.cache.put(id, state.snapshot(), now);
        self.agents.write().insert(id, AgentSlot { state, queue: Arc::new(CommandQueue::new()) });
        self.publish_lifecycle("AGENT_CREATED", id, now);
        id
    }

    /// Remove an agent. Publishes `AGENT_DESTROYED`.
    pub fn remove_agent(&self, id: AgentId) -> Result<(), RegistryError> {
        let removed = self.agents.write().remove(&id);
        if removed.is_none() {
            return Err(RegistryError::NotFound(id.raw()));
        }
        self.cache.invalidate(id);
        self.publish_lifecycle("AGENT_DESTROYED", id, Utc::now());
        Ok(())
    }

    /// Enqueue `command` to its target agent's queue. Rejected if the
    /// target agent does not exist.
    pub fn submit_command(&self, command: MovementCommand) -> Result<(), RegistryError> {
        let agents = self.agents.read();
        match agents.get(&command.target_agent_id) {
            Some(slot) => {
                slot.queue.push(command);
                Ok(())
            }
            None => Err(RegistryError::NotFound(command.target_agent_id.raw())),
        }
    }

    pub fn snapshot_of(&self, id: AgentId) -> Option<AgentStateSnapshot> {
        self.agents.read().get(&id).map(|slot| slot.state.snapshot())
    }

    pub fn all_snapshots(&self) -> Vec<AgentStateSnapshot> {
        self.agents.read().values().map(|slot| slot.state.snapshot()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.agents.read().contains_key(&id)
    }

    /// Move `id` to `status`. Used by the recovery controller, which applies
    /// statuses that are valid responses to a failure even when they would
    /// not arise from ordinary agent behavior (e.g. `SENSOR_FAILURE` to
    /// `Maintenance` from `Active`) — so this does not re-run the full tick
    /// transition graph, only its one terminal rule: `Failed` never leaves
    /// `Failed` through this call. `AgentStatus::is_valid_transition` applied
    /// from a `Failed` current status is exactly that rule (it is false for
    /// every `next` except `Failed` itself), so recovery can never resurrect
    /// a permanently failed agent by routing a later failure report at it.
    pub fn set_status(&self, id: AgentId, status: AgentStatus) -> Result<(), RegistryError> {
        let mut agents = self.agents.write();
        let slot = agents.get_mut(&id).ok_or(RegistryError::NotFound(id.raw()))?;
        let current = slot.state.status;
        if current.is_terminal() && !current.is_valid_transition(status) {
            warn!(agent = id.raw(), to = ?status, "rejected attempt to move a permanently failed agent out of Failed");
            return Err(RegistryError::InvalidTransition(id.raw(), current, status));
        }
        slot.state.status = status;
        Ok(())
    }

    pub fn zero_velocity(&self, id: AgentId) -> Result<(), RegistryError> {
        let mut agents = self.agents.write();
        let slot = agents.get_mut(&id).ok_or(RegistryError::NotFound(id.raw()))?;
        slot.state.velocity = Vec2::ZERO;
        Ok(())
    }

    pub fn clear_queue(&self, id: AgentId) -> Result<(), RegistryError> {
        let agents = self.agents.read();
        let slot = agents.get(&id).ok_or(RegistryError::NotFound(id.raw()))?;
        slot.queue.clear();
        Ok(())
    }

    pub fn drop_low_priority(&self, id: AgentId) -> Result<(), RegistryError> {
        let agents = self.agents.read();
        let slot = agents.get(&id).ok_or(RegistryError::NotFound(id.raw()))?;
        slot.queue.drop_low_priority();
        Ok(())
    }

    /// Tick every currently-registered agent exactly once, over a snapshot
    /// of ids taken at the start of the call. An id removed between the
    /// snapshot and its turn is silently skipped, tolerating concurrent
    /// insertions/removals.
    pub fn tick_all(&self, dt: f64, now: DateTime<Utc>, cfg: &TickConfig) {
        let ids: Vec<AgentId> = self.agents.read().keys().copied().collect();
        for id in ids {
            let mut agents = self.agents.write();
            if let Some(slot) = agents.get_mut(&id) {
                let queue = slot.queue.clone();
                tick_agent(&mut slot.state, &queue, dt, now, cfg, &self.boundary, &self.cache, &self.bus);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_boundary::EnforcementMode;
    use std::time::Duration;

    fn registry() -> AgentRegistry {
        let bus = EventBus::new();
        let boundary = Arc::new(BoundaryManager::new(800.0, 600.0, EnforcementMode::Hard, bus.clone()));
        let cache = Arc::new(SpatialCache::new(50.0, 1000, Duration::from_secs(5)));
        AgentRegistry::new(bus, boundary, cache)
    }

    #[test]
    fn create_agent_assigns_increasing_ids() {
        let reg = registry();
        let a = reg.create_agent(Point2::new(0.0, 0.0));
        let b = reg.create_agent(Point2::new(1.0, 1.0));
        assert!(b.raw() > a.raw());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn remove_unknown_agent_errors() {
        let reg = registry();
        assert!(reg.remove_agent(AgentId::new(99)).is_err());
    }

    #[test]
    fn submit_command_rejects_unknown_target() {
        let reg = registry();
        let cmd = MovementCommand::new(
            AgentId::new(99),
            swarm_types::CommandKind::Flocking,
            swarm_types::Priority::Normal,
            Utc::now(),
        );
        assert!(reg.submit_command(cmd).is_err());
    }

    #[test]
    fn tick_all_on_empty_registry_is_a_no_op() {
        let reg = registry();
        reg.tick_all(0.1, Utc::now(), &TickConfig::default());
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn tick_all_ticks_every_agent_once() {
        let reg = registry();
        let a = reg.create_agent(Point2::new(0.0, 0.0));
        let b = reg.create_agent(Point2::new(10.0, 10.0));
        reg.tick_all(0.1, Utc::now(), &TickConfig::default());
        assert!(reg.snapshot_of(a).is_some());
        assert!(reg.snapshot_of(b).is_some());
    }

    #[test]
    fn set_status_allows_recovery_overrides_outside_the_ordinary_graph() {
        let reg = registry();
        let a = reg.create_agent(Point2::new(0.0, 0.0));
        // ACTIVE -> MAINTENANCE has no direct edge in the tick graph, but is
        // a legitimate recovery response (SENSOR_FAILURE) that must not be
        // blocked by this call.
        assert!(reg.set_status(a, AgentStatus::Maintenance).is_ok());
        assert_eq!(reg.snapshot_of(a).unwrap().status, AgentStatus::Maintenance);
    }

    #[test]
    fn set_status_reaches_failed_from_any_status() {
        let reg = registry();
        let a = reg.create_agent(Point2::new(0.0, 0.0));
        assert!(reg.set_status(a, AgentStatus::Failed).is_ok());
        assert_eq!(reg.snapshot_of(a).unwrap().status, AgentStatus::Failed);
    }

    #[test]
    fn set_status_never_resurrects_a_failed_agent() {
        let reg = registry();
        let a = reg.create_agent(Point2::new(0.0, 0.0));
        reg.set_status(a, AgentStatus::Failed).unwrap();
        assert!(reg.set_status(a, AgentStatus::Active).is_err());
        assert_eq!(reg.snapshot_of(a).unwrap().status, AgentStatus::Failed);
    }
}
