//! Formation lifecycle: creation, member reshuffling, and synchronized
//! position commands.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use swarm_registry::AgentRegistry;
use swarm_types::{AgentId, CommandKind, FormationId, MovementCommand, Point2, Priority, TaskId};
use tracing::info;

use crate::error::CoordinationError;
use crate::formation::{Formation, FormationKind, POSITION_TOLERANCE};

pub struct CoordinationManager {
    formations: RwLock<HashMap<FormationId, Formation>>,
    next_id: AtomicU32,
    registry: Arc<AgentRegistry>,
}

impl CoordinationManager {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { formations: RwLock::new(HashMap::new()), next_id: AtomicU32::new(0), registry }
    }

    fn issue_commands(&self, formation: &Formation) {
        for (slot, &agent_id) in formation.members.iter().enumerate() {
            let target = crate::formation::slot_position(
                formation.kind,
                formation.center,
                formation.heading,
                formation.spacing,
                slot,
                formation.members.len(),
            );
            let task_id = TaskId::new(format!("formation_{}_agent_{}", formation.id, agent_id));
            let cmd = MovementCommand::new(agent_id, CommandKind::FormationPosition, Priority::High, Utc::now())
                .with_task_id(task_id)
                .with_param("formation_pos", swarm_types::ParamValue::Point(target));
            // A member removed from the registry between formation edits and
            // this dispatch just misses its command; it is no longer this
            // manager's problem once it is gone from both stores.
            let _ = self.registry.submit_command(cmd);
        }
    }

    pub fn create_formation(
        &self,
        kind: FormationKind,
        agent_ids: Vec<AgentId>,
        center: Point2,
        spacing: f64,
    ) -> Result<FormationId, CoordinationError> {
        if agent_ids.len() < kind.min_agents() {
            return Err(CoordinationError::NotEnoughAgents { needed: kind.min_agents(), got: agent_ids.len() });
        }
        let id = FormationId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let formation = Formation { id, kind, center, heading: 0.0, spacing, members: agent_ids };
        self.issue_commands(&formation);
        self.formations.write().insert(id, formation);
        info!(formation = id.raw(), "formation created");
        Ok(id)
    }

    pub fn move_formation(&self, id: FormationId, new_center: Point2) -> Result<(), CoordinationError> {
        let mut formations = self.formations.write();
        let formation = formations.get_mut(&id).ok_or(CoordinationError::NotFound(id.raw()))?;
        formation.center = new_center;
        let snapshot = formation.clone();
        drop(formations);
        self.issue_commands(&snapshot);
        Ok(())
    }

    pub fn rotate_formation(&self, id: FormationId, heading: f64) -> Result<(), CoordinationError> {
        let mut formations = self.formations.write();
        let formation = formations.get_mut(&id).ok_or(CoordinationError::NotFound(id.raw()))?;
        formation.heading = heading;
        let snapshot = formation.clone();
        drop(formations);
        self.issue_commands(&snapshot);
        Ok(())
    }

    pub fn set_spacing(&self, id: FormationId, spacing: f64) -> Result<(), CoordinationError> {
        let mut formations = self.formations.write();
        let formation = formations.get_mut(&id).ok_or(CoordinationError::NotFound(id.raw()))?;
        formation.spacing = spacing;
        let snapshot = formation.clone();
        drop(formations);
        self.issue_commands(&snapshot);
        Ok(())
    }

    pub fn transition_formation(&self, id: FormationId, new_kind: FormationKind) -> Result<(), CoordinationError> {
        let mut formations = self.formations.write();
        let formation = formations.get_mut(&id).ok_or(CoordinationError::NotFound(id.raw()))?;
        if formation.members.len() < new_kind.min_agents() {
            return Err(CoordinationError::NotEnoughAgents {
                needed: new_kind.min_agents(),
                got: formation.members.len(),
            });
        }
        formation.kind = new_kind;
        let snapshot = formation.clone();
        drop(formations);
        self.issue_commands(&snapshot);
        Ok(())
    }

    /// Append `agent_id` to the formation (new lowest-priority slot) and
    /// re-issue commands for every member.
    pub fn add_agent(&self, id: FormationId, agent_id: AgentId) -> Result<(), CoordinationError> {
        let mut formations = self.formations.write();
        let formation = formations.get_mut(&id).ok_or(CoordinationError::NotFound(id.raw()))?;
        if !formation.members.contains(&agent_id) {
            formation.members.push(agent_id);
        }
        let snapshot = formation.clone();
        drop(formations);
        self.issue_commands(&snapshot);
        Ok(())
    }

    /// Remove `agent_id`. If membership falls below `kind.min_agents()`,
    /// the formation dissolves rather than limping along under-strength.
    pub fn remove_agent(&self, id: FormationId, agent_id: AgentId) -> Result<(), CoordinationError> {
        let mut formations = self.formations.write();
        let formation = formations.get_mut(&id).ok_or(CoordinationError::NotFound(id.raw()))?;
        formation.members.retain(|&m| m != agent_id);
        if formation.members.len() < formation.kind.min_agents() {
            formations.remove(&id);
            info!(formation = id.raw(), "formation auto-dissolved: below min_agents");
            return Ok(());
        }
        let snapshot = formation.clone();
        drop(formations);
        self.issue_commands(&snapshot);
        Ok(())
    }

    /// True iff every member is within [`POSITION_TOLERANCE`] of its slot.
    /// A member no longer present in the registry counts as not in
    /// position.
    pub fn is_in_position(&self, id: FormationId) -> Result<bool, CoordinationError> {
        let formations = self.formations.read();
        let formation = formations.get(&id).ok_or(CoordinationError::NotFound(id.raw()))?;
        for &agent_id in &formation.members {
            let Some(snapshot) = self.registry.snapshot_of(agent_id) else {
                return Ok(false);
            };
            let Some(target) = formation.target_for(agent_id) else {
                return Ok(false);
            };
            if snapshot.position.distance(target) >= POSITION_TOLERANCE {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn formation_count(&self) -> usize {
        self.formations.read().len()
    }

    /// Remove `agent_id` from every formation it belongs to (used by the
    /// recovery controller on battery depletion and permanent failure,
    /// where the caller does not know which formations, if any, the agent
    /// was part of).
    pub fn remove_agent_from_all(&self, agent_id: AgentId) {
        let ids: Vec<FormationId> = {
            let formations = self.formations.read();
            formations.values().filter(|f| f.members.contains(&agent_id)).map(|f| f.id).collect()
        };
        for id in ids {
            // Ignore NotFound: a concurrent removal may have already
            // dissolved the formation between the snapshot above and here.
            let _ = self.remove_agent(id, agent_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use swarm_boundary::{BoundaryManager, EnforcementMode};
    use swarm_bus::EventBus;
    use swarm_cache::SpatialCache;

    fn manager() -> (CoordinationManager, Arc<AgentRegistry>) {
        let bus = EventBus::new();
        let boundary = Arc::new(BoundaryManager::new(800.0, 600.0, EnforcementMode::Hard, bus.clone()));
        let cache = Arc::new(SpatialCache::new(50.0, 1000, Duration::from_secs(5)));
        let registry = Arc::new(AgentRegistry::new(bus, boundary, cache));
        let coord = CoordinationManager::new(registry.clone());
        (coord, registry)
    }

    #[test]
    fn create_formation_rejects_too_few_agents() {
        let (coord, registry) = manager();
        let a = registry.create_agent(Point2::new(0.0, 0.0));
        let result = coord.create_formation(FormationKind::Line, vec![a], Point2::new(0.0, 0.0), 10.0);
        assert!(result.is_err());
    }

    #[test]
    fn create_formation_issues_a_command_per_member() {
        let (coord, registry) = manager();
        let a = registry.create_agent(Point2::new(0.0, 0.0));
        let b = registry.create_agent(Point2::new(5.0, 0.0));
        let id = coord.create_formation(FormationKind::Line, vec![a, b], Point2::new(400.0, 300.0), 10.0).unwrap();
        assert_eq!(coord.formation_count(), 1);
        assert!(coord.is_in_position(id).is_ok());
    }

    #[test]
    fn remove_agent_below_min_dissolves_formation() {
        let (coord, registry) = manager();
        let a = registry.create_agent(Point2::new(0.0, 0.0));
        let b = registry.create_agent(Point2::new(5.0, 0.0));
        let id = coord.create_formation(FormationKind::Line, vec![a, b], Point2::new(400.0, 300.0), 10.0).unwrap();
        coord.remove_agent(id, a).unwrap();
        assert_eq!(coord.formation_count(), 0);
    }

    #[test]
    fn transition_rejects_when_too_few_members_for_new_kind() {
        let (coord, registry) = manager();
        let a = registry.create_agent(Point2::new(0.0, 0.0));
        let b = registry.create_agent(Point2::new(5.0, 0.0));
        let id = coord.create_formation(FormationKind::Line, vec![a, b], Point2::new(400.0, 300.0), 10.0).unwrap();
        assert!(coord.transition_formation(id, FormationKind::Circle).is_err());
    }

    #[test]
    fn remove_agent_from_all_dissolves_membership_everywhere() {
        let (coord, registry) = manager();
        let a = registry.create_agent(Point2::new(0.0, 0.0));
        let b = registry.create_agent(Point2::new(5.0, 0.0));
        let id = coord.create_formation(FormationKind::Line, vec![a, b], Point2::new(400.0, 300.0), 10.0).unwrap();
        coord.remove_agent_from_all(a);
        assert_eq!(coord.formation_count(), 0);
        let _ = id;
    }

    #[test]
    fn is_in_position_false_when_member_missing_from_registry() {
        let (coord, registry) = manager();
        let a = registry.create_agent(Point2::new(0.0, 0.0));
        let b = registry.create_agent(Point2::new(5.0, 0.0));
        let id = coord.create_formation(FormationKind::Line, vec![a, b], Point2::new(400.0, 300.0), 10.0).unwrap();
        registry.remove_agent(b).unwrap();
        assert_eq!(coord.is_in_position(id).unwrap(), false);
    }
}
