//! Formation kinds and the pure slot-assignment math.

use swarm_types::{AgentId, FormationId, Point2};

/// Default distance, in world units, within which a member is considered
/// "in position".
pub const POSITION_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormationKind {
    Line,
    Circle,
}

impl FormationKind {
    pub fn min_agents(self) -> usize {
        match self {
            FormationKind::Line => 2,
            FormationKind::Circle => 3,
        }
    }
}

/// World position of `slot` out of `total` members, a pure function of
/// `(kind, center, heading, spacing, slot)` — the same inputs always
/// produce the same slot position, so re-issuing commands after a
/// reconfiguration is just re-evaluating this function per member.
pub fn slot_position(kind: FormationKind, center: Point2, heading: f64, spacing: f64, slot: usize, total: usize) -> Point2 {
    match kind {
        FormationKind::Line => {
            let offset = slot as f64 - (total as f64 - 1.0) / 2.0;
            let axis = (-heading.sin(), heading.cos());
            Point2::new(center.x + axis.0 * offset * spacing, center.y + axis.1 * offset * spacing)
        }
        FormationKind::Circle => {
            let radius = spacing.max(1.0);
            let angle = heading + 2.0 * std::f64::consts::PI * slot as f64 / total as f64;
            Point2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        }
    }
}

#[derive(Debug, Clone)]
pub struct Formation {
    pub id: FormationId,
    pub kind: FormationKind,
    pub center: Point2,
    pub heading: f64,
    pub spacing: f64,
    /// Stable by insertion order: index is the member's slot. Membership
    /// changes reshuffle slots deterministically — the lowest surviving
    /// index keeps slot 0, and so on.
    pub members: Vec<AgentId>,
}

impl Formation {
    pub fn slot_of(&self, agent_id: AgentId) -> Option<usize> {
        self.members.iter().position(|&id| id == agent_id)
    }

    pub fn target_for(&self, agent_id: AgentId) -> Option<Point2> {
        let slot = self.slot_of(agent_id)?;
        Some(slot_position(self.kind, self.center, self.heading, self.spacing, slot, self.members.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_slots_are_symmetric_about_center() {
        let center = Point2::new(100.0, 100.0);
        let a = slot_position(FormationKind::Line, center, 0.0, 10.0, 0, 2);
        let b = slot_position(FormationKind::Line, center, 0.0, 10.0, 1, 2);
        let mid = Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        assert!((mid.x - center.x).abs() < 1e-9);
        assert!((mid.y - center.y).abs() < 1e-9);
    }

    #[test]
    fn circle_slots_are_equidistant_from_center() {
        let center = Point2::new(0.0, 0.0);
        let d0 = slot_position(FormationKind::Circle, center, 0.0, 20.0, 0, 4).distance(center);
        let d1 = slot_position(FormationKind::Circle, center, 0.0, 20.0, 1, 4).distance(center);
        assert!((d0 - d1).abs() < 1e-9);
    }

    #[test]
    fn min_agents_differ_by_kind() {
        assert_eq!(FormationKind::Line.min_agents(), 2);
        assert_eq!(FormationKind::Circle.min_agents(), 3);
    }
}
