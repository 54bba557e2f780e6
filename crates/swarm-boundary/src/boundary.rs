//! World bounds and zone enforcement.
//!
//! Mirrors the two-stage gate pattern used elsewhere in this workspace for
//! safety checks: a position is first tested for validity, and only an
//! invalid one pays for the more expensive nearest-safe-point search.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use swarm_bus::EventBus;
use swarm_types::{AgentId, Point2, Severity, SwarmEvent, Vec2, Zone, ZoneId, ZoneRole};
use tracing::warn;

const RADIAL_STEP: f64 = 10.0;
const RADIAL_MAX: f64 = 200.0;
const EIGHT_DIRECTIONS: [(f64, f64); 8] = [
    (1.0, 0.0),
    (1.0, 1.0),
    (0.0, 1.0),
    (-1.0, 1.0),
    (-1.0, 0.0),
    (-1.0, -1.0),
    (0.0, -1.0),
    (1.0, -1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnforcementMode {
    Soft,
    Medium,
    Hard,
    Teleport,
}

/// Result of running [`BoundaryManager::enforce`] against a proposed
/// post-integration pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnforcementOutcome {
    pub position: Point2,
    pub velocity: Vec2,
    pub violated: bool,
}

struct Inner {
    world_min: Point2,
    world_max: Point2,
    zones: HashMap<ZoneId, Zone>,
    mode: EnforcementMode,
    violations: HashMap<AgentId, u32>,
}

/// Owns the world rectangle and the set of safe/restricted/special zones,
/// and enforces them against agent positions after physics integration.
pub struct BoundaryManager {
    inner: RwLock<Inner>,
    bus: EventBus,
}

impl BoundaryManager {
    pub fn new(world_width: f64, world_height: f64, mode: EnforcementMode, bus: EventBus) -> Self {
        Self {
            inner: RwLock::new(Inner {
                world_min: Point2::new(0.0, 0.0),
                world_max: Point2::new(world_width, world_height),
                zones: HashMap::new(),
                mode,
                violations: HashMap::new(),
            }),
            bus,
        }
    }

    pub fn set_world_bounds(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        let mut inner = self.inner.write();
        inner.world_min = Point2::new(min_x, min_y);
        inner.world_max = Point2::new(max_x, max_y);
    }

    pub fn set_mode(&self, mode: EnforcementMode) {
        self.inner.write().mode = mode;
    }

    pub fn add_zone(&self, id: ZoneId, zone: Zone) {
        self.inner.write().zones.insert(id, zone);
    }

    pub fn remove_zone(&self, id: ZoneId) {
        self.inner.write().zones.remove(&id);
    }

    pub fn violation_count(&self, agent_id: AgentId) -> u32 {
        self.inner.read().violations.get(&agent_id).copied().unwrap_or(0)
    }

    /// A point is valid iff it is inside world bounds, outside every
    /// restricted zone, and (there are no safe zones, or it is inside at
    /// least one of them).
    pub fn is_valid(&self, p: Point2) -> bool {
        let inner = self.inner.read();
        Self::is_valid_locked(&inner, p)
    }

    fn is_valid_locked(inner: &Inner, p: Point2) -> bool {
        if p.x < inner.world_min.x || p.x > inner.world_max.x || p.y < inner.world_min.y || p.y > inner.world_max.y {
            return false;
        }
        let mut has_safe_zones = false;
        let mut in_safe_zone = false;
        for zone in inner.zones.values() {
            match zone.role {
                ZoneRole::Restricted => {
                    if zone.contains(p) {
                        return false;
                    }
                }
                ZoneRole::Safe => {
                    has_safe_zones = true;
                    if zone.contains(p) {
                        in_safe_zone = true;
                    }
                }
                _ => {}
            }
        }
        !has_safe_zones || in_safe_zone
    }

    /// Nearest point to `p` that satisfies [`Self::is_valid`]: clamp to
    /// world bounds, then (if still invalid) expand an 8-direction radial
    /// search in steps of `RADIAL_STEP` out to `RADIAL_MAX`. Falls back to
    /// the world center if nothing in range is valid.
    pub fn nearest_safe_point(&self, p: Point2) -> Point2 {
        let inner = self.inner.read();
        Self::nearest_safe_point_locked(&inner, p)
    }

    fn nearest_safe_point_locked(inner: &Inner, p: Point2) -> Point2 {
        let clamped = p.clamp(inner.world_min, inner.world_max);
        if Self::is_valid_locked(inner, clamped) {
            return clamped;
        }
        let mut steps = 1;
        loop {
            let radius = RADIAL_STEP * steps as f64;
            if radius > RADIAL_MAX {
                break;
            }
            for (dx, dy) in EIGHT_DIRECTIONS {
                let candidate = Point2::new(clamped.x + dx * radius, clamped.y + dy * radius)
                    .clamp(inner.world_min, inner.world_max);
                if Self::is_valid_locked(inner, candidate) {
                    return candidate;
                }
            }
            steps += 1;
        }
        Point2::new(
            (inner.world_min.x + inner.world_max.x) / 2.0,
            (inner.world_min.y + inner.world_max.y) / 2.0,
        )
    }

    /// Run post-integration enforcement for `agent_id` at `position` with
    /// `velocity`. Invalid positions are corrected according to the active
    /// [`EnforcementMode`]; a `BOUNDARY_VIOLATION` system event is published
    /// whenever the incoming position was invalid.
    pub fn enforce(&self, agent_id: AgentId, position: Point2, velocity: Vec2) -> EnforcementOutcome {
        let mut inner = self.inner.write();
        if Self::is_valid_locked(&inner, position) {
            return EnforcementOutcome { position, velocity, violated: false };
        }

        *inner.violations.entry(agent_id).or_insert(0) += 1;
        let mode = inner.mode;
        let world_min = inner.world_min;
        let world_max = inner.world_max;

        let outcome = match mode {
            EnforcementMode::Soft => EnforcementOutcome { position, velocity, violated: true },
            EnforcementMode::Medium => {
                let safe = Self::nearest_safe_point_locked(&inner, position);
                let nudged = Point2::new(
                    position.x + (safe.x - position.x) * 0.1,
                    position.y + (safe.y - position.y) * 0.1,
                );
                EnforcementOutcome { position: nudged, velocity, violated: true }
            }
            EnforcementMode::Hard => {
                let safe = Self::nearest_safe_point_locked(&inner, position);
                let mut mirrored = velocity;
                if position.x < world_min.x || position.x > world_max.x {
                    mirrored.x = -mirrored.x;
                }
                if position.y < world_min.y || position.y > world_max.y {
                    mirrored.y = -mirrored.y;
                }
                EnforcementOutcome { position: safe, velocity: mirrored, violated: true }
            }
            EnforcementMode::Teleport => {
                let safe = Self::nearest_safe_point_locked(&inner, position);
                EnforcementOutcome { position: safe, velocity: Vec2::ZERO, violated: true }
            }
        };
        drop(inner);

        warn!(agent = agent_id.raw(), "boundary violation");
        self.bus.publish(SwarmEvent::system(
            "BOUNDARY_VIOLATION",
            Severity::Warning,
            format!("agent {} left the valid region", agent_id),
            Utc::now(),
        ));

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_types::ZoneShape;

    fn manager(mode: EnforcementMode) -> BoundaryManager {
        BoundaryManager::new(800.0, 600.0, mode, EventBus::new())
    }

    #[test]
    fn point_inside_world_with_no_zones_is_valid() {
        let m = manager(EnforcementMode::Soft);
        assert!(m.is_valid(Point2::new(400.0, 300.0)));
    }

    #[test]
    fn point_at_exact_boundary_is_valid() {
        let m = manager(EnforcementMode::Soft);
        assert!(m.is_valid(Point2::new(800.0, 600.0)));
        assert!(m.is_valid(Point2::new(0.0, 0.0)));
    }

    #[test]
    fn point_outside_world_is_invalid() {
        let m = manager(EnforcementMode::Soft);
        assert!(!m.is_valid(Point2::new(900.0, 300.0)));
    }

    #[test]
    fn restricted_zone_tangent_point_is_invalid() {
        let m = manager(EnforcementMode::Soft);
        m.add_zone(
            ZoneId::new(1),
            Zone::new(ZoneShape::Circle { center: Point2::new(400.0, 300.0), radius: 50.0 }, ZoneRole::Restricted),
        );
        assert!(!m.is_valid(Point2::new(450.0, 300.0)));
    }

    #[test]
    fn with_safe_zones_only_points_inside_one_are_valid() {
        let m = manager(EnforcementMode::Soft);
        m.add_zone(
            ZoneId::new(1),
            Zone::new(
                ZoneShape::Rectangle { min: Point2::new(0.0, 0.0), max: Point2::new(100.0, 100.0) },
                ZoneRole::Safe,
            ),
        );
        assert!(m.is_valid(Point2::new(50.0, 50.0)));
        assert!(!m.is_valid(Point2::new(500.0, 500.0)));
    }

    #[test]
    fn soft_mode_leaves_position_unchanged() {
        let m = manager(EnforcementMode::Soft);
        let out = m.enforce(AgentId::new(1), Point2::new(900.0, 300.0), Vec2::new(10.0, 0.0));
        assert!(out.violated);
        assert_eq!(out.position, Point2::new(900.0, 300.0));
    }

    #[test]
    fn hard_mode_snaps_and_mirrors_crossing_velocity() {
        let m = manager(EnforcementMode::Hard);
        let out = m.enforce(AgentId::new(1), Point2::new(805.0, 300.0), Vec2::new(100.0, 0.0));
        assert!(out.violated);
        assert!(out.position.x <= 800.0);
        assert!(out.velocity.x < 0.0);
    }

    #[test]
    fn teleport_mode_zeroes_velocity() {
        let m = manager(EnforcementMode::Teleport);
        let out = m.enforce(AgentId::new(1), Point2::new(-10.0, 300.0), Vec2::new(-5.0, 5.0));
        assert_eq!(out.velocity, Vec2::ZERO);
        assert!(out.position.x >= 0.0);
    }

    #[test]
    fn medium_mode_moves_partway_toward_safe_point() {
        let m = manager(EnforcementMode::Medium);
        let start = Point2::new(900.0, 300.0);
        let out = m.enforce(AgentId::new(1), start, Vec2::ZERO);
        assert!(out.position.x < start.x);
        assert!(out.position.x > 790.0);
    }

    #[test]
    fn violations_are_counted_per_agent() {
        let m = manager(EnforcementMode::Soft);
        m.enforce(AgentId::new(1), Point2::new(900.0, 300.0), Vec2::ZERO);
        m.enforce(AgentId::new(1), Point2::new(900.0, 300.0), Vec2::ZERO);
        assert_eq!(m.violation_count(AgentId::new(1)), 2);
    }

    #[test]
    fn nearest_safe_point_escapes_fully_restricted_clamp_target() {
        let m = manager(EnforcementMode::Hard);
        // Restricted zone covering the whole clamp target near the corner.
        m.add_zone(
            ZoneId::new(1),
            Zone::new(
                ZoneShape::Rectangle { min: Point2::new(0.0, 0.0), max: Point2::new(50.0, 50.0) },
                ZoneRole::Restricted,
            ),
        );
        let safe = m.nearest_safe_point(Point2::new(-10.0, -10.0));
        assert!(m.is_valid(safe));
    }
}
