//! Pure physics functions over agent pose and a time step `Δt` (seconds).
//!
//! Free functions rather than methods on a heavyweight type, so they are
//! trivial to unit test and to call from both the tick loop and recovery
//! logic.

use swarm_types::{Point2, Vec2};

/// Distance below which two agents are considered collided.
pub const COLLISION_DISTANCE: f64 = 5.0;

/// Integrate `position` forward by `velocity * dt`. A non-finite velocity
/// (NaN from some upstream division) is clamped to zero rather than
/// propagated into the position.
pub fn integrate(position: Point2, velocity: Vec2, dt: f64) -> (Point2, Vec2) {
    if !velocity.is_finite() {
        return (position, Vec2::ZERO);
    }
    (position + velocity.scale(dt), velocity)
}

/// Steering force toward `target` at `desired_speed`.
pub fn seek(position: Point2, velocity: Vec2, target: Point2, desired_speed: f64) -> Vec2 {
    let desired = (target - position).normalize().scale(desired_speed);
    desired - velocity
}

/// Steering force away from `threat` at `desired_speed` — the negation of
/// [`seek`] toward the threat.
pub fn flee(position: Point2, velocity: Vec2, threat: Point2, desired_speed: f64) -> Vec2 {
    seek(position, velocity, threat, desired_speed).scale(-1.0)
}

/// Clamp `velocity`'s magnitude to `v_max`, preserving direction.
pub fn limit_velocity(velocity: Vec2, v_max: f64) -> Vec2 {
    velocity.clamp_length(v_max)
}

/// Whether `a` and `b` are within `radius` of each other.
pub fn collides(a: Point2, b: Point2, radius: f64) -> bool {
    a.distance(b) < radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_advances_position_by_velocity_times_dt() {
        let (pos, vel) = integrate(Point2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 0.5);
        assert_eq!(pos, Point2::new(5.0, 0.0));
        assert_eq!(vel, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn integrate_rejects_non_finite_velocity() {
        let (pos, vel) = integrate(Point2::new(1.0, 1.0), Vec2::new(f64::NAN, 0.0), 1.0);
        assert_eq!(pos, Point2::new(1.0, 1.0));
        assert_eq!(vel, Vec2::ZERO);
    }

    #[test]
    fn seek_targets_desired_speed_toward_target() {
        let force = seek(Point2::new(0.0, 0.0), Vec2::ZERO, Point2::new(10.0, 0.0), 5.0);
        assert_eq!(force, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn flee_is_negation_of_seek() {
        let pos = Point2::new(0.0, 0.0);
        let threat = Point2::new(10.0, 0.0);
        let seek_force = seek(pos, Vec2::ZERO, threat, 5.0);
        let flee_force = flee(pos, Vec2::ZERO, threat, 5.0);
        assert_eq!(flee_force, seek_force.scale(-1.0));
    }

    #[test]
    fn limit_velocity_caps_overlong_vectors() {
        let v = limit_velocity(Vec2::new(30.0, 40.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn collides_detects_close_agents() {
        assert!(collides(Point2::new(0.0, 0.0), Point2::new(3.0, 0.0), COLLISION_DISTANCE));
        assert!(!collides(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), COLLISION_DISTANCE));
    }
}
