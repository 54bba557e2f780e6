//! [`SimAdapter`] – in-process default hardware backend.
//!
//! Mirrors the teacher's `sim`/`sim_registry` stub-driver idiom: no real
//! I/O, just enough state to exercise the adapter contract end to end.

use swarm_types::{AgentId, Point2, Vec2};

use crate::adapter::{HardwareAdapter, HardwareConfig, HardwareStatus};
use crate::error::HalError;

pub struct SimAdapter {
    id: Option<AgentId>,
    pose: Point2,
    velocity: Vec2,
    target: Option<Point2>,
    battery: f64,
    max_speed: f64,
}

impl SimAdapter {
    pub fn new() -> Self {
        Self {
            id: None,
            pose: Point2::new(0.0, 0.0),
            velocity: Vec2::ZERO,
            target: None,
            battery: 1.0,
            max_speed: HardwareConfig::default().max_speed,
        }
    }
}

impl Default for SimAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter for SimAdapter {
    fn initialize(&mut self, id: AgentId, config: &HardwareConfig) -> Result<(), HalError> {
        self.id = Some(id);
        self.max_speed = config.max_speed;
        self.battery = 1.0;
        Ok(())
    }

    fn set_velocity(&mut self, linear: f64, angular: f64) -> Result<(), HalError> {
        let heading = angular;
        self.velocity = Vec2::new(linear * heading.cos(), linear * heading.sin()).clamp_length(self.max_speed);
        Ok(())
    }

    fn set_velocity_vector(&mut self, velocity: Vec2) -> Result<(), HalError> {
        self.velocity = velocity.clamp_length(self.max_speed);
        Ok(())
    }

    fn set_target_position(&mut self, target: Point2) -> Result<(), HalError> {
        self.target = Some(target);
        Ok(())
    }

    fn emergency_stop(&mut self) -> Result<(), HalError> {
        self.velocity = Vec2::ZERO;
        self.target = None;
        Ok(())
    }

    fn get_status(&self) -> HardwareStatus {
        HardwareStatus { pose: self.pose, battery: self.battery, connected: true, error: None }
    }

    fn update(&mut self, dt: f64) -> Result<(), HalError> {
        if let Some(target) = self.target {
            let to_target = target - self.pose;
            if to_target.length() > 1e-6 {
                self.velocity = to_target.normalize().scale(self.max_speed);
            } else {
                self.velocity = Vec2::ZERO;
                self.target = None;
            }
        }
        self.pose = self.pose + self.velocity.scale(dt);
        self.battery = (self.battery - self.velocity.length() * dt * 0.0005).max(0.0);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        self.velocity = Vec2::ZERO;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), HalError> {
        self.pose = Point2::new(0.0, 0.0);
        self.velocity = Vec2::ZERO;
        self.target = None;
        self.battery = 1.0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_moves_pose_toward_target() {
        let mut sim = SimAdapter::new();
        sim.initialize(AgentId::new(1), &HardwareConfig::default()).unwrap();
        sim.set_target_position(Point2::new(10.0, 0.0)).unwrap();
        for _ in 0..100 {
            sim.update(0.1).unwrap();
        }
        assert!((sim.get_status().pose.x - 10.0).abs() < 1.0);
    }

    #[test]
    fn emergency_stop_zeroes_velocity_and_clears_target() {
        let mut sim = SimAdapter::new();
        sim.set_velocity_vector(Vec2::new(5.0, 0.0)).unwrap();
        sim.set_target_position(Point2::new(100.0, 0.0)).unwrap();
        sim.emergency_stop().unwrap();
        sim.update(1.0).unwrap();
        assert_eq!(sim.get_status().pose, Point2::new(0.0, 0.0));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut sim = SimAdapter::new();
        sim.set_velocity_vector(Vec2::new(5.0, 5.0)).unwrap();
        sim.update(1.0).unwrap();
        sim.reset().unwrap();
        let status = sim.get_status();
        assert_eq!(status.pose, Point2::new(0.0, 0.0));
        assert_eq!(status.battery, 1.0);
    }

    #[test]
    fn status_is_always_connected() {
        let sim = SimAdapter::new();
        assert!(sim.get_status().connected);
    }
}
