//! [`HardwareAdapter`] – the single driver contract the core talks to.
//!
//! The teacher's HAL splits drivers by hardware shape (`Actuator`, `Relay`,
//! `Camera`), each a narrow trait routed to by id. A swarm agent has one
//! underlying shape — a velocity/pose-controlled vehicle — so the contract
//! collapses to one trait; a real deployment's serial/CAN/ROS bridge
//! implements it exactly the way a driver there implements `Actuator`.

use swarm_types::{AgentId, Point2, Vec2};

use crate::error::HalError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareConfig {
    pub max_speed: f64,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self { max_speed: 50.0 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HardwareStatus {
    pub pose: Point2,
    pub battery: f64,
    pub connected: bool,
    pub error: Option<String>,
}

/// Contract consumed by the core and implemented by each hardware backend.
/// The simulation adapter is the default; a serial adapter is pluggable
/// behind the same trait.
pub trait HardwareAdapter: Send {
    fn initialize(&mut self, id: AgentId, config: &HardwareConfig) -> Result<(), HalError>;
    fn set_velocity(&mut self, linear: f64, angular: f64) -> Result<(), HalError>;
    fn set_velocity_vector(&mut self, velocity: Vec2) -> Result<(), HalError>;
    fn set_target_position(&mut self, target: Point2) -> Result<(), HalError>;
    fn emergency_stop(&mut self) -> Result<(), HalError>;
    fn get_status(&self) -> HardwareStatus;
    fn update(&mut self, dt: f64) -> Result<(), HalError>;
    fn shutdown(&mut self) -> Result<(), HalError>;
    fn reset(&mut self) -> Result<(), HalError>;
}
