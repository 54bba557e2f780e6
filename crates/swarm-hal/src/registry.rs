//! [`AdapterRegistry`] – routes adapter calls by [`AgentId`], the way the
//! teacher's `HardwareRegistry` routes by driver id.

use std::collections::HashMap;

use swarm_types::{AgentId, Point2, Vec2};

use crate::adapter::{HardwareAdapter, HardwareConfig, HardwareStatus};
use crate::error::HalError;

#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<AgentId, Box<dyn HardwareAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter` for `id`, initializing it with `config`. Any
    /// previously registered adapter for the same id is replaced.
    pub fn register(&mut self, id: AgentId, mut adapter: Box<dyn HardwareAdapter>, config: &HardwareConfig) -> Result<(), HalError> {
        adapter.initialize(id, config)?;
        self.adapters.insert(id, adapter);
        Ok(())
    }

    pub fn unregister(&mut self, id: AgentId) {
        self.adapters.remove(&id);
    }

    fn get_mut(&mut self, id: AgentId) -> Result<&mut Box<dyn HardwareAdapter>, HalError> {
        self.adapters.get_mut(&id).ok_or(HalError::NotFound(id.raw()))
    }

    pub fn set_velocity(&mut self, id: AgentId, linear: f64, angular: f64) -> Result<(), HalError> {
        self.get_mut(id)?.set_velocity(linear, angular)
    }

    pub fn set_velocity_vector(&mut self, id: AgentId, velocity: Vec2) -> Result<(), HalError> {
        self.get_mut(id)?.set_velocity_vector(velocity)
    }

    pub fn set_target_position(&mut self, id: AgentId, target: Point2) -> Result<(), HalError> {
        self.get_mut(id)?.set_target_position(target)
    }

    pub fn get_status(&self, id: AgentId) -> Result<HardwareStatus, HalError> {
        self.adapters.get(&id).map(|a| a.get_status()).ok_or(HalError::NotFound(id.raw()))
    }

    pub fn update(&mut self, id: AgentId, dt: f64) -> Result<(), HalError> {
        self.get_mut(id)?.update(dt)
    }

    pub fn update_all(&mut self, dt: f64) {
        for adapter in self.adapters.values_mut() {
            let _ = adapter.update(dt);
        }
    }

    /// Halt every registered adapter. Errors from individual adapters are
    /// swallowed — an emergency stop should do as much as it can rather
    /// than abort partway through.
    pub fn emergency_stop_all(&mut self) {
        for adapter in self.adapters.values_mut() {
            let _ = adapter.emergency_stop();
        }
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
