//! [`SerialAdapter`] – pluggable-seam stub for a real serial/CAN bridge.
//!
//! Documents where a physical driver plugs in without implementing actual
//! I/O, which is out of scope here. Every call reports the adapter as
//! disconnected until a real implementation replaces this stub.

use swarm_types::{AgentId, Point2, Vec2};

use crate::adapter::{HardwareAdapter, HardwareConfig, HardwareStatus};
use crate::error::HalError;

pub struct SerialAdapter {
    port: String,
    id: Option<AgentId>,
}

impl SerialAdapter {
    pub fn new(port: impl Into<String>) -> Self {
        Self { port: port.into(), id: None }
    }
}

impl HardwareAdapter for SerialAdapter {
    fn initialize(&mut self, id: AgentId, _config: &HardwareConfig) -> Result<(), HalError> {
        self.id = Some(id);
        Err(HalError::Disconnected(id.raw()))
    }

    fn set_velocity(&mut self, _linear: f64, _angular: f64) -> Result<(), HalError> {
        Err(HalError::Disconnected(self.id.map(|i| i.raw()).unwrap_or(0)))
    }

    fn set_velocity_vector(&mut self, _velocity: Vec2) -> Result<(), HalError> {
        Err(HalError::Disconnected(self.id.map(|i| i.raw()).unwrap_or(0)))
    }

    fn set_target_position(&mut self, _target: Point2) -> Result<(), HalError> {
        Err(HalError::Disconnected(self.id.map(|i| i.raw()).unwrap_or(0)))
    }

    fn emergency_stop(&mut self) -> Result<(), HalError> {
        Ok(())
    }

    fn get_status(&self) -> HardwareStatus {
        HardwareStatus {
            pose: Point2::new(0.0, 0.0),
            battery: 0.0,
            connected: false,
            error: Some(format!("serial port {} not implemented", self.port)),
        }
    }

    fn update(&mut self, _dt: f64) -> Result<(), HalError> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        Ok(())
    }

    fn reset(&mut self) -> Result<(), HalError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reports_disconnected() {
        let adapter = SerialAdapter::new("/dev/ttyUSB0");
        let status = adapter.get_status();
        assert!(!status.connected);
        assert!(status.error.is_some());
    }

    #[test]
    fn initialize_fails_without_real_hardware() {
        let mut adapter = SerialAdapter::new("/dev/ttyUSB0");
        assert!(adapter.initialize(AgentId::new(1), &HardwareConfig::default()).is_err());
    }
}
