//! Engine configuration: the keys enumerated for the control surface,
//! their defaults, and validation.

use serde::{Deserialize, Serialize};

use crate::error::SwarmError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub max_agents: u32,
    pub update_interval_ms: u32,
    pub world_width: f64,
    pub world_height: f64,
    pub target_fps: u32,
    pub command_timeout_ms: u64,
    pub heartbeat_timeout_ms: u64,
    pub recovery_timeout_ms: u64,
    pub max_recovery_attempts: u32,
    pub arrival_threshold: f64,
    pub collision_distance: f64,
    pub cache_ttl_ms: u64,
    pub cache_max_entries: usize,
    pub cache_cell_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_agents: 1000,
            update_interval_ms: 33,
            world_width: 800.0,
            world_height: 600.0,
            target_fps: 30,
            command_timeout_ms: 30_000,
            heartbeat_timeout_ms: 5_000,
            recovery_timeout_ms: 10_000,
            max_recovery_attempts: 3,
            arrival_threshold: 5.0,
            collision_distance: 5.0,
            cache_ttl_ms: 5_000,
            cache_max_entries: 10_000,
            cache_cell_size: 50.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), SwarmError> {
        if self.max_agents == 0 {
            return Err(SwarmError::ConfigInvalid("maxAgents must be > 0".into()));
        }
        if self.update_interval_ms < 1 {
            return Err(SwarmError::ConfigInvalid("updateInterval must be >= 1ms".into()));
        }
        if self.world_width <= 0.0 || self.world_height <= 0.0 {
            return Err(SwarmError::ConfigInvalid("worldWidth/worldHeight must be > 0".into()));
        }
        if self.target_fps == 0 {
            return Err(SwarmError::ConfigInvalid("targetFPS must be > 0".into()));
        }
        if self.max_recovery_attempts == 0 {
            return Err(SwarmError::ConfigInvalid("maxRecoveryAttempts must be > 0".into()));
        }
        if self.cache_cell_size <= 0.0 {
            return Err(SwarmError::ConfigInvalid("cacheCellSize must be > 0".into()));
        }
        if self.cache_max_entries == 0 {
            return Err(SwarmError::ConfigInvalid("cacheMaxEntries must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_max_agents_is_invalid() {
        let mut cfg = EngineConfig::default();
        cfg.max_agents = 0;
        assert!(matches!(cfg.validate(), Err(SwarmError::ConfigInvalid(_))));
    }

    #[test]
    fn negative_world_dims_are_invalid() {
        let mut cfg = EngineConfig::default();
        cfg.world_width = -1.0;
        assert!(cfg.validate().is_err());
    }
}
