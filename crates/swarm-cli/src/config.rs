//! Persisted configuration – reads/writes `~/.swarm/config.toml`.
//!
//! Mirrors the teacher's `~/.mechos/config.toml` load/save/env-override
//! shape, applied to [`EngineConfig`] instead of AI-provider settings.

use std::fs;
use std::path::PathBuf;

use swarm_types::EngineConfig;

/// Return the path to `~/.swarm/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".swarm").join("config.toml")
}

/// Load the config from disk. Returns `None` if the file does not exist.
pub fn load() -> Result<Option<EngineConfig>, String> {
    load_from(&config_path())
}

pub(crate) fn load_from(path: &PathBuf) -> Result<Option<EngineConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| format!("failed to read config at {}: {e}", path.display()))?;
    let mut cfg: EngineConfig = toml::from_str(&raw).map_err(|e| format!("failed to parse config: {e}"))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `SWARM_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `SWARM_FPS` | `target_fps` (and derived `update_interval_ms`) |
/// | `SWARM_WORLD_WIDTH` | `world_width` |
/// | `SWARM_WORLD_HEIGHT` | `world_height` |
/// | `SWARM_MAX_AGENTS` | `max_agents` |
pub fn apply_env_overrides(cfg: &mut EngineConfig) {
    if let Ok(v) = std::env::var("SWARM_FPS")
        && let Ok(fps) = v.parse::<u32>()
        && fps > 0
    {
        cfg.target_fps = fps;
        cfg.update_interval_ms = (1000 / fps).max(1);
    }
    if let Ok(v) = std::env::var("SWARM_WORLD_WIDTH")
        && let Ok(w) = v.parse::<f64>()
    {
        cfg.world_width = w;
    }
    if let Ok(v) = std::env::var("SWARM_WORLD_HEIGHT")
        && let Ok(h) = v.parse::<f64>()
    {
        cfg.world_height = h;
    }
    if let Ok(v) = std::env::var("SWARM_MAX_AGENTS")
        && let Ok(n) = v.parse::<u32>()
    {
        cfg.max_agents = n;
    }
}

/// Save the config to disk, creating `~/.swarm/` if necessary.
pub fn save(cfg: &EngineConfig) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &EngineConfig, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("failed to create config directory: {e}"))?;
    }
    let raw = toml::to_string_pretty(cfg).map_err(|e| format!("failed to serialize config: {e}"))?;
    fs::write(path, raw).map_err(|e| format!("failed to write config at {}: {e}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = EngineConfig::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn config_path_points_to_swarm_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".swarm"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn apply_env_overrides_changes_fps_and_interval() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("SWARM_FPS", "20") };
        let mut cfg = EngineConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.target_fps, 20);
        assert_eq!(cfg.update_interval_ms, 50);
        unsafe { std::env::remove_var("SWARM_FPS") };
    }

    #[test]
    fn apply_env_overrides_changes_world_dims() {
        unsafe {
            std::env::set_var("SWARM_WORLD_WIDTH", "1000");
            std::env::set_var("SWARM_WORLD_HEIGHT", "500");
        }
        let mut cfg = EngineConfig::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.world_width, 1000.0);
        assert_eq!(cfg.world_height, 500.0);
        unsafe {
            std::env::remove_var("SWARM_WORLD_WIDTH");
            std::env::remove_var("SWARM_WORLD_HEIGHT");
        }
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_fps() {
        unsafe { std::env::set_var("SWARM_FPS", "not-a-number") };
        let mut cfg = EngineConfig::default();
        let original = cfg.target_fps;
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.target_fps, original);
        unsafe { std::env::remove_var("SWARM_FPS") };
    }
}
