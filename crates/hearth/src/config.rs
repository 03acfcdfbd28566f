//! Engine configuration.
//!
//! [`EngineConfig`] is plain serde data. Every field has a default, so a JSON
//! file only needs to name the values it overrides:
//!
//! ```json
//! { "physics": { "fixed_hz": 120.0 }, "reload": { "debounce_ms": 500 } }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::Vec3;

/// Top-level configuration consumed by [`App`](crate::app::App) and
/// [`World`](crate::ecs::World).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    pub hierarchy: HierarchyConfig,
    pub reload: ReloadConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Simulation rate of the fixed-timestep accumulator.
    pub fixed_hz: f32,
    /// Upper bound on simulation steps run in a single frame.
    pub max_steps_per_frame: u32,
    pub gravity: Vec3,
}

impl PhysicsConfig {
    pub fn fixed_timestep(&self) -> f32 {
        1.0 / self.fixed_hz
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_hz: 60.0,
            max_steps_per_frame: 4,
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Parent links followed before a chain is treated as rooted.
    pub max_depth: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Directory watched for source changes.
    pub watch_dir: PathBuf,
    /// Only files with this extension trigger a reload.
    pub extension: String,
    pub debounce_ms: u64,
    /// Command run before loading new code, e.g. `["cargo", "build", "-p", "game"]`.
    pub build_command: Vec<String>,
}

impl ReloadConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            watch_dir: PathBuf::from("game_logic"),
            extension: "rs".to_string(),
            debounce_ms: 300,
            build_command: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse a config from a JSON string and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Reject values the engine cannot run with (zero rates, zero limits).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics.fixed_hz.is_nan() || self.physics.fixed_hz <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "physics.fixed_hz must be positive, got {}",
                self.physics.fixed_hz
            )));
        }
        if self.physics.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "physics.max_steps_per_frame must be at least 1".to_string(),
            ));
        }
        if self.hierarchy.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "hierarchy.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
