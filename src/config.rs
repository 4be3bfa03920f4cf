//! Scene configuration
//!
//! All settings have defaults matching the stock scene, and every table uses
//! `#[serde(default)]` so a TOML file only needs the values it overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::simulation::DEFAULT_CAPACITY;

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level scene configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub window: WindowConfig,
    pub spawn: SpawnConfig,
    pub camera: CameraConfig,
    /// OBJ file of the mesh that gets spawned
    pub model_path: PathBuf,
    /// Fixed spawn seed; seeded from the wall clock when absent
    pub seed: Option<u64>,
    pub pool_capacity: usize,
    /// Base scale of a fully grown instance
    pub instance_scale: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            spawn: SpawnConfig::default(),
            camera: CameraConfig::default(),
            model_path: PathBuf::from("assets/model/model.obj"),
            seed: None,
            pool_capacity: DEFAULT_CAPACITY,
            instance_scale: 0.5,
        }
    }
}

impl SceneConfig {
    /// Loads a config from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the renderer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !(self.instance_scale.is_finite() && self.instance_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "instance_scale must be positive, got {}",
                self.instance_scale
            )));
        }
        self.spawn.validate()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 900,
            title: "Spinfield".to_string(),
            vsync: true,
        }
    }
}

/// Ranges the spawn controller draws from
///
/// Positions are drawn per axis in `[-position_extent, position_extent]`,
/// rotation axes in `[-axis_extent, axis_extent]` and speeds (deg/s) in
/// `[-max_angular_speed, max_angular_speed]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpawnConfig {
    pub position_extent: f32,
    pub axis_extent: f32,
    pub max_angular_speed: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            position_extent: 5.0,
            axis_extent: 1.0,
            max_angular_speed: 500.0,
        }
    }
}

impl SpawnConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let ranges = [
            ("position_extent", self.position_extent),
            ("axis_extent", self.axis_extent),
            ("max_angular_speed", self.max_angular_speed),
        ];
        for (name, value) in ranges {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "spawn.{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Units per second
    pub movement_speed: f32,
    /// Degrees per pixel of mouse travel
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            movement_speed: 2.5,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
        }
    }
}
