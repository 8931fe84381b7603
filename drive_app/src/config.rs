//! Demo settings

use downpour_scene::config::{require_positive, Config, ConfigError};
use downpour_scene::prelude::{CameraConfig, CarConfig, RoadConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Settings of one demo run, read from TOML or RON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// `env_logger` filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Number of simulation ticks to run
    pub ticks: u32,
    /// Seconds per tick
    pub delta_time: f32,
    /// Forward speed of the car (m/s)
    pub speed: f32,
    /// Hierarchy description to build instead of the procedural sedan
    pub asset_path: Option<String>,
    /// Role -> node name overrides for the loaded hierarchy
    pub role_nodes: HashMap<String, String>,

    /// Car dimensions and limits
    pub car: CarConfig,
    /// Cockpit camera placement
    pub camera: CameraConfig,
    /// Road layout
    pub road: RoadConfig,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            ticks: 120,
            delta_time: 1.0 / 60.0,
            speed: 12.0,
            asset_path: None,
            role_nodes: HashMap::new(),
            car: CarConfig::default(),
            camera: CameraConfig::default(),
            road: RoadConfig::default(),
        }
    }
}

impl Config for DriveConfig {}

impl DriveConfig {
    /// Check the run settings; entity settings are checked by the entities
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("drive", "delta_time", self.delta_time)?;
        if !self.speed.is_finite() {
            return Err(ConfigError::InvalidValue {
                owner: "drive".to_string(),
                field: "speed",
                value: self.speed,
            });
        }
        Ok(())
    }
}
