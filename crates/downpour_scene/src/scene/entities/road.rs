//! Road entity

use crate::config::{require_positive, Config, ConfigError};
use crate::scene::{Entity, EntityKind, SceneEntity};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Road layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    /// Road width (m)
    pub width: f32,
    /// Total road length (m)
    pub length: f32,
    /// Number of visual/logical segments
    pub segments: u32,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            width: 10.0,
            length: 50_000.0,
            segments: 1000,
        }
    }
}

impl Config for RoadConfig {}

impl RoadConfig {
    /// Check that the layout is usable
    pub fn validate(&self, owner: &str) -> Result<(), ConfigError> {
        require_positive(owner, "width", self.width)?;
        require_positive(owner, "length", self.length)?;
        if self.segments == 0 {
            return Err(ConfigError::MissingValue {
                owner: owner.to_string(),
                field: "segments",
            });
        }
        Ok(())
    }
}

/// Road surface split into segments
#[derive(Debug, Clone)]
pub struct RoadEntity {
    entity: Entity,
    config: RoadConfig,
}

impl RoadEntity {
    /// Create a road with default layout
    pub fn new(name: &str, scene_name: &str) -> Self {
        Self {
            entity: Entity::new(name, scene_name),
            config: RoadConfig::default(),
        }
    }

    /// Current layout
    pub const fn config(&self) -> &RoadConfig {
        &self.config
    }

    /// Mutable layout, unchecked
    pub fn config_mut(&mut self) -> &mut RoadConfig {
        &mut self.config
    }

    /// Validate and install a layout
    pub fn apply_config(&mut self, config: RoadConfig) -> Result<(), ConfigError> {
        config.validate(self.entity.name())?;
        self.config = config;
        Ok(())
    }

    /// Length of one segment; the whole road when unsegmented
    #[allow(clippy::cast_precision_loss)]
    pub fn segment_length(&self) -> f32 {
        match self.config.segments {
            0 => self.config.length,
            n => self.config.length / n as f32,
        }
    }
}

impl SceneEntity for RoadEntity {
    fn create(name: &str, scene_name: &str) -> Self {
        Self::new(name, scene_name)
    }

    fn entity(&self) -> &Entity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Road
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
