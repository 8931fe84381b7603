//! # DownPour Scene
//!
//! Scene graph and entity layer of the DownPour driving/rain simulation.
//!
//! ## Features
//!
//! - **Generational Handles**: Stable node references that detect use after destruction
//! - **Hierarchical Transforms**: TRS local transforms with lazy, dirty-driven world propagation
//! - **Entity Facade**: Named roles ("wheel_FL", "left_wiper") over Scene-owned nodes
//! - **Asset Hierarchies**: Conversion of loaded model node trees into live scene nodes
//! - **Render Batching**: Opaque-before-transparent batches grouped by model
//!
//! ## Quick Start
//!
//! ```rust
//! use downpour_scene::prelude::*;
//!
//! let mut manager = SceneManager::new();
//! let scene = manager.create_scene("driving");
//!
//! let body = scene.create_node("car_body");
//! let wheel = scene.create_child_node("wheel_FL", body);
//!
//! if let Some(node) = scene.node_mut(body) {
//!     node.set_local_position(Vec3::new(2.0, 0.0, 0.0));
//! }
//! scene.update_transforms();
//!
//! let world = scene.node(wheel).map(|n| n.world_position());
//! assert_eq!(world, Some(Vec3::new(2.0, 0.0, 0.0)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod scene;

/// Common imports for scene users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        foundation::math::{Aabb, Frustum, Mat4, Quat, Transform, Vec3},
        scene::{
            AssetError, AssetMaterial, AssetModel, AssetNode, AssetScene, CameraConfig,
            CameraEntity, CameraMode, CarConfig, CarEntity, Entity, EntityKind, MaterialId,
            ModelId, NodeHandle, RenderBatch, RenderData, RoadConfig, RoadEntity, Scene,
            SceneBuilder, SceneEntity, SceneManager, SceneNode, Side,
        },
    };
}
