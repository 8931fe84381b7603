//! Scene management
//!
//! Hierarchical node storage with generational handles, lazy world-transform
//! propagation, the entity facade over named nodes, conversion of loaded
//! model hierarchies into nodes, and the manager owning scenes and entities.
//!
//! Per-frame order: mutate nodes, call [`Scene::update_transforms`] (or
//! [`SceneManager::update`]), then read world transforms and render batches.

pub mod asset;
pub mod builder;
pub mod entities;
pub mod entity;
pub mod handle;
pub mod node;
pub mod render_queue;
pub mod scene_graph;
pub mod scene_manager;

#[cfg(test)]
mod tests;

pub use asset::{AssetError, AssetMaterial, AssetModel, AssetNode, AssetScene};
pub use builder::SceneBuilder;
pub use entities::{
    CameraConfig, CameraEntity, CameraMode, CarConfig, CarEntity, RoadConfig, RoadEntity, Side,
};
pub use entity::{Entity, EntityKind, SceneEntity};
pub use handle::{NodeHandle, SlotAllocator};
pub use node::{MaterialId, ModelId, RenderData, SceneNode};
pub use render_queue::RenderBatch;
pub use scene_graph::Scene;
pub use scene_manager::SceneManager;
