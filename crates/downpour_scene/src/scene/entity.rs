//! Entity facade over scene-owned nodes
//!
//! An [`Entity`] names the semantically interesting nodes of a subtree
//! ("wheel_FL", "left_wiper") and forwards transform edits to the owning
//! [`Scene`]. It holds only handles, so dropping or cloning an entity never
//! touches graph state. Every scene-touching call takes the scene explicitly
//! and revalidates the handle; stale handles and unknown roles are no-ops.

use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::scene::{NodeHandle, Scene};
use std::any::Any;
use std::collections::HashMap;

/// Which specialization an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Plain role container
    Generic,
    /// Drivable car with animated parts
    Car,
    /// Camera attached to another entity
    Camera,
    /// Road surface
    Road,
}

/// Capability interface shared by every entity specialization
///
/// Specializations wrap an [`Entity`] and layer typed role accessors and
/// configuration on top of it. `SceneManager` stores them as trait objects
/// and recovers the concrete type through [`SceneEntity::as_any`].
pub trait SceneEntity: Any {
    /// Create an unbound entity registered to `scene_name`
    fn create(name: &str, scene_name: &str) -> Self
    where
        Self: Sized;

    /// Generic role facade
    fn entity(&self) -> &Entity;

    /// Mutable generic role facade
    fn entity_mut(&mut self) -> &mut Entity;

    /// Specialization tag
    fn kind(&self) -> EntityKind;

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete type
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Named set of role -> node bindings with a root node
#[derive(Debug, Clone)]
pub struct Entity {
    name: String,
    scene_name: String,
    root_node: NodeHandle,
    named_nodes: HashMap<String, NodeHandle>,
}

impl Entity {
    /// Create an entity with no nodes
    pub fn new(name: impl Into<String>, scene_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scene_name: scene_name.into(),
            root_node: NodeHandle::INVALID,
            named_nodes: HashMap::new(),
        }
    }

    /// Entity name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the scene owning this entity's nodes
    pub fn scene_name(&self) -> &str {
        &self.scene_name
    }

    /// First node ever added, or invalid
    pub const fn root_node(&self) -> NodeHandle {
        self.root_node
    }

    // ---- Roles ----

    /// Bind a node, optionally under a role
    ///
    /// The first valid node added becomes the root. Binding an existing role
    /// again replaces the previous node.
    pub fn add_node(&mut self, node: NodeHandle, role: &str) {
        if !node.is_valid() {
            return;
        }
        if !self.root_node.is_valid() {
            self.root_node = node;
        }
        if !role.is_empty() {
            self.named_nodes.insert(role.to_string(), node);
        }
    }

    /// Forget the root and every role binding
    pub fn reset(&mut self) {
        self.root_node = NodeHandle::INVALID;
        self.named_nodes.clear();
    }

    /// Node bound to `role`, or invalid
    pub fn node(&self, role: &str) -> NodeHandle {
        self.named_nodes.get(role).copied().unwrap_or(NodeHandle::INVALID)
    }

    /// True if `role` is bound
    pub fn has_role(&self, role: &str) -> bool {
        self.named_nodes.contains_key(role)
    }

    /// Number of bound roles
    pub fn role_count(&self) -> usize {
        self.named_nodes.len()
    }

    /// Root first, then role nodes ordered by role name, without duplicates
    pub fn all_nodes(&self) -> Vec<NodeHandle> {
        let mut roles: Vec<(&String, &NodeHandle)> = self.named_nodes.iter().collect();
        roles.sort_by(|a, b| a.0.cmp(b.0));

        let mut nodes = Vec::with_capacity(roles.len() + 1);
        if self.root_node.is_valid() {
            nodes.push(self.root_node);
        }
        for (_, &handle) in roles {
            if !nodes.contains(&handle) {
                nodes.push(handle);
            }
        }
        nodes
    }

    // ---- Root transform ----

    /// Set the root's local position
    pub fn set_position(&self, scene: &mut Scene, position: Vec3) {
        if let Some(node) = scene.node_mut(self.root_node) {
            node.set_local_position(position);
            scene.mark_subtree_dirty(self.root_node);
        }
    }

    /// Set the root's local rotation
    pub fn set_rotation(&self, scene: &mut Scene, rotation: Quat) {
        if let Some(node) = scene.node_mut(self.root_node) {
            node.set_local_rotation(rotation);
            scene.mark_subtree_dirty(self.root_node);
        }
    }

    /// Set the root's local scale
    pub fn set_scale(&self, scene: &mut Scene, scale: Vec3) {
        if let Some(node) = scene.node_mut(self.root_node) {
            node.set_local_scale(scale);
            scene.mark_subtree_dirty(self.root_node);
        }
    }

    /// Root local position (origin when unbound)
    pub fn position(&self, scene: &Scene) -> Vec3 {
        scene
            .node(self.root_node)
            .map_or_else(Vec3::zeros, |node| node.local_position())
    }

    /// Root local rotation (identity when unbound)
    pub fn rotation(&self, scene: &Scene) -> Quat {
        scene
            .node(self.root_node)
            .map_or_else(Quat::identity, |node| node.local_rotation())
    }

    /// Root local scale (one when unbound)
    pub fn scale(&self, scene: &Scene) -> Vec3 {
        scene
            .node(self.root_node)
            .map_or_else(|| Vec3::repeat(1.0), |node| node.local_scale())
    }

    /// Move the root by `delta`
    pub fn translate(&self, scene: &mut Scene, delta: Vec3) {
        let position = self.position(scene) + delta;
        self.set_position(scene, position);
    }

    /// Apply `delta` on top of the root's current rotation
    pub fn rotate(&self, scene: &mut Scene, delta: Quat) {
        let rotation = delta * self.rotation(scene);
        self.set_rotation(scene, rotation);
    }

    // ---- Per-role animation ----

    /// Replace a role node's local transform
    pub fn animate(&self, scene: &mut Scene, role: &str, local_transform: Mat4) {
        let handle = self.node(role);
        if let Some(node) = scene.node_mut(handle) {
            node.set_local_transform(local_transform);
            scene.mark_subtree_dirty(handle);
        }
    }

    /// Set a role node's local position
    pub fn animate_position(&self, scene: &mut Scene, role: &str, position: Vec3) {
        let handle = self.node(role);
        if let Some(node) = scene.node_mut(handle) {
            node.set_local_position(position);
            scene.mark_subtree_dirty(handle);
        }
    }

    /// Set a role node's local rotation
    pub fn animate_rotation(&self, scene: &mut Scene, role: &str, rotation: Quat) {
        let handle = self.node(role);
        if let Some(node) = scene.node_mut(handle) {
            node.set_local_rotation(rotation);
            scene.mark_subtree_dirty(handle);
        }
    }

    /// Set a role node's local scale
    pub fn animate_scale(&self, scene: &mut Scene, role: &str, scale: Vec3) {
        let handle = self.node(role);
        if let Some(node) = scene.node_mut(handle) {
            node.set_local_scale(scale);
            scene.mark_subtree_dirty(handle);
        }
    }

    /// Cached world position of a role node
    ///
    /// Only as fresh as the last `Scene::update_transforms`.
    pub fn world_position(&self, scene: &Scene, role: &str) -> Option<Vec3> {
        scene.node(self.node(role)).map(|node| node.world_position())
    }
}

impl SceneEntity for Entity {
    fn create(name: &str, scene_name: &str) -> Self {
        Self::new(name, scene_name)
    }

    fn entity(&self) -> &Entity {
        self
    }

    fn entity_mut(&mut self) -> &mut Entity {
        self
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Generic
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
