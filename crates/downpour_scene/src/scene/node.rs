//! Scene node storage entry
//!
//! A node keeps its local transform as translation + quaternion + scale so
//! incremental edits ("rotate the wheel a bit more") stay numerically stable,
//! and caches the world matrix computed by `Scene::update_transforms`.

use crate::foundation::math::{Aabb, Mat4, Quat, Transform, Vec3};
use crate::scene::NodeHandle;

/// Identifier of an externally owned model (geometry + index buffers)
///
/// The scene never owns or dereferences models; the renderer resolves the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
pub struct ModelId(pub u32);

/// Material identifier assigned by the external material manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
pub struct MaterialId(pub u32);

impl MaterialId {
    /// Sentinel bound to nodes whose asset material has no mapping
    pub const FALLBACK: Self = Self(0);
}

/// Rendering payload of a node that draws a mesh primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderData {
    /// Model the primitive's geometry lives in
    pub model: ModelId,
    /// Mesh index within the model
    pub mesh_index: u32,
    /// Primitive index within the mesh
    pub primitive_index: u32,
    /// Material manager id used to draw the primitive
    pub material_id: MaterialId,
    /// First index of the primitive in the model's index buffer
    pub index_start: u32,
    /// Number of indices to draw
    pub index_count: u32,
    /// Hidden nodes are skipped by batching and visibility queries
    pub is_visible: bool,
    /// Transparent primitives are drawn after all opaque ones
    pub is_transparent: bool,
}

impl RenderData {
    /// Create visible, opaque render data for a whole mesh primitive
    pub const fn new(model: ModelId, mesh_index: u32, material_id: MaterialId) -> Self {
        Self {
            model,
            mesh_index,
            primitive_index: 0,
            material_id,
            index_start: 0,
            index_count: 0,
            is_visible: true,
            is_transparent: false,
        }
    }

    /// Builder pattern: Set the index range
    pub const fn with_index_range(mut self, index_start: u32, index_count: u32) -> Self {
        self.index_start = index_start;
        self.index_count = index_count;
        self
    }

    /// Builder pattern: Set transparency
    pub const fn with_transparency(mut self, is_transparent: bool) -> Self {
        self.is_transparent = is_transparent;
        self
    }
}

/// A single entry of a scene's flat node storage
#[derive(Debug, Clone)]
pub struct SceneNode {
    name: String,

    pub(crate) parent: NodeHandle,
    pub(crate) children: Vec<NodeHandle>,

    local: Transform,
    pub(crate) world_transform: Mat4,
    pub(crate) is_dirty: bool,
    is_static: bool,

    render_data: Option<RenderData>,
    bounds: Option<Aabb>,
}

impl SceneNode {
    /// Create a detached node with identity transform, marked dirty
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: NodeHandle::INVALID,
            children: Vec::new(),
            local: Transform::identity(),
            world_transform: Mat4::identity(),
            is_dirty: true,
            is_static: false,
            render_data: None,
            bounds: None,
        }
    }

    /// Node name as given at creation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent handle ([`NodeHandle::INVALID`] for roots)
    pub const fn parent(&self) -> NodeHandle {
        self.parent
    }

    /// Child handles in attachment order
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Local TRS transform
    pub const fn local(&self) -> &Transform {
        &self.local
    }

    /// Local translation
    pub const fn local_position(&self) -> Vec3 {
        self.local.position
    }

    /// Local rotation
    pub const fn local_rotation(&self) -> Quat {
        self.local.rotation
    }

    /// Local per-axis scale
    pub const fn local_scale(&self) -> Vec3 {
        self.local.scale
    }

    /// Compose the local transform as `T * R * S`
    pub fn local_transform(&self) -> Mat4 {
        self.local.to_matrix()
    }

    /// Replace the local transform from a matrix (decomposed into TRS)
    ///
    /// Exact only for matrices without shear.
    pub fn set_local_transform(&mut self, matrix: Mat4) {
        self.local = Transform::from_matrix(matrix);
        self.is_dirty = true;
    }

    /// Set the local translation
    pub fn set_local_position(&mut self, position: Vec3) {
        self.local.position = position;
        self.is_dirty = true;
    }

    /// Set the local rotation
    pub fn set_local_rotation(&mut self, rotation: Quat) {
        self.local.rotation = rotation;
        self.is_dirty = true;
    }

    /// Set the local per-axis scale
    pub fn set_local_scale(&mut self, scale: Vec3) {
        self.local.scale = scale;
        self.is_dirty = true;
    }

    /// Cached world matrix, valid only while the node is clean
    pub const fn world_transform(&self) -> &Mat4 {
        &self.world_transform
    }

    /// Translation part of the cached world matrix
    pub fn world_position(&self) -> Vec3 {
        Vec3::new(
            self.world_transform.m14,
            self.world_transform.m24,
            self.world_transform.m34,
        )
    }

    /// True if the cached world matrix is stale
    pub const fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Static nodes that are clean are skipped, with their subtree, during propagation
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Mark the node static or dynamic
    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
    }

    /// Rendering payload, if this node draws something
    pub const fn render_data(&self) -> Option<&RenderData> {
        self.render_data.as_ref()
    }

    /// Mutable rendering payload
    pub fn render_data_mut(&mut self) -> Option<&mut RenderData> {
        self.render_data.as_mut()
    }

    /// Attach rendering payload
    pub fn set_render_data(&mut self, render_data: RenderData) {
        self.render_data = Some(render_data);
    }

    /// Remove rendering payload
    pub fn clear_render_data(&mut self) -> Option<RenderData> {
        self.render_data.take()
    }

    /// Toggle visibility; does nothing for nodes without render data
    pub fn set_visible(&mut self, visible: bool) {
        if let Some(render_data) = self.render_data.as_mut() {
            render_data.is_visible = visible;
        }
    }

    /// True if the node has render data and is visible
    pub fn is_renderable(&self) -> bool {
        self.render_data.as_ref().is_some_and(|r| r.is_visible)
    }

    /// Local-space bounds used for frustum culling
    pub const fn bounds(&self) -> Option<&Aabb> {
        self.bounds.as_ref()
    }

    /// Set local-space bounds
    pub fn set_bounds(&mut self, bounds: Option<Aabb>) {
        self.bounds = bounds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{constants::HALF_PI, Unit};
    use approx::assert_relative_eq;

    #[test]
    fn test_new_node_defaults() {
        let node = SceneNode::new("chassis");

        assert_eq!(node.name(), "chassis");
        assert!(!node.parent().is_valid());
        assert!(node.children().is_empty());
        assert!(node.is_dirty());
        assert!(!node.is_static());
        assert!(node.render_data().is_none());
        assert_eq!(node.local_transform(), Mat4::identity());
    }

    #[test]
    fn test_local_transform_is_t_r_s() {
        let mut node = SceneNode::new("wheel");
        node.set_local_position(Vec3::new(1.0, 2.0, 3.0));
        node.set_local_rotation(Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI));
        node.set_local_scale(Vec3::new(2.0, 1.0, 1.0));

        let expected = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0))
            * Quat::from_axis_angle(&Vec3::y_axis(), HALF_PI).to_homogeneous()
            * Mat4::new_nonuniform_scaling(&Vec3::new(2.0, 1.0, 1.0));
        assert_relative_eq!(node.local_transform(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_set_local_transform_roundtrip() {
        let matrix = Mat4::new_translation(&Vec3::new(-4.0, 0.5, 9.0))
            * Quat::from_axis_angle(&Unit::new_normalize(Vec3::new(0.3, 1.0, -0.2)), 1.1).to_homogeneous()
            * Mat4::new_nonuniform_scaling(&Vec3::new(0.5, 3.0, 1.25));

        let mut node = SceneNode::new("hood");
        node.is_dirty = false;
        node.set_local_transform(matrix);

        assert!(node.is_dirty());
        assert_relative_eq!(node.local_transform(), matrix, epsilon = 1e-5);
        assert_relative_eq!(node.local_scale(), Vec3::new(0.5, 3.0, 1.25), epsilon = 1e-5);
    }

    #[test]
    fn test_visibility_toggle_requires_render_data() {
        let mut node = SceneNode::new("empty");
        node.set_visible(false);
        assert!(!node.is_renderable());

        node.set_render_data(RenderData::new(ModelId(1), 0, MaterialId(3)));
        assert!(node.is_renderable());

        node.set_visible(false);
        assert!(!node.is_renderable());
        assert_eq!(node.render_data().map(|r| r.material_id), Some(MaterialId(3)));
    }
}
