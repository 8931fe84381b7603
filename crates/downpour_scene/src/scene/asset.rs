//! Hierarchy description of a loaded model
//!
//! The model loader hands the scene layer only the parts it needs: a flat
//! node list with transforms and child indices, the scenes listing root
//! indices, and per-primitive material records. Vertex and texture data stay
//! with the loader.

use crate::foundation::math::{Mat4, Quat, Quaternion, Transform, Vec3};
use crate::scene::ModelId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One node of an asset hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetNode {
    /// Node name, preserved in the scene
    pub name: String,

    /// Column-major local matrix; wins over TRS when present and not identity
    #[serde(default)]
    pub matrix: Option<[f32; 16]>,

    /// Local translation
    #[serde(default)]
    pub translation: [f32; 3],

    /// Local rotation quaternion as `[x, y, z, w]`
    #[serde(default = "identity_rotation")]
    pub rotation: [f32; 4],

    /// Local scale
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],

    /// Indices of child nodes in the model's node list
    #[serde(default)]
    pub children: Vec<usize>,

    /// Mesh drawn by this node
    #[serde(default)]
    pub mesh: Option<usize>,
}

const fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

const fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

impl AssetNode {
    /// Create a node with identity transform and no mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matrix: None,
            translation: [0.0; 3],
            rotation: identity_rotation(),
            scale: unit_scale(),
            children: Vec::new(),
            mesh: None,
        }
    }

    /// Builder pattern: Set translation
    pub const fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation;
        self
    }

    /// Builder pattern: Set rotation (`[x, y, z, w]`)
    pub const fn with_rotation(mut self, rotation: [f32; 4]) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: Set local matrix (column-major)
    pub const fn with_matrix(mut self, matrix: [f32; 16]) -> Self {
        self.matrix = Some(matrix);
        self
    }

    /// Builder pattern: Set children
    pub fn with_children(mut self, children: Vec<usize>) -> Self {
        self.children = children;
        self
    }

    /// Builder pattern: Set mesh
    pub const fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    /// Local transform, preferring a non-identity matrix over the TRS fields
    pub fn local_transform(&self) -> Transform {
        if let Some(matrix) = self.matrix {
            let matrix = Mat4::from_column_slice(&matrix);
            if matrix != Mat4::identity() {
                return Transform::from_matrix(matrix);
            }
        }

        let [x, y, z, w] = self.rotation;
        let rotation = Quat::try_new(Quaternion::new(w, x, y, z), 1e-8).unwrap_or_else(Quat::identity);
        Transform::from_trs(Vec3::from(self.translation), rotation, Vec3::from(self.scale))
    }
}

/// A named set of root nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetScene {
    /// Scene name
    #[serde(default)]
    pub name: String,

    /// Root node indices
    pub root_nodes: Vec<usize>,
}

/// Material record of one mesh primitive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMaterial {
    /// Material name
    #[serde(default)]
    pub name: String,
    /// Mesh this material belongs to
    pub mesh_index: usize,
    /// Primitive within the mesh
    #[serde(default)]
    pub primitive_index: u32,
    /// First index of the primitive
    #[serde(default)]
    pub index_start: u32,
    /// Number of indices
    #[serde(default)]
    pub index_count: u32,
    /// Drawn with blending
    #[serde(default)]
    pub is_transparent: bool,
}

/// Hierarchy description of one loaded model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetModel {
    /// Id the renderer knows the model's geometry by
    pub id: ModelId,
    /// Flat node list
    pub nodes: Vec<AssetNode>,
    /// Scenes listing root nodes
    pub scenes: Vec<AssetScene>,
    /// Index into `scenes`
    #[serde(default)]
    pub default_scene: usize,
    /// Material records; the position in this list is the material index
    #[serde(default)]
    pub materials: Vec<AssetMaterial>,
}

impl AssetModel {
    /// True if the model describes a node hierarchy at all
    pub fn has_hierarchy(&self) -> bool {
        !self.nodes.is_empty() && !self.scenes.is_empty()
    }

    /// The default scene, if its index is in range
    pub fn default_scene(&self) -> Option<&AssetScene> {
        self.scenes.get(self.default_scene)
    }

    /// Materials belonging to `mesh`, with their material indices, in list order
    pub fn materials_for_mesh(&self, mesh: usize) -> Vec<(usize, &AssetMaterial)> {
        self.materials
            .iter()
            .enumerate()
            .filter(|(_, material)| material.mesh_index == mesh)
            .collect()
    }

    /// Parse a RON hierarchy description
    pub fn from_ron_str(contents: &str) -> Result<Self, AssetError> {
        ron::from_str(contents).map_err(|e| AssetError::Parse(e.to_string()))
    }

    /// Load a hierarchy description from a `.ron` file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        if path.extension().and_then(|ext| ext.to_str()) != Some("ron") {
            return Err(AssetError::UnsupportedFormat(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let model = Self::from_ron_str(&contents)?;
        log::info!(
            "Loaded model hierarchy from {}: {} nodes, {} scenes, {} materials",
            path.display(),
            model.nodes.len(),
            model.scenes.len(),
            model.materials.len()
        );
        Ok(model)
    }
}

/// Errors raised while loading a hierarchy description
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unsupported format
    #[error("Unsupported asset format: {0}")]
    UnsupportedFormat(String),
}
