//! Conversion of a model's node hierarchy into live scene nodes

use crate::scene::{AssetModel, MaterialId, NodeHandle, RenderData, Scene};
use std::collections::{HashMap, HashSet};

/// One-shot converter from [`AssetModel`] hierarchies to scene nodes
pub struct SceneBuilder;

impl SceneBuilder {
    /// Instantiate the model's default scene under `scene`
    ///
    /// Every asset node becomes one scene node with the same name and local
    /// transform. A node referencing a mesh is bound to the mesh's first
    /// material; `material_ids` maps material indices to material manager
    /// ids, and unmapped materials fall back to [`MaterialId::FALLBACK`].
    ///
    /// Out-of-range indices are skipped with a warning and the rest of the
    /// hierarchy still builds. An asset node reachable twice is instantiated
    /// once. Returns the created root handles in default-scene order.
    pub fn build_from_model(
        scene: &mut Scene,
        model: &AssetModel,
        material_ids: &HashMap<usize, MaterialId>,
    ) -> Vec<NodeHandle> {
        let Some(asset_scene) = model.default_scene() else {
            log::warn!(
                "Model {:?}: default scene {} out of range ({} scenes)",
                model.id,
                model.default_scene,
                model.scenes.len()
            );
            return Vec::new();
        };

        let mut roots = Vec::new();
        let mut visited = HashSet::new();

        for &root_index in &asset_scene.root_nodes {
            // (asset node index, scene parent)
            let mut stack = vec![(root_index, NodeHandle::INVALID)];

            while let Some((index, parent)) = stack.pop() {
                let Some(asset_node) = model.nodes.get(index) else {
                    log::warn!("Model {:?}: node index {} out of range, skipping", model.id, index);
                    continue;
                };
                if !visited.insert(index) {
                    log::warn!(
                        "Model {:?}: node {} ('{}') referenced more than once, skipping",
                        model.id,
                        index,
                        asset_node.name
                    );
                    continue;
                }

                let handle = if parent.is_valid() {
                    scene.create_child_node(&asset_node.name, parent)
                } else {
                    let root = scene.create_node(&asset_node.name);
                    roots.push(root);
                    root
                };

                let render_data = asset_node
                    .mesh
                    .and_then(|mesh| Self::render_data_for_mesh(model, mesh, material_ids));
                if let Some(node) = scene.node_mut(handle) {
                    let local = asset_node.local_transform();
                    node.set_local_position(local.position);
                    node.set_local_rotation(local.rotation);
                    node.set_local_scale(local.scale);
                    if let Some(render_data) = render_data {
                        node.set_render_data(render_data);
                    }
                }

                // Reversed so children are created in list order
                stack.extend(asset_node.children.iter().rev().map(|&child| (child, handle)));
            }
        }

        log::info!(
            "Built {} root(s), {} node(s) from model {:?} into scene '{}'",
            roots.len(),
            visited.len(),
            model.id,
            scene.name()
        );
        roots
    }

    /// Render data for a mesh from its first material
    fn render_data_for_mesh(
        model: &AssetModel,
        mesh: usize,
        material_ids: &HashMap<usize, MaterialId>,
    ) -> Option<RenderData> {
        let materials = model.materials_for_mesh(mesh);
        let Some(&(material_index, material)) = materials.first() else {
            log::debug!("Model {:?}: mesh {} has no materials, no render data", model.id, mesh);
            return None;
        };
        if materials.len() > 1 {
            log::debug!(
                "Model {:?}: mesh {} has {} primitives, binding only the first",
                model.id,
                mesh,
                materials.len()
            );
        }

        let material_id = material_ids.get(&material_index).copied().unwrap_or_else(|| {
            log::warn!(
                "Model {:?}: material {} ('{}') has no id mapping, using fallback",
                model.id,
                material_index,
                material.name
            );
            MaterialId::FALLBACK
        });

        let mut render_data = RenderData::new(model.id, u32::try_from(mesh).unwrap_or(u32::MAX), material_id)
            .with_index_range(material.index_start, material.index_count)
            .with_transparency(material.is_transparent);
        render_data.primitive_index = material.primitive_index;
        Some(render_data)
    }
}
