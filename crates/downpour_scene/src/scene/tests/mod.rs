//! Cross-component behaviour of the scene layer

use super::*;
use crate::foundation::math::{Mat4, Quat, Unit, Vec3};
use approx::assert_relative_eq;
use std::collections::HashMap;

fn with_render_data(scene: &mut Scene, name: &str, model: ModelId, is_transparent: bool) -> NodeHandle {
    let handle = scene.create_node(name);
    if let Some(node) = scene.node_mut(handle) {
        node.set_render_data(RenderData::new(model, 0, MaterialId(1)).with_transparency(is_transparent));
    }
    handle
}

#[test]
fn test_destroyed_handle_stays_stale_after_slot_reuse() {
    let mut scene = Scene::new("test");
    let a = scene.create_node("a");
    scene.destroy_node(a);

    assert!(scene.node(a).is_none());

    let b = scene.create_node("b");
    assert_eq!(b.index(), a.index());
    assert_ne!(b, a);
    assert!(scene.node(a).is_none());
    assert_eq!(scene.node(b).map(SceneNode::name), Some("b"));
}

#[test]
fn test_free_list_reuse_bumps_generation_by_one() {
    let mut scene = Scene::new("test");
    let handles: Vec<NodeHandle> = (0..5).map(|i| scene.create_node(&format!("n{i}"))).collect();
    let slot_three = handles[3];
    assert_eq!(slot_three.index(), 3);

    scene.destroy_node(slot_three);
    let reused = scene.create_node("again");

    assert_eq!(reused.index(), 3);
    assert_eq!(reused.generation(), slot_three.generation() + 1);
}

#[test]
fn test_trs_matrix_round_trips() {
    let cases = [
        Mat4::identity(),
        Mat4::new_translation(&Vec3::new(3.0, -1.0, 0.25)),
        Mat4::new_translation(&Vec3::new(0.0, 1.0, -8.0))
            * Quat::from_axis_angle(&Unit::new_normalize(Vec3::new(1.0, 2.0, 3.0)), 2.0).to_homogeneous()
            * Mat4::new_nonuniform_scaling(&Vec3::new(1.5, 0.25, 4.0)),
        Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::PI).to_homogeneous(),
    ];

    let mut scene = Scene::new("test");
    let handle = scene.create_node("n");
    for matrix in cases {
        let node = scene.node_mut(handle).unwrap();
        node.set_local_transform(matrix);
        assert_relative_eq!(node.local_transform(), matrix, epsilon = 1e-5);
    }
}

#[test]
fn test_child_world_position_composes_with_root() {
    let mut scene = Scene::new("test");
    let root = scene.create_node("R");
    let child = scene.create_child_node("C", root);
    scene.node_mut(root).unwrap().set_local_position(Vec3::new(2.0, 0.0, 0.0));
    scene.node_mut(child).unwrap().set_local_position(Vec3::new(1.0, 0.0, 0.0));

    scene.update_transforms();

    assert_relative_eq!(scene.node(child).unwrap().world_position(), Vec3::new(3.0, 0.0, 0.0));
}

#[test]
fn test_root_rotation_reaches_untouched_child() {
    let mut scene = Scene::new("test");
    let root = scene.create_node("R");
    let child = scene.create_child_node("C", root);
    scene.node_mut(child).unwrap().set_local_position(Vec3::new(1.0, 0.0, 0.0));
    scene.update_transforms();
    assert_relative_eq!(scene.node(child).unwrap().world_position(), Vec3::new(1.0, 0.0, 0.0));

    scene
        .node_mut(root)
        .unwrap()
        .set_local_rotation(Quat::from_axis_angle(&Vec3::z_axis(), std::f32::consts::FRAC_PI_2));
    scene.update_transforms();

    assert_relative_eq!(
        scene.node(child).unwrap().world_position(),
        Vec3::new(0.0, 1.0, 0.0),
        epsilon = 1e-6
    );
}

#[test]
fn test_opaque_batch_precedes_transparent_batch() {
    let mut scene = Scene::new("test");
    let model = ModelId(1);
    let glass = with_render_data(&mut scene, "glass", model, true);
    let body = with_render_data(&mut scene, "body", model, false);
    let seats = with_render_data(&mut scene, "seats", model, false);

    let batches = scene.render_batches();

    assert_eq!(batches.len(), 2);
    assert!(!batches[0].is_transparent);
    assert_eq!(batches[0].nodes, vec![body, seats]);
    assert!(batches[1].is_transparent);
    assert_eq!(batches[1].nodes, vec![glass]);
}

#[test]
fn test_batches_split_by_model() {
    let mut scene = Scene::new("test");
    with_render_data(&mut scene, "car", ModelId(1), false);
    with_render_data(&mut scene, "road", ModelId(2), false);
    with_render_data(&mut scene, "car_glass", ModelId(1), true);
    with_render_data(&mut scene, "road_puddle", ModelId(2), true);

    let keys: Vec<(ModelId, bool)> = scene
        .render_batches()
        .iter()
        .map(|b| (b.model, b.is_transparent))
        .collect();
    assert_eq!(
        keys,
        vec![
            (ModelId(1), false),
            (ModelId(2), false),
            (ModelId(1), true),
            (ModelId(2), true),
        ]
    );
}

#[test]
fn test_builder_reproduces_three_level_hierarchy() {
    let model = AssetModel {
        id: ModelId(1),
        nodes: vec![
            AssetNode::new("root").with_children(vec![1]),
            AssetNode::new("child").with_children(vec![2]),
            AssetNode::new("grandchild").with_mesh(0),
        ],
        scenes: vec![AssetScene { name: "default".into(), root_nodes: vec![0] }],
        default_scene: 0,
        materials: vec![AssetMaterial { name: "paint".into(), mesh_index: 0, ..AssetMaterial::default() }],
    };
    let material_ids = HashMap::from([(0, MaterialId(7))]);

    let mut scene = Scene::new("test");
    let roots = SceneBuilder::build_from_model(&mut scene, &model, &material_ids);

    assert_eq!(scene.node_count(), 3);
    assert_eq!(roots.len(), 1);

    let root = roots[0];
    let child = scene.find_node("child");
    let grandchild = scene.find_node("grandchild");
    assert_eq!(scene.node(root).unwrap().children(), &[child]);
    assert_eq!(scene.node(child).unwrap().parent(), root);
    assert_eq!(scene.node(child).unwrap().children(), &[grandchild]);
    assert_eq!(scene.node(grandchild).unwrap().parent(), child);

    let render_data = scene.node(grandchild).and_then(SceneNode::render_data).unwrap();
    assert_eq!(render_data.material_id, MaterialId(7));
    assert!(scene.node(root).unwrap().render_data().is_none());
}

#[test]
fn test_scene_and_entity_creation_is_idempotent() {
    let mut manager = SceneManager::new();
    let first = manager.create_scene("x").id();
    let node = manager.create_scene("x").create_node("marker");
    assert_eq!(manager.create_scene("x").id(), first);
    assert_eq!(manager.scene_count(), 1);
    assert!(manager.scene("x").unwrap().is_valid(node));

    manager.create_entity::<CarEntity>("y", "x").unwrap().entity_mut().add_node(node, "hood");
    let again = manager.create_entity::<CarEntity>("y", "x").unwrap();
    assert_eq!(again.hood_node(), node);
    assert_eq!(manager.entity_count(), 1);
}

#[test]
fn test_entity_survives_destruction_of_its_nodes() {
    let mut manager = SceneManager::new();
    let scene = manager.create_scene("driving");
    let body = scene.create_node("body");
    let wheel = scene.create_child_node("wheel", body);

    let car = manager.create_entity::<CarEntity>("car", "driving").unwrap();
    car.entity_mut().add_node(body, "");
    car.entity_mut().add_node(wheel, entities::car::ROLE_WHEEL_FL);

    manager.scene_mut("driving").unwrap().destroy_node(body);

    let spun = manager.with_entity::<CarEntity, _, _>("car", |car, scene| {
        car.set_wheel_rotation(scene, 1.0);
        car.entity().position(scene)
    });
    assert_eq!(spun, Some(Vec3::zeros()));
}

#[test]
fn test_deep_chain_survives_worklist_operations() {
    const DEPTH: usize = 100_000;

    let mut scene = Scene::new("deep");
    let root = scene.create_node("link_0");
    let mut leaf = root;
    for i in 1..DEPTH {
        leaf = scene.create_child_node(&format!("link_{i}"), leaf);
    }
    for handle in scene.active_nodes().to_vec() {
        scene.node_mut(handle).unwrap().set_local_position(Vec3::new(0.0, 0.0, 1.0));
    }
    assert_eq!(scene.node_count(), DEPTH);
    assert_eq!(scene.root_nodes(), &[root]);

    scene.update_transforms();
    assert_relative_eq!(scene.node(leaf).unwrap().world_position(), Vec3::new(0.0, 0.0, 100_000.0));

    scene.mark_subtree_dirty(root);
    assert!(scene.node(leaf).unwrap().is_dirty());

    scene.node_mut(root).unwrap().set_local_position(Vec3::new(1.0, 0.0, 1.0));
    scene.update_transforms();
    assert!(!scene.node(leaf).unwrap().is_dirty());
    assert_relative_eq!(scene.node(leaf).unwrap().world_position(), Vec3::new(1.0, 0.0, 100_000.0));

    scene.destroy_node(root);
    assert_eq!(scene.node_count(), 0);
    assert!(!scene.is_valid(leaf));
    assert!(scene.root_nodes().is_empty());
}

#[test]
fn test_builder_handles_deep_asset_chain() {
    const DEPTH: usize = 50_000;

    let nodes = (0..DEPTH)
        .map(|i| {
            let node = AssetNode::new(format!("joint_{i}")).with_translation([1.0, 0.0, 0.0]);
            if i + 1 < DEPTH {
                node.with_children(vec![i + 1])
            } else {
                node
            }
        })
        .collect();
    let model = AssetModel {
        id: ModelId(4),
        nodes,
        scenes: vec![AssetScene { name: "chain".into(), root_nodes: vec![0] }],
        default_scene: 0,
        materials: Vec::new(),
    };

    let mut scene = Scene::new("test");
    let roots = SceneBuilder::build_from_model(&mut scene, &model, &HashMap::new());
    scene.update_transforms();

    assert_eq!(roots.len(), 1);
    assert_eq!(scene.node_count(), DEPTH);
    let tip = scene.find_node(&format!("joint_{}", DEPTH - 1));
    assert_relative_eq!(scene.node(tip).unwrap().world_position(), Vec3::new(50_000.0, 0.0, 0.0));
}
