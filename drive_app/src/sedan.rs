//! Procedural sedan hierarchy used when no asset description is given

use downpour_scene::prelude::{AssetMaterial, AssetModel, AssetNode, AssetScene, ModelId};
use downpour_scene::scene::entities::car;
use std::collections::HashMap;

/// Model id the renderer would know the sedan geometry by
pub const SEDAN_MODEL: ModelId = ModelId(1);

/// Node hierarchy of a sedan with every animated part a car knows about
pub fn sedan_model() -> AssetModel {
    // Steering wheel column tilted 45 degrees about X
    let tilt = [0.382_683_4, 0.0, 0.0, 0.923_879_5];

    let nodes = vec![
        AssetNode::new("Sedan").with_children(vec![1]),
        AssetNode::new("Body")
            .with_mesh(0)
            .with_children(vec![2, 3, 4, 5, 6, 8, 9, 10, 11, 12, 13, 14, 15]),
        AssetNode::new("Wheel_FrontLeft").with_translation([-0.8, 0.35, -1.425]).with_mesh(1),
        AssetNode::new("Wheel_FrontRight").with_translation([0.8, 0.35, -1.425]).with_mesh(1),
        AssetNode::new("Wheel_RearLeft").with_translation([-0.8, 0.35, 1.425]).with_mesh(1),
        AssetNode::new("Wheel_RearRight").with_translation([0.8, 0.35, 1.425]).with_mesh(1),
        AssetNode::new("SteeringWheel_Rim")
            .with_translation([-0.35, 1.0, -0.3])
            .with_rotation(tilt)
            .with_mesh(2)
            .with_children(vec![7]),
        AssetNode::new("SteeringWheel_Hub").with_mesh(2),
        AssetNode::new("Wiper_Left").with_translation([-0.4, 1.05, -0.9]).with_mesh(3),
        AssetNode::new("Wiper_Right").with_translation([0.4, 1.05, -0.9]).with_mesh(3),
        AssetNode::new("Hood").with_translation([0.0, 0.95, -1.6]).with_mesh(4),
        AssetNode::new("Door_Left").with_translation([-0.9, 0.6, -0.2]).with_mesh(5),
        AssetNode::new("Door_Right").with_translation([0.9, 0.6, -0.2]).with_mesh(5),
        AssetNode::new("Headlights").with_translation([0.0, 0.7, -2.3]).with_mesh(6),
        AssetNode::new("Taillights").with_translation([0.0, 0.8, 2.3]).with_mesh(7),
        AssetNode::new("Windshield").with_translation([0.0, 1.2, -0.7]).with_mesh(8),
    ];

    let material = |name: &str, mesh_index: usize, index_count: u32, is_transparent: bool| AssetMaterial {
        name: name.to_string(),
        mesh_index,
        index_count,
        is_transparent,
        ..AssetMaterial::default()
    };

    AssetModel {
        id: SEDAN_MODEL,
        nodes,
        scenes: vec![AssetScene {
            name: "sedan".to_string(),
            root_nodes: vec![0],
        }],
        default_scene: 0,
        materials: vec![
            material("body_paint", 0, 36_000, false),
            material("tire_rubber", 1, 4_800, false),
            material("steering_leather", 2, 1_200, false),
            material("wiper_blade", 3, 240, false),
            material("hood_paint", 4, 3_000, false),
            material("door_paint", 5, 2_400, false),
            material("headlight_glass", 6, 600, true),
            material("taillight_glass", 7, 600, true),
            material("windshield_glass", 8, 96, true),
            // Second primitive of the body mesh, not bound
            material("chrome_trim", 0, 1_800, false),
        ],
    }
}

/// Role -> node name mapping for [`sedan_model`]
pub fn sedan_roles() -> HashMap<String, String> {
    [
        (car::ROLE_WHEEL_FL, "Wheel_FrontLeft"),
        (car::ROLE_WHEEL_FR, "Wheel_FrontRight"),
        (car::ROLE_WHEEL_RL, "Wheel_RearLeft"),
        (car::ROLE_WHEEL_RR, "Wheel_RearRight"),
        (car::ROLE_STEERING_WHEEL_FRONT, "SteeringWheel_Rim"),
        (car::ROLE_STEERING_WHEEL_BACK, "SteeringWheel_Hub"),
        (car::ROLE_WIPER_LEFT, "Wiper_Left"),
        (car::ROLE_WIPER_RIGHT, "Wiper_Right"),
        (car::ROLE_HOOD, "Hood"),
        (car::ROLE_DOOR_LEFT, "Door_Left"),
        (car::ROLE_DOOR_RIGHT, "Door_Right"),
        (car::ROLE_HEADLIGHTS, "Headlights"),
        (car::ROLE_TAILLIGHTS, "Taillights"),
    ]
    .into_iter()
    .map(|(role, node)| (role.to_string(), node.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_names_an_existing_node() {
        let model = sedan_model();
        for node_name in sedan_roles().values() {
            assert!(model.nodes.iter().any(|n| &n.name == node_name), "missing {node_name}");
        }
        assert_eq!(sedan_roles().len(), car::ALL_ROLES.len());
    }

    #[test]
    fn test_children_indices_are_in_range() {
        let model = sedan_model();
        assert!(model
            .nodes
            .iter()
            .flat_map(|n| n.children.iter())
            .all(|&child| child < model.nodes.len()));
    }
}
