//! Driving demo
//!
//! Builds the driving scene the way the simulation does at startup (car
//! hierarchy under a wrapper root, tagged parts, cockpit camera, road) and
//! runs a fixed number of ticks without a renderer, logging what a renderer
//! would receive.
//!
//! Usage: `drive_demo [config.toml|config.ron]`

mod config;
mod sedan;

use config::DriveConfig;
use downpour_scene::foundation::logging;
use downpour_scene::prelude::*;
use std::collections::HashMap;

const DRIVING_SCENE: &str = "driving";
const PLAYER_CAR: &str = "player_car";
const COCKPIT_CAMERA: &str = "cockpit_camera";
const ROAD: &str = "road";

/// Road geometry id next to the car model
const ROAD_MODEL: ModelId = ModelId(2);

/// Errors that abort the demo
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Bad settings
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unreadable hierarchy description
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    /// Scene setup did not produce what the demo needs
    #[error("Scene setup failed: {0}")]
    Setup(String),
}

fn main() {
    if let Err(e) = run() {
        log::error!("drive_demo failed: {e}");
        eprintln!("drive_demo failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = match std::env::args().nth(1) {
        Some(path) => DriveConfig::load_from_file(&path)?,
        None => DriveConfig::default(),
    };
    if logging::init_with_level(&config.log_level).is_err() {
        logging::init();
    }
    config.validate()?;

    let mut manager = SceneManager::new();
    load_car(&mut manager, &config)?;
    load_road(&mut manager, &config)?;
    attach_camera(&mut manager, &config)?;
    manager.set_active_scene(DRIVING_SCENE);

    drive(&mut manager, &config);
    report(&manager)
}

/// Material manager stand-in: every material gets a non-fallback id
fn register_materials(model: &AssetModel) -> HashMap<usize, MaterialId> {
    (0..model.materials.len())
        .map(|index| (index, MaterialId(u32::try_from(index + 1).unwrap_or(u32::MAX))))
        .collect()
}

fn load_car(manager: &mut SceneManager, config: &DriveConfig) -> Result<(), AppError> {
    let (model, mut roles) = match &config.asset_path {
        Some(path) => (AssetModel::load_from_file(path)?, HashMap::new()),
        None => (sedan::sedan_model(), sedan::sedan_roles()),
    };
    roles.extend(config.role_nodes.clone());
    if !model.has_hierarchy() {
        return Err(AppError::Setup(format!("model {:?} has no node hierarchy", model.id)));
    }

    let material_ids = register_materials(&model);
    let scene = manager.create_scene(DRIVING_SCENE);
    let gltf_roots = SceneBuilder::build_from_model(scene, &model, &material_ids);

    manager
        .create_entity::<CarEntity>(PLAYER_CAR, DRIVING_SCENE)
        .ok_or_else(|| AppError::Setup(format!("could not create '{PLAYER_CAR}'")))?
        .apply_config(config.car.clone())?;

    manager
        .with_entity::<CarEntity, _, _>(PLAYER_CAR, |car, scene| {
            // One root for the whole car so moving the entity moves every part
            let wrapper = scene.create_node("car_wrapper_root");
            car.entity_mut().add_node(wrapper, "");
            for (i, &root) in gltf_roots.iter().enumerate() {
                scene.set_parent(root, wrapper);
                car.entity_mut().add_node(root, &format!("gltf_root_{i}"));
            }

            car.tag_roles(scene, &roles);
            scene.update_transforms();
            car.capture_base_rotations(scene);
        })
        .ok_or_else(|| AppError::Setup(format!("'{PLAYER_CAR}' lost its scene")))
}

fn load_road(manager: &mut SceneManager, config: &DriveConfig) -> Result<(), AppError> {
    let road = manager
        .create_entity::<RoadEntity>(ROAD, DRIVING_SCENE)
        .ok_or_else(|| AppError::Setup(format!("could not create '{ROAD}'")))?;
    road.apply_config(config.road.clone())?;

    manager
        .with_entity::<RoadEntity, _, _>(ROAD, |road, scene| {
            let half_width = road.config().width * 0.5;
            let half_length = road.config().length * 0.5;

            let surface = scene.create_node("road_surface");
            if let Some(node) = scene.node_mut(surface) {
                node.set_static(true);
                node.set_local_position(Vec3::new(0.0, 0.0, -half_length));
                node.set_render_data(RenderData::new(ROAD_MODEL, 0, MaterialId(100)));
                node.set_bounds(Some(Aabb::new(
                    Vec3::new(-half_width, -0.1, -half_length),
                    Vec3::new(half_width, 0.0, half_length),
                )));
            }
            road.entity_mut().add_node(surface, "surface");
        })
        .ok_or_else(|| AppError::Setup(format!("'{ROAD}' lost its scene")))
}

fn attach_camera(manager: &mut SceneManager, config: &DriveConfig) -> Result<(), AppError> {
    let car_rig = manager
        .entity(PLAYER_CAR)
        .map(|car| car.entity().clone())
        .ok_or_else(|| AppError::Setup(format!("'{PLAYER_CAR}' missing")))?;

    manager
        .create_entity::<CameraEntity>(COCKPIT_CAMERA, DRIVING_SCENE)
        .ok_or_else(|| AppError::Setup(format!("could not create '{COCKPIT_CAMERA}'")))?
        .apply_config(config.camera.clone())?;

    manager
        .with_entity::<CameraEntity, _, _>(COCKPIT_CAMERA, |camera, scene| {
            camera.attach_to_parent(scene, &car_rig);
            camera.parent_name().is_some()
        })
        .filter(|&attached| attached)
        .map(|_| ())
        .ok_or_else(|| AppError::Setup("camera could not attach to the car".to_string()))
}

/// Fixed-step drive: move forward, spin wheels, sweep wipers, weave the steering wheel
#[allow(clippy::cast_precision_loss)]
fn drive(manager: &mut SceneManager, config: &DriveConfig) {
    let dt = config.delta_time;
    let mut distance = 0.0_f32;

    for tick in 0..config.ticks {
        let time = tick as f32 * dt;
        distance += config.speed * dt;

        manager.with_entity::<CarEntity, _, _>(PLAYER_CAR, |car, scene| {
            car.entity().translate(scene, Vec3::new(0.0, 0.0, -config.speed * dt));
            car.set_wheel_rotation(scene, distance / car.wheel_radius());
            car.set_steering_angle(scene, 90.0 * (time * 0.5).sin());
            car.set_wiper_angle(scene, 45.0 * (time * 3.0).sin().abs());
            if tick == config.ticks / 2 {
                car.open_door(scene, Side::Left, true);
                car.open_hood(scene, true);
            }
        });

        manager.update(dt);

        if tick % 30 == 0 {
            let car_position = manager
                .scene(DRIVING_SCENE)
                .zip(manager.entity(PLAYER_CAR))
                .map(|(scene, car)| car.entity().position(scene));
            log::debug!("tick {tick}: car at {car_position:?}");
        }
    }

    log::info!("Drove {distance:.1} m in {} ticks", config.ticks);
}

fn report(manager: &SceneManager) -> Result<(), AppError> {
    let scene = manager
        .active_scene()
        .ok_or_else(|| AppError::Setup("no active scene".to_string()))?;
    let camera = manager
        .entity_as::<CameraEntity>(COCKPIT_CAMERA)
        .ok_or_else(|| AppError::Setup(format!("'{COCKPIT_CAMERA}' missing")))?;

    let batches = scene.render_batches();
    let transparent = batches.iter().filter(|b| b.is_transparent).count();
    let visible = scene.collect_visible_nodes(&camera.view_projection(scene));

    log::info!(
        "Scene '{}': {} nodes, {} roots, {} batches ({} opaque, {} transparent), {} visible",
        scene.name(),
        scene.node_count(),
        scene.root_nodes().len(),
        batches.len(),
        batches.len() - transparent,
        transparent,
        visible.len()
    );
    for batch in &batches {
        log::info!(
            "  model {:?} {}: {} node(s)",
            batch.model,
            if batch.is_transparent { "transparent" } else { "opaque" },
            batch.node_count()
        );
    }
    log::info!(
        "Camera at {:?} looking {:?}",
        camera.world_position(scene),
        camera.world_forward(scene)
    );
    Ok(())
}
