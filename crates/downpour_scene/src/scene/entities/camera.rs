//! Camera entity riding on another entity
//!
//! The camera owns one scene node, created under the parent entity's root,
//! so it follows the parent through ordinary transform propagation.

use crate::config::{Config, ConfigError};
use crate::foundation::math::{utils, Mat4, Mat4Ext, Quat, Quaternion, Transform, Vec3};
use crate::scene::{Entity, EntityKind, Scene, SceneEntity};
use nalgebra::{Isometry3, Translation3};
use serde::{Deserialize, Serialize};
use std::any::Any;

/// Role of the camera's own node
pub const ROLE_CAMERA_ROOT: &str = "camera_root";

/// Camera placement and lens settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Offset from the parent's root, in the parent's space
    pub local_offset: [f32; 3],
    /// Rotation relative to the parent's root as `[x, y, z, w]`
    pub local_rotation: [f32; 4],
    /// Vertical field of view (degrees)
    pub fov_degrees: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            local_offset: [0.0, 0.5, 0.5],
            local_rotation: [0.0, 0.0, 0.0, 1.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Config for CameraConfig {}

impl CameraConfig {
    /// Offset as a vector
    pub fn offset(&self) -> Vec3 {
        Vec3::from(self.local_offset)
    }

    /// Rotation as a unit quaternion (identity if degenerate)
    pub fn rotation(&self) -> Quat {
        let [x, y, z, w] = self.local_rotation;
        Quat::try_new(Quaternion::new(w, x, y, z), 1e-8).unwrap_or_else(Quat::identity)
    }

    /// Check the lens settings
    pub fn validate(&self, owner: &str) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, value: f32| ConfigError::InvalidValue {
            owner: owner.to_string(),
            field,
            value,
        };

        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(invalid("fov_degrees", self.fov_degrees));
        }
        if !(self.near > 0.0 && self.near.is_finite()) {
            return Err(invalid("near", self.near));
        }
        if !(self.far > self.near && self.far.is_finite()) {
            return Err(invalid("far", self.far));
        }
        Ok(())
    }
}

/// How the camera is meant to follow its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CameraMode {
    /// Driver's seat
    #[default]
    Cockpit,
    /// Behind the car
    Chase,
    /// Orbiting the car
    ThirdPerson,
}

impl CameraMode {
    /// Next mode in the cycle Cockpit, Chase, ThirdPerson
    pub const fn next(self) -> Self {
        match self {
            Self::Cockpit => Self::Chase,
            Self::Chase => Self::ThirdPerson,
            Self::ThirdPerson => Self::Cockpit,
        }
    }
}

/// Camera attached to a parent entity's root node
#[derive(Debug, Clone)]
pub struct CameraEntity {
    entity: Entity,
    config: CameraConfig,
    mode: CameraMode,
    aspect_ratio: f32,
    parent_name: Option<String>,
}

impl CameraEntity {
    /// Create an unattached camera with default lens settings
    pub fn new(name: &str, scene_name: &str) -> Self {
        Self {
            entity: Entity::new(name, scene_name),
            config: CameraConfig::default(),
            mode: CameraMode::default(),
            aspect_ratio: 16.0 / 9.0,
            parent_name: None,
        }
    }

    /// Current configuration
    pub const fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Validate and install a configuration
    ///
    /// Placement changes take effect on the next [`CameraEntity::attach_to_parent`].
    pub fn apply_config(&mut self, config: CameraConfig) -> Result<(), ConfigError> {
        config.validate(self.entity.name())?;
        self.config = config;
        Ok(())
    }

    /// Name of the entity this camera is attached to
    pub fn parent_name(&self) -> Option<&str> {
        self.parent_name.as_deref()
    }

    /// Put the camera node under `parent`'s root
    ///
    /// Creates `<name>_camera_node` with the configured offset and rotation,
    /// or moves the existing camera node if it is still live. Does nothing if
    /// the parent has no live root.
    pub fn attach_to_parent(&mut self, scene: &mut Scene, parent: &Entity) {
        let parent_root = parent.root_node();
        if !scene.is_valid(parent_root) {
            log::debug!(
                "CameraEntity '{}': parent '{}' has no live root",
                self.entity.name(),
                parent.name()
            );
            return;
        }

        let camera_node = self.entity.root_node();
        let camera_node = if scene.is_valid(camera_node) {
            scene.set_parent(camera_node, parent_root);
            camera_node
        } else {
            self.entity.reset();
            let node_name = format!("{}_camera_node", self.entity.name());
            let handle = scene.create_child_node(&node_name, parent_root);
            self.entity.add_node(handle, ROLE_CAMERA_ROOT);
            handle
        };

        if let Some(node) = scene.node_mut(camera_node) {
            node.set_local_position(self.config.offset());
            node.set_local_rotation(self.config.rotation());
        }

        self.parent_name = Some(parent.name().to_string());
        log::info!("CameraEntity '{}' attached to '{}'", self.entity.name(), parent.name());
    }

    // ---- Mode ----

    /// Switch follow mode
    pub fn set_mode(&mut self, mode: CameraMode) {
        if self.mode != mode {
            log::debug!("CameraEntity '{}': {:?} -> {:?}", self.entity.name(), self.mode, mode);
        }
        self.mode = mode;
    }

    /// Current follow mode
    pub const fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Advance to the next follow mode
    pub fn cycle_mode(&mut self) {
        self.set_mode(self.mode.next());
    }

    // ---- World placement ----

    /// Camera position from the cached world transform
    ///
    /// Falls back to the configured offset when unattached.
    pub fn world_position(&self, scene: &Scene) -> Vec3 {
        scene
            .node(self.entity.root_node())
            .map_or_else(|| self.config.offset(), |node| node.world_position())
    }

    /// Camera orientation from the cached world transform
    ///
    /// Falls back to the configured rotation when unattached.
    pub fn world_rotation(&self, scene: &Scene) -> Quat {
        scene.node(self.entity.root_node()).map_or_else(
            || self.config.rotation(),
            |node| Transform::from_matrix(*node.world_transform()).rotation,
        )
    }

    /// Viewing direction (-Z)
    pub fn world_forward(&self, scene: &Scene) -> Vec3 {
        self.world_rotation(scene) * Vec3::new(0.0, 0.0, -1.0)
    }

    /// Up direction (+Y)
    pub fn world_up(&self, scene: &Scene) -> Vec3 {
        self.world_rotation(scene) * Vec3::y()
    }

    /// Right direction (+X)
    pub fn world_right(&self, scene: &Scene) -> Vec3 {
        self.world_rotation(scene) * Vec3::x()
    }

    // ---- Matrices ----

    /// World-to-camera transform
    pub fn view_matrix(&self, scene: &Scene) -> Mat4 {
        let position = Translation3::from(self.world_position(scene));
        Isometry3::from_parts(position, self.world_rotation(scene))
            .inverse()
            .to_homogeneous()
    }

    /// Perspective projection with Vulkan depth range for a -Z forward view
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(
            utils::deg_to_rad(self.config.fov_degrees),
            self.aspect_ratio,
            self.config.near,
            self.config.far,
        ) * Mat4::vulkan_coordinate_transform()
    }

    /// Projection times view
    pub fn view_projection(&self, scene: &Scene) -> Mat4 {
        self.projection_matrix() * self.view_matrix(scene)
    }

    /// Set the viewport aspect ratio (ignored unless positive)
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        if aspect_ratio > 0.0 && aspect_ratio.is_finite() {
            self.aspect_ratio = aspect_ratio;
        }
    }

    /// Viewport aspect ratio
    pub const fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Set the vertical field of view (degrees, clamped to 1..179)
    pub fn set_fov(&mut self, degrees: f32) {
        self.config.fov_degrees = utils::clamp(degrees, 1.0, 179.0);
    }

    /// Set clip distances; ignored unless `0 < near < far`
    pub fn set_near_far(&mut self, near: f32, far: f32) {
        if near > 0.0 && far > near {
            self.config.near = near;
            self.config.far = far;
        }
    }
}

impl SceneEntity for CameraEntity {
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
        EntityKind::Camera
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    fn car_rig() -> (Scene, Entity) {
        let mut scene = Scene::new("driving");
        let body = scene.create_node("body");
        let mut car = Entity::new("car", "driving");
        car.add_node(body, "");
        (scene, car)
    }

    #[test]
    fn test_attach_creates_named_child_node() {
        let (mut scene, car) = car_rig();
        let mut camera = CameraEntity::new("cam", "driving");
        camera.attach_to_parent(&mut scene, &car);

        let node = camera.entity().node(ROLE_CAMERA_ROOT);
        assert_eq!(camera.entity().root_node(), node);
        assert_eq!(scene.find_node("cam_camera_node"), node);
        assert_eq!(scene.node(node).map(|n| n.parent()), Some(car.root_node()));
        assert_eq!(camera.parent_name(), Some("car"));
    }

    #[test]
    fn test_reattach_reuses_node() {
        let (mut scene, car) = car_rig();
        let mut camera = CameraEntity::new("cam", "driving");
        camera.attach_to_parent(&mut scene, &car);
        camera.attach_to_parent(&mut scene, &car);

        assert_eq!(scene.node_count(), 2);
    }

    #[test]
    fn test_attach_to_unbound_parent_is_noop() {
        let mut scene = Scene::new("driving");
        let mut camera = CameraEntity::new("cam", "driving");
        camera.attach_to_parent(&mut scene, &Entity::new("ghost", "driving"));

        assert_eq!(scene.node_count(), 0);
        assert!(camera.parent_name().is_none());
        assert_relative_eq!(camera.world_position(&scene), Vec3::new(0.0, 0.5, 0.5));
    }

    #[test]
    fn test_follows_parent_after_update() {
        let (mut scene, car) = car_rig();
        let mut camera = CameraEntity::new("cam", "driving");
        camera.attach_to_parent(&mut scene, &car);

        car.set_position(&mut scene, Vec3::new(10.0, 0.0, 0.0));
        car.set_rotation(&mut scene, Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2));
        scene.update_transforms();

        // Offset (0, 0.5, 0.5) turned a quarter about +Y becomes (0.5, 0.5, 0)
        assert_relative_eq!(camera.world_position(&scene), Vec3::new(10.5, 0.5, 0.0), epsilon = 1e-5);
        assert_relative_eq!(camera.world_forward(&scene), Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(camera.world_up(&scene), Vec3::y(), epsilon = 1e-5);
    }

    #[test]
    fn test_view_matrix_moves_camera_to_origin() {
        let (mut scene, car) = car_rig();
        let mut camera = CameraEntity::new("cam", "driving");
        camera.attach_to_parent(&mut scene, &car);
        scene.update_transforms();

        let eye = camera.world_position(&scene);
        let in_view = camera.view_matrix(&scene) * Vec4::new(eye.x, eye.y, eye.z, 1.0);
        assert_relative_eq!(in_view, Vec4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-5);

        // A point straight ahead lands inside the clip volume
        let ahead = eye + camera.world_forward(&scene) * 10.0;
        let clip = camera.view_projection(&scene) * Vec4::new(ahead.x, ahead.y, ahead.z, 1.0);
        assert!(clip.w > 0.0);
        assert!((0.0..=1.0).contains(&(clip.z / clip.w)));
    }

    #[test]
    fn test_mode_cycle() {
        let mut camera = CameraEntity::new("cam", "driving");
        assert_eq!(camera.mode(), CameraMode::Cockpit);
        camera.cycle_mode();
        assert_eq!(camera.mode(), CameraMode::Chase);
        camera.cycle_mode();
        assert_eq!(camera.mode(), CameraMode::ThirdPerson);
        camera.cycle_mode();
        assert_eq!(camera.mode(), CameraMode::Cockpit);
    }

    #[test]
    fn test_lens_validation_and_setters() {
        let mut camera = CameraEntity::new("cam", "driving");
        let bad = CameraConfig { near: 5.0, far: 1.0, ..CameraConfig::default() };
        assert!(matches!(
            camera.apply_config(bad),
            Err(ConfigError::InvalidValue { field: "far", .. })
        ));

        camera.set_near_far(2.0, 1.0);
        assert_relative_eq!(camera.config().near, 0.1);
        camera.set_fov(500.0);
        assert_relative_eq!(camera.config().fov_degrees, 179.0);
        camera.set_aspect_ratio(-1.0);
        assert_relative_eq!(camera.aspect_ratio(), 16.0 / 9.0);
    }
}
