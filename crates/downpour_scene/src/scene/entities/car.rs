//! Drivable car entity
//!
//! Binds the car's animated parts (wheels, steering wheel, wipers, doors,
//! hood, lights) to roles and drives them from high-level controls. Part
//! animations are applied on top of the rotation each part had when
//! [`CarEntity::capture_base_rotations`] ran, so imported mesh orientation is
//! preserved.

use crate::config::{require_positive, Config, ConfigError};
use crate::foundation::math::{utils, Quat, Vec3};
use crate::scene::{Entity, EntityKind, NodeHandle, Scene, SceneEntity};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;

/// Front-left wheel role
pub const ROLE_WHEEL_FL: &str = "wheel_FL";
/// Front-right wheel role
pub const ROLE_WHEEL_FR: &str = "wheel_FR";
/// Rear-left wheel role
pub const ROLE_WHEEL_RL: &str = "wheel_RL";
/// Rear-right wheel role
pub const ROLE_WHEEL_RR: &str = "wheel_RR";
/// Steering wheel rim role
pub const ROLE_STEERING_WHEEL_FRONT: &str = "steering_wheel_front";
/// Steering wheel hub role
pub const ROLE_STEERING_WHEEL_BACK: &str = "steering_wheel_back";
/// Left wiper role
pub const ROLE_WIPER_LEFT: &str = "left_wiper";
/// Right wiper role
pub const ROLE_WIPER_RIGHT: &str = "right_wiper";
/// Hood role
pub const ROLE_HOOD: &str = "hood";
/// Left door role
pub const ROLE_DOOR_LEFT: &str = "left_door";
/// Right door role
pub const ROLE_DOOR_RIGHT: &str = "right_door";
/// Headlights role
pub const ROLE_HEADLIGHTS: &str = "headlights";
/// Taillights role
pub const ROLE_TAILLIGHTS: &str = "taillights";

/// Every role a car knows about
pub const ALL_ROLES: [&str; 13] = [
    ROLE_WHEEL_FL,
    ROLE_WHEEL_FR,
    ROLE_WHEEL_RL,
    ROLE_WHEEL_RR,
    ROLE_STEERING_WHEEL_FRONT,
    ROLE_STEERING_WHEEL_BACK,
    ROLE_WIPER_LEFT,
    ROLE_WIPER_RIGHT,
    ROLE_HOOD,
    ROLE_DOOR_LEFT,
    ROLE_DOOR_RIGHT,
    ROLE_HEADLIGHTS,
    ROLE_TAILLIGHTS,
];

const WHEEL_ROLES: [&str; 4] = [ROLE_WHEEL_FL, ROLE_WHEEL_FR, ROLE_WHEEL_RL, ROLE_WHEEL_RR];

const ANIMATED_ROLES: [&str; 11] = [
    ROLE_STEERING_WHEEL_FRONT,
    ROLE_STEERING_WHEEL_BACK,
    ROLE_WHEEL_FL,
    ROLE_WHEEL_FR,
    ROLE_WHEEL_RL,
    ROLE_WHEEL_RR,
    ROLE_WIPER_LEFT,
    ROLE_WIPER_RIGHT,
    ROLE_DOOR_LEFT,
    ROLE_DOOR_RIGHT,
    ROLE_HOOD,
];

/// Left or right side of the car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Driver side
    Left,
    /// Passenger side
    Right,
}

/// Car dimensions and handling limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    /// Distance between front and rear axles (m)
    pub wheel_base: f32,
    /// Distance between left and right wheels (m)
    pub track_width: f32,
    /// Wheel radius (m)
    pub wheel_radius: f32,
    /// Overall length (m)
    pub length: f32,

    /// Maximum road wheel steering angle (degrees)
    pub max_steer_angle: f32,
    /// Maximum acceleration (m/s^2)
    pub max_acceleration: f32,
    /// Maximum braking deceleration (m/s^2)
    pub max_braking: f32,
    /// Mass (kg)
    pub mass: f32,
    /// Aerodynamic drag coefficient
    pub drag_coefficient: f32,
    /// Rolling resistance coefficient
    pub rolling_resistance: f32,

    /// Door swing when open (degrees)
    pub door_open_angle: f32,
    /// Hood swing when open (degrees)
    pub hood_open_angle: f32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            wheel_base: 2.85,
            track_width: 1.60,
            wheel_radius: 0.35,
            length: 4.70,
            max_steer_angle: 35.0,
            max_acceleration: 5.0,
            max_braking: 8.0,
            mass: 1500.0,
            drag_coefficient: 0.30,
            rolling_resistance: 0.015,
            door_open_angle: 45.0,
            hood_open_angle: 30.0,
        }
    }
}

impl Config for CarConfig {}

impl CarConfig {
    /// Check that every required quantity is set
    ///
    /// Every physical quantity must be positive. Zero door or hood angles are
    /// accepted with a warning; those parts will not move.
    pub fn validate(&self, owner: &str) -> Result<(), ConfigError> {
        require_positive(owner, "wheel_base", self.wheel_base)?;
        require_positive(owner, "track_width", self.track_width)?;
        require_positive(owner, "wheel_radius", self.wheel_radius)?;
        require_positive(owner, "length", self.length)?;
        require_positive(owner, "max_steer_angle", self.max_steer_angle)?;
        require_positive(owner, "max_acceleration", self.max_acceleration)?;
        require_positive(owner, "max_braking", self.max_braking)?;
        require_positive(owner, "mass", self.mass)?;
        require_positive(owner, "drag_coefficient", self.drag_coefficient)?;
        require_positive(owner, "rolling_resistance", self.rolling_resistance)?;

        for (field, value) in [
            ("door_open_angle", self.door_open_angle),
            ("hood_open_angle", self.hood_open_angle),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    owner: owner.to_string(),
                    field,
                    value,
                });
            }
            if value == 0.0 {
                log::warn!("{owner}: {field} is zero, part will not animate");
            }
        }

        Ok(())
    }
}

/// Car made of role-bound parts
#[derive(Debug, Clone)]
pub struct CarEntity {
    entity: Entity,
    config: CarConfig,
    base_rotations: HashMap<&'static str, Quat>,

    steering_angle: f32,
    wheel_rotation: f32,
    wiper_angle: f32,
}

impl CarEntity {
    /// Create a car with default configuration and no parts
    pub fn new(name: &str, scene_name: &str) -> Self {
        Self {
            entity: Entity::new(name, scene_name),
            config: CarConfig::default(),
            base_rotations: HashMap::new(),
            steering_angle: 0.0,
            wheel_rotation: 0.0,
            wiper_angle: 0.0,
        }
    }

    // ---- Configuration ----

    /// Current configuration
    pub const fn config(&self) -> &CarConfig {
        &self.config
    }

    /// Validate and install a configuration; the old one is kept on error
    pub fn apply_config(&mut self, config: CarConfig) -> Result<(), ConfigError> {
        config.validate(self.entity.name())?;
        log::info!(
            "CarEntity '{}' config applied: wheel_base={}m, mass={}kg, max_accel={}m/s^2",
            self.entity.name(),
            config.wheel_base,
            config.mass,
            config.max_acceleration
        );
        self.config = config;
        Ok(())
    }

    /// Axle distance (m)
    pub const fn wheel_base(&self) -> f32 {
        self.config.wheel_base
    }

    /// Wheel spacing (m)
    pub const fn track_width(&self) -> f32 {
        self.config.track_width
    }

    /// Wheel radius (m)
    pub const fn wheel_radius(&self) -> f32 {
        self.config.wheel_radius
    }

    /// Maximum steering angle (degrees)
    pub const fn max_steer_angle(&self) -> f32 {
        self.config.max_steer_angle
    }

    /// Maximum acceleration (m/s^2)
    pub const fn max_acceleration(&self) -> f32 {
        self.config.max_acceleration
    }

    /// Maximum braking (m/s^2)
    pub const fn max_braking(&self) -> f32 {
        self.config.max_braking
    }

    /// Mass (kg)
    pub const fn mass(&self) -> f32 {
        self.config.mass
    }

    /// Drag coefficient
    pub const fn drag_coefficient(&self) -> f32 {
        self.config.drag_coefficient
    }

    /// Rolling resistance coefficient
    pub const fn rolling_resistance(&self) -> f32 {
        self.config.rolling_resistance
    }

    /// Door swing (degrees)
    pub const fn door_open_angle(&self) -> f32 {
        self.config.door_open_angle
    }

    /// Hood swing (degrees)
    pub const fn hood_open_angle(&self) -> f32 {
        self.config.hood_open_angle
    }

    // ---- Binding ----

    /// Bind every known role whose mapped node name exists in `scene`
    ///
    /// Returns how many roles were bound.
    pub fn tag_roles(&mut self, scene: &Scene, role_to_node_name: &HashMap<String, String>) -> usize {
        let mut tagged = 0;
        for role in ALL_ROLES {
            let Some(node_name) = role_to_node_name.get(role) else {
                continue;
            };
            let handle = scene.find_node(node_name);
            if handle.is_valid() {
                self.entity.add_node(handle, role);
                tagged += 1;
            } else {
                log::warn!(
                    "CarEntity '{}': node '{}' for role '{}' not found",
                    self.entity.name(),
                    node_name,
                    role
                );
            }
        }
        log::info!("CarEntity '{}': tagged {} role(s)", self.entity.name(), tagged);
        tagged
    }

    /// Remember each animated part's current local rotation
    pub fn capture_base_rotations(&mut self, scene: &Scene) {
        for role in ANIMATED_ROLES {
            if let Some(node) = scene.node(self.entity.node(role)) {
                self.base_rotations.insert(role, node.local_rotation());
            }
        }
    }

    /// Captured rest rotation of a part (identity if never captured)
    pub fn base_rotation(&self, role: &str) -> Quat {
        self.base_rotations.get(role).copied().unwrap_or_else(Quat::identity)
    }

    fn animate_from_base(&self, scene: &mut Scene, role: &str, animation: Quat) {
        let rotation = self.base_rotation(role) * animation;
        self.entity.animate_rotation(scene, role, rotation);
    }

    // ---- Controls ----

    /// Turn the steering wheel (degrees, unclamped) about its local X axis
    pub fn set_steering_angle(&mut self, scene: &mut Scene, degrees: f32) {
        self.steering_angle = degrees;
        let animation = Quat::from_axis_angle(&Vec3::x_axis(), utils::deg_to_rad(degrees));
        for role in [ROLE_STEERING_WHEEL_FRONT, ROLE_STEERING_WHEEL_BACK] {
            self.animate_from_base(scene, role, animation);
        }
    }

    /// Spin all four wheels to an absolute angle (radians) about local X
    pub fn set_wheel_rotation(&mut self, scene: &mut Scene, radians: f32) {
        self.wheel_rotation = radians;
        let animation = Quat::from_axis_angle(&Vec3::x_axis(), radians);
        for role in WHEEL_ROLES {
            self.animate_from_base(scene, role, animation);
        }
    }

    /// Sweep both wipers (degrees) about local Y
    pub fn set_wiper_angle(&mut self, scene: &mut Scene, degrees: f32) {
        self.wiper_angle = degrees;
        let animation = Quat::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(degrees));
        for role in [ROLE_WIPER_LEFT, ROLE_WIPER_RIGHT] {
            self.animate_from_base(scene, role, animation);
        }
    }

    /// Swing a door open or shut about its local Y hinge
    ///
    /// The left door opens with a positive angle, the right with a negative one.
    pub fn open_door(&self, scene: &mut Scene, side: Side, open: bool) {
        let angle = if open { self.config.door_open_angle } else { 0.0 };
        let (role, angle) = match side {
            Side::Left => (ROLE_DOOR_LEFT, angle),
            Side::Right => (ROLE_DOOR_RIGHT, -angle),
        };
        let animation = Quat::from_axis_angle(&Vec3::y_axis(), utils::deg_to_rad(angle));
        self.animate_from_base(scene, role, animation);
    }

    /// Swing the hood open or shut about its local X hinge
    pub fn open_hood(&self, scene: &mut Scene, open: bool) {
        let angle = if open { self.config.hood_open_angle } else { 0.0 };
        let animation = Quat::from_axis_angle(&Vec3::x_axis(), utils::deg_to_rad(angle));
        self.animate_from_base(scene, ROLE_HOOD, animation);
    }

    /// Last steering wheel angle (degrees)
    pub const fn steering_angle(&self) -> f32 {
        self.steering_angle
    }

    /// Last wheel spin (radians)
    pub const fn wheel_rotation(&self) -> f32 {
        self.wheel_rotation
    }

    /// Last wiper angle (degrees)
    pub const fn wiper_angle(&self) -> f32 {
        self.wiper_angle
    }

    // ---- Part nodes ----

    /// Wheel on `side`, front or rear
    pub fn wheel_node(&self, side: Side, front: bool) -> NodeHandle {
        let role = match (side, front) {
            (Side::Left, true) => ROLE_WHEEL_FL,
            (Side::Right, true) => ROLE_WHEEL_FR,
            (Side::Left, false) => ROLE_WHEEL_RL,
            (Side::Right, false) => ROLE_WHEEL_RR,
        };
        self.entity.node(role)
    }

    /// Wiper on `side`
    pub fn wiper_node(&self, side: Side) -> NodeHandle {
        match side {
            Side::Left => self.entity.node(ROLE_WIPER_LEFT),
            Side::Right => self.entity.node(ROLE_WIPER_RIGHT),
        }
    }

    /// Door on `side`
    pub fn door_node(&self, side: Side) -> NodeHandle {
        match side {
            Side::Left => self.entity.node(ROLE_DOOR_LEFT),
            Side::Right => self.entity.node(ROLE_DOOR_RIGHT),
        }
    }

    /// Hood
    pub fn hood_node(&self) -> NodeHandle {
        self.entity.node(ROLE_HOOD)
    }

    /// Headlights
    pub fn headlights_node(&self) -> NodeHandle {
        self.entity.node(ROLE_HEADLIGHTS)
    }

    /// Taillights
    pub fn taillights_node(&self) -> NodeHandle {
        self.entity.node(ROLE_TAILLIGHTS)
    }

    /// Steering wheel rim and hub
    pub fn steering_wheel_nodes(&self) -> [NodeHandle; 2] {
        [
            self.entity.node(ROLE_STEERING_WHEEL_FRONT),
            self.entity.node(ROLE_STEERING_WHEEL_BACK),
        ]
    }
}

impl SceneEntity for CarEntity {
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
        EntityKind::Car
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
