//! Entity specializations
//!
//! Each wraps a generic [`Entity`](crate::scene::Entity) and adds role
//! constants, typed accessors and validated configuration.

pub mod camera;
pub mod car;
pub mod road;

pub use camera::{CameraConfig, CameraEntity, CameraMode, ROLE_CAMERA_ROOT};
pub use car::{CarConfig, CarEntity, Side};
pub use road::{RoadConfig, RoadEntity};
