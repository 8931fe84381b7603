//! Math utilities and types
//!
//! Provides the math types used by the scene graph: nalgebra aliases, the TRS
//! [`Transform`], and the bounding volumes used for visibility culling.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, UnitQuaternion, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Basis columns shorter than this are treated as collapsed during decomposition
const MIN_AXIS_LENGTH: f32 = 1e-8;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from all three components
    pub const fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Convert to a transformation matrix (`T * R * S`)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Create a transform from a transformation matrix
    ///
    /// Translation comes from the last column, per-axis scale is the length of
    /// each basis column, and the normalized basis becomes the rotation. This is
    /// only exact for matrices without shear; sheared input yields the nearest
    /// rotation nalgebra can extract from the non-orthogonal basis.
    pub fn from_matrix(matrix: Mat4) -> Self {
        // Extract position
        let position = Vec3::new(matrix.m14, matrix.m24, matrix.m34);

        // Extract scale from the matrix columns
        let axis_x = Vec3::new(matrix.m11, matrix.m21, matrix.m31);
        let axis_y = Vec3::new(matrix.m12, matrix.m22, matrix.m32);
        let axis_z = Vec3::new(matrix.m13, matrix.m23, matrix.m33);
        let scale = Vec3::new(axis_x.magnitude(), axis_y.magnitude(), axis_z.magnitude());

        // A collapsed axis has no recoverable orientation
        if scale.min() < MIN_AXIS_LENGTH {
            return Self {
                position,
                rotation: Quat::identity(),
                scale,
            };
        }

        let rotation_matrix =
            Mat3::from_columns(&[axis_x / scale.x, axis_y / scale.y, axis_z / scale.z]);
        let rotation = Quat::from_matrix(&rotation_matrix);

        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        (b - a).mul_add(t, a)
    }
}

/// Extension trait for Mat4 with projection helpers
pub trait Mat4Ext {
    /// Create a perspective projection matrix with Vulkan's [0, 1] depth range
    ///
    /// Expects view-space input with +Z pointing into the screen; combine with
    /// [`Mat4Ext::vulkan_coordinate_transform`] for -Z forward cameras.
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Flip Y and Z to move from a Y-up, -Z forward view space into Vulkan's conventions
    fn vulkan_coordinate_transform() -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (far - near);
        result[(2, 3)] = -(near * far) / (far - near);
        result[(3, 2)] = 1.0;

        result
    }

    fn vulkan_coordinate_transform() -> Mat4 {
        Mat4::new(
            1.0,  0.0,  0.0, 0.0,
            0.0, -1.0,  0.0, 0.0,
            0.0,  0.0, -1.0, 0.0,
            0.0,  0.0,  0.0, 1.0,
        )
    }
}

/// Axis-Aligned Bounding Box for visibility queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// World-space box enclosing this box after `matrix` is applied
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let mut min = Vec3::repeat(f32::INFINITY);
        let mut max = Vec3::repeat(f32::NEG_INFINITY);

        for corner in 0..8 {
            let local = Point3::new(
                if corner & 1 == 0 { self.min.x } else { self.max.x },
                if corner & 2 == 0 { self.min.y } else { self.max.y },
                if corner & 4 == 0 { self.min.z } else { self.max.z },
            );
            let world = matrix.transform_point(&local).coords;
            min = min.inf(&world);
            max = max.sup(&world);
        }

        Self { min, max }
    }
}

/// Plane defined by normal and distance from origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Normal vector (normalized)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a plane from `ax + by + cz + d = 0` coefficients, normalizing them
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let normal = coefficients.xyz();
        let length = normal.magnitude();
        if length < MIN_AXIS_LENGTH {
            return Self {
                normal: Vec3::zeros(),
                distance: coefficients.w,
            };
        }
        Self {
            normal: normal / length,
            distance: coefficients.w / length,
        }
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// Frustum for visibility culling
#[derive(Debug, Clone)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for clip space with `-w <= x, y <= w` and
    /// `0 <= z <= w` (Vulkan depth range). Plane normals point inward.
    pub fn from_matrix(view_proj: &Mat4) -> Self {
        let row = |i: usize| -> Vec4 { view_proj.row(i).transpose() };
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        Self {
            planes: [
                Plane::from_coefficients(r3 + r0),
                Plane::from_coefficients(r3 - r0),
                Plane::from_coefficients(r3 + r1),
                Plane::from_coefficients(r3 - r1),
                Plane::from_coefficients(r2),
                Plane::from_coefficients(r3 - r2),
            ],
        }
    }

    /// Check if an AABB is inside or intersects the frustum
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            // Corner furthest along the plane normal
            let mut p = aabb.min;
            if plane.normal.x >= 0.0 { p.x = aabb.max.x; }
            if plane.normal.y >= 0.0 { p.y = aabb.max.y; }
            if plane.normal.z >= 0.0 { p.z = aabb.max.z; }

            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_transform_matrix() {
        assert_relative_eq!(Transform::identity().to_matrix(), Mat4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_matrix_roundtrip_consistency() {
        let original = Transform::from_trs(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_axis_angle(&Unit::new_normalize(Vec3::new(1.0, 1.0, 1.0)), 0.5),
            Vec3::new(2.0, 1.5, 0.8),
        );

        let reconstructed = Transform::from_matrix(original.to_matrix());

        assert_relative_eq!(reconstructed.position, original.position, epsilon = 1e-5);
        assert_relative_eq!(reconstructed.scale, original.scale, epsilon = 1e-5);

        // Quaternions might flip sign but represent same rotation
        let dot = original.rotation.coords.dot(&reconstructed.rotation.coords);
        assert!(dot.abs() > 0.999, "Quaternion rotation mismatch: dot product = {dot}");
    }

    #[test]
    fn test_collapsed_axis_does_not_produce_nan() {
        let matrix = Mat4::new_nonuniform_scaling(&Vec3::new(1.0, 0.0, 1.0));
        let transform = Transform::from_matrix(matrix);

        assert_eq!(transform.scale, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(transform.rotation, Quat::identity());
    }

    #[test]
    fn test_trs_order_scales_before_translating() {
        let transform = Transform::from_trs(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::identity(),
            Vec3::new(2.0, 2.0, 2.0),
        );

        let moved = transform.transform_point(Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(moved, Point3::new(12.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_aabb_transformed_by_rotation() {
        let aabb = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let rotation = Quat::from_axis_angle(&Vec3::z_axis(), constants::HALF_PI).to_homogeneous();

        let world = aabb.transformed(&rotation);
        assert_relative_eq!(world.min, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(world.max, Vec3::new(0.0, 2.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn test_frustum_from_identity_culls_outside_clip_volume() {
        let frustum = Frustum::from_matrix(&Mat4::identity());

        let inside = Aabb::from_center_extents(Vec3::new(0.0, 0.0, 0.5), Vec3::repeat(0.25));
        let straddling = Aabb::from_center_extents(Vec3::new(1.0, 0.0, 0.5), Vec3::repeat(0.25));
        let outside = Aabb::from_center_extents(Vec3::new(5.0, 0.0, 0.5), Vec3::repeat(0.25));
        let behind = Aabb::from_center_extents(Vec3::new(0.0, 0.0, -3.0), Vec3::repeat(0.25));

        assert!(frustum.intersects_aabb(&inside));
        assert!(frustum.intersects_aabb(&straddling));
        assert!(!frustum.intersects_aabb(&outside));
        assert!(!frustum.intersects_aabb(&behind));
    }

    #[test]
    fn test_perspective_maps_near_and_far_to_unit_depth() {
        let projection = Mat4::perspective(constants::HALF_PI, 1.0, 0.1, 100.0)
            * Mat4::vulkan_coordinate_transform();

        let near = projection * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = projection * Vec4::new(0.0, 0.0, -100.0, 1.0);

        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_lerp_and_clamp() {
        assert_relative_eq!(utils::lerp(0.0, 10.0, 0.25), 2.5);
        assert_relative_eq!(utils::clamp(5.0, 0.0, 1.0), 1.0);
        assert_relative_eq!(utils::rad_to_deg(utils::deg_to_rad(45.0)), 45.0, epsilon = 1e-4);
    }
}
