//! Point and vector aliases used across gltfview

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A unit quaternion rotation
pub type Rotationf = UnitQuaternion<f32>;

/// A homogeneous 4x4 matrix
pub type Matrix4f = Matrix4<f32>;

/// World up axis (+Y)
pub fn world_up() -> Vector3f {
    Vector3f::y()
}
