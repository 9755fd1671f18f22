//! Local transforms (translation, rotation, scale)

use nalgebra::{Isometry3, Matrix4, Translation3};
use serde::{Deserialize, Serialize};

use crate::point::*;

/// A node's transform relative to its parent, stored as separate
/// translation, rotation and scale components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3f,
    pub rotation: Rotationf,
    pub scale: Vector3f,
}

impl Transform {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self {
            translation: Vector3f::zeros(),
            rotation: Rotationf::identity(),
            scale: Vector3f::repeat(1.0),
        }
    }

    /// Create a transform from its three components
    pub fn from_parts(translation: Vector3f, rotation: Rotationf, scale: Vector3f) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Create a pure translation
    pub fn from_translation(translation: Vector3f) -> Self {
        Self {
            translation,
            ..Self::identity()
        }
    }

    /// Replace the scale with the same factor on all three axes
    pub fn set_uniform_scale(&mut self, factor: f32) {
        self.scale = Vector3f::repeat(factor);
    }

    /// Homogeneous matrix applying scale, then rotation, then translation
    pub fn to_homogeneous(&self) -> Matrix4f {
        let isometry = Isometry3::from_parts(Translation3::from(self.translation), self.rotation);
        isometry.to_homogeneous() * Matrix4::new_nonuniform_scaling(&self.scale)
    }

}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// World-space rotation whose +Z axis points from `eye` towards `target`.
///
/// Returns `None` when the two points coincide.
pub fn look_rotation(eye: &Point3f, target: &Point3f) -> Option<Rotationf> {
    let direction = target - eye;
    if direction.norm_squared() <= f32::EPSILON {
        return None;
    }
    let direction = direction.normalize();
    let up = world_up();
    if direction.cross(&up).norm_squared() <= 1e-8 {
        // Looking straight up or down, where the up vector is degenerate
        return Rotationf::rotation_between(&Vector3f::z(), &direction)
            .or_else(|| Some(Rotationf::from_axis_angle(&Vector3f::x_axis(), std::f32::consts::PI)));
    }
    Some(Rotationf::face_towards(&direction, &up))
}
