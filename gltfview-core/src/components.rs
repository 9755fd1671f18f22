//! Components that can be attached to scene nodes

use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;

/// Collision geometry shape requested from an importer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColliderShape {
    /// No collision geometry
    None,
    /// Box matching each mesh's local bounds
    #[default]
    Box,
}

/// Collision geometry attached to a node, in node-local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Collider {
    Box(Aabb),
}

/// What a manipulation gesture is allowed to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManipulationMode {
    Move,
    Scale,
    MoveAndScale,
    MoveScaleAndRotate,
}

/// Axis a rotation gesture is locked to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisConstraint {
    None,
    X,
    Y,
    Z,
}

/// Direct-interaction behaviour letting the user move, scale and rotate a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manipulation {
    pub mode: ManipulationMode,
    pub rotation_constraint: AxisConstraint,
    pub two_handed: bool,
}

impl Manipulation {
    /// Two-handed move/scale/rotate with free rotation
    pub fn two_handed() -> Self {
        Self {
            mode: ManipulationMode::MoveScaleAndRotate,
            rotation_constraint: AxisConstraint::None,
            two_handed: true,
        }
    }
}

impl Default for Manipulation {
    fn default() -> Self {
        Self::two_handed()
    }
}
