//! Host-side services the controller drives
//!
//! The host (engine, shell, test harness) implements these and hands them to
//! [`ModelController::new`](crate::ModelController::new) once; the controller
//! never looks anything up on its own.

use gltfview_core::{NodeId, Point3f, Vector3f};
use serde::{Deserialize, Serialize};

use crate::error::AnchorError;

/// Visual style of the progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorStyle {
    AnimatedOrbs,
}

/// Modal "busy" indicator. Both calls must be idempotent and `close` must be
/// safe without a prior `open`.
pub trait ProgressIndicator: Send + Sync {
    fn open(&self, style: IndicatorStyle, message: &str);
    fn close(&self);
}

/// The gaze/interaction cursor
pub trait Cursor: Send + Sync {
    fn set_visible(&self, visible: bool);
}

/// Pins nodes against drift in a tracked coordinate system
pub trait SpatialAnchors: Send + Sync {
    /// Remove the anchor from `node`, if it has one
    fn detach(&self, node: NodeId);

    /// Anchor `node` at a world position
    fn attach(&self, node: NodeId, position: &Point3f) -> Result<(), AnchorError>;
}

/// Where the viewer's head is and where it looks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub position: Point3f,
    /// Gaze direction; need not be normalised
    pub forward: Vector3f,
}

impl HeadPose {
    pub fn new(position: Point3f, forward: Vector3f) -> Self {
        Self { position, forward }
    }
}

impl Default for HeadPose {
    fn default() -> Self {
        // Head at standing eye height, looking down -Z
        Self::new(Point3f::new(0.0, 1.6, 0.0), -Vector3f::z())
    }
}

/// Live source of the viewer's head pose
pub trait HeadTracker: Send + Sync {
    fn head_pose(&self) -> HeadPose;
}
