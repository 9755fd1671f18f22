//! Terminal stand-ins for the headset services
//!
//! Progress, cursor, audio and anchors report through `tracing`; the head
//! pose is a shared value the shell can move.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use gltfview_controller::{
    AnchorError, AudioCue, AudioSink, Cursor, HeadPose, HeadTracker, IndicatorStyle, ProgressIndicator,
    SpatialAnchors,
};
use gltfview_core::{NodeId, Point3f};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct ConsoleProgress {
    open: Mutex<bool>,
}

impl ProgressIndicator for ConsoleProgress {
    fn open(&self, style: IndicatorStyle, message: &str) {
        let mut open = self.open.lock().unwrap_or_else(|p| p.into_inner());
        if !*open {
            info!(?style, "{}", message);
            *open = true;
        }
    }

    fn close(&self) {
        let mut open = self.open.lock().unwrap_or_else(|p| p.into_inner());
        if *open {
            debug!("progress indicator closed");
            *open = false;
        }
    }
}

#[derive(Debug, Default)]
pub struct ConsoleCursor;

impl Cursor for ConsoleCursor {
    fn set_visible(&self, visible: bool) {
        debug!(visible, "cursor");
    }
}

#[derive(Debug, Default)]
pub struct ConsoleAudio;

impl AudioSink for ConsoleAudio {
    fn play(&self, cue: AudioCue) {
        let sound = match cue {
            AudioCue::Resetting => "whoosh",
            AudioCue::FirstModelOpened => "fanfare",
            AudioCue::Loaded => "chime",
            AudioCue::LoadError => "buzz",
        };
        info!(?cue, "audio cue: {}", sound);
    }
}

/// Remembers anchor positions in memory
#[derive(Debug, Default)]
pub struct MemoryAnchors {
    anchors: Mutex<HashMap<NodeId, Point3f>>,
}

impl MemoryAnchors {
    pub fn anchor_of(&self, node: NodeId) -> Option<Point3f> {
        self.anchors.lock().unwrap_or_else(|p| p.into_inner()).get(&node).copied()
    }
}

impl SpatialAnchors for MemoryAnchors {
    fn detach(&self, node: NodeId) {
        if self.anchors.lock().unwrap_or_else(|p| p.into_inner()).remove(&node).is_some() {
            debug!(?node, "anchor removed");
        }
    }

    fn attach(&self, node: NodeId, position: &Point3f) -> Result<(), AnchorError> {
        if !position.coords.iter().all(|c| c.is_finite()) {
            return Err(AnchorError::Placement(format!("non-finite position {}", position)));
        }
        self.anchors
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(node, *position);
        debug!(?node, %position, "anchored");
        Ok(())
    }
}

/// Head pose the shell can update between commands
#[derive(Debug, Default)]
pub struct SharedHead {
    pose: RwLock<HeadPose>,
}

impl SharedHead {
    pub fn new(pose: HeadPose) -> Self {
        Self {
            pose: RwLock::new(pose),
        }
    }

    pub fn move_to(&self, position: Point3f) {
        self.pose.write().unwrap_or_else(|p| p.into_inner()).position = position;
    }
}

impl HeadTracker for SharedHead {
    fn head_pose(&self) -> HeadPose {
        *self.pose.read().unwrap_or_else(|p| p.into_inner())
    }
}
