//! Model file selection and scene import
//!
//! This crate provides the two asynchronous collaborators of the model
//! controller: a [`FileSelector`] that yields a path to a glTF model, and a
//! [`SceneImporter`] that turns such a path into a detached [`ModelNode`]
//! tree ready to be placed into a scene.

pub mod gltf;
pub mod selector;
pub mod error;

pub use error::*;
pub use crate::gltf::GltfImporter;
pub use selector::*;

use std::path::PathBuf;

use async_trait::async_trait;
use gltfview_core::{ColliderShape, ModelNode};
use tokio::sync::mpsc::UnboundedSender;

/// Which part of a scene file to import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeSelection {
    /// The whole default scene, without depth or node limits
    #[default]
    All,
    /// A single node (by index in the file) and its descendants
    Node(usize),
}

/// Progress events emitted while an import is running
#[derive(Debug, Clone, PartialEq)]
pub enum ImportProgress {
    /// A node finished loading; `loaded` counts nodes finished so far
    NodeLoaded { name: String, loaded: usize },
}

/// Channel an importer reports progress on
pub type ProgressSender = UnboundedSender<ImportProgress>;

/// Everything an importer needs to load one scene
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub path: PathBuf,
    pub nodes: NodeSelection,
    pub collider: ColliderShape,
    pub progress: Option<ProgressSender>,
}

impl ImportRequest {
    /// Full-scene import with box colliders and no progress reporting
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            nodes: NodeSelection::All,
            collider: ColliderShape::Box,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = Some(progress);
        self
    }
}

/// Asynchronously loads a scene file into a detached node tree.
///
/// Implementations must not block the caller's thread for the whole import.
#[async_trait]
pub trait SceneImporter: Send + Sync {
    async fn import_scene(&self, request: ImportRequest) -> Result<ModelNode>;
}
