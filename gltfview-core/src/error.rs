//! Error types for gltfview-core

use thiserror::Error;

use crate::scene::NodeId;

/// Main error type for scene graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Cannot parent {child:?} under {parent:?}: would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
