//! Error types for the model controller

use gltfview_io::IoError;
use thiserror::Error;

/// Errors that cross the controller boundary.
///
/// Import failures are not here: they are recovered inside the controller.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("File selection is not supported on this platform: {0}")]
    UnsupportedPlatform(String),

    #[error("File selection failed: {0}")]
    Selector(#[source] IoError),

    #[error("Scene error: {0}")]
    Scene(#[from] gltfview_core::Error),

    #[error("Unknown command: {0:?}")]
    UnknownCommand(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors reported by a spatial anchor store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnchorError {
    #[error("Anchoring is not available")]
    Unavailable,

    #[error("Anchor could not be placed: {0}")]
    Placement(String),
}

/// Result type alias for controller operations
pub type Result<T> = std::result::Result<T, ControllerError>;
