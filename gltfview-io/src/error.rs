//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur while selecting or importing model files
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("glTF error: {0}")]
    Gltf(#[from] ::gltf::Error),

    #[error("Not supported on this platform: {reason}")]
    Unsupported { reason: String },

    #[error("Import worker failed: {0}")]
    Worker(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for I/O operations
pub type Result<T> = std::result::Result<T, IoError>;
