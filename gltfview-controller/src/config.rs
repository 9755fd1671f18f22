//! Controller settings

use serde::{Deserialize, Serialize};

use crate::error::{ControllerError, Result};

/// Tunables for placing newly opened models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Largest edge of a model's bounds after initial sizing, in metres
    pub target_size: f32,
    /// How far down the gaze a model is placed, in metres
    pub start_distance: f32,
    /// Message shown by the progress indicator during import
    pub loading_message: String,
    /// Text on the file picker's commit action
    pub commit_text: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            target_size: 0.5,
            start_distance: 3.0,
            loading_message: "Loading...".to_string(),
            commit_text: gltfview_io::DEFAULT_COMMIT_TEXT.to_string(),
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.target_size.is_finite() && self.target_size > 0.0) {
            return Err(ControllerError::InvalidConfig(format!(
                "target_size must be a positive number, got {}",
                self.target_size
            )));
        }
        if !(self.start_distance.is_finite() && self.start_distance >= 0.0) {
            return Err(ControllerError::InvalidConfig(format!(
                "start_distance must be a non-negative number, got {}",
                self.start_distance
            )));
        }
        Ok(())
    }
}
