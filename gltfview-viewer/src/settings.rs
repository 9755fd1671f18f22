//! Settings file and command-line overrides

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use gltfview_controller::{ControllerConfig, HeadPose};
use serde::{Deserialize, Serialize};

/// Command line of the `gltfview` binary
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Open, place and reset glTF models with spoken-style commands")]
pub struct Cli {
    /// TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Cycle through the models in this folder instead of showing a file dialog
    #[arg(short, long)]
    pub folder: Option<PathBuf>,

    /// Folder the file dialog opens in
    #[arg(long, value_name = "DIR")]
    pub start_dir: Option<PathBuf>,

    /// Size of a model's largest edge after opening, in metres
    #[arg(long)]
    pub target_size: Option<f32>,

    /// Distance down the gaze at which models are placed, in metres
    #[arg(long)]
    pub distance: Option<f32>,

    /// Height of the viewer's eyes, in metres
    #[arg(long)]
    pub head_height: Option<f32>,

    /// Commands to run before reading standard input (repeatable)
    #[arg(long = "run", value_name = "COMMAND")]
    pub commands: Vec<String>,
}

/// Contents of the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub controller: ControllerConfig,
    pub head: HeadPose,
}

impl Settings {
    /// Read settings from `path`, or the defaults when there is no file
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid settings file {}", path.display()))
    }

    /// Apply command-line flags on top of the file settings
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(size) = cli.target_size {
            self.controller.target_size = size;
        }
        if let Some(distance) = cli.distance {
            self.controller.start_distance = distance;
        }
        if let Some(height) = cli.head_height {
            self.head.position.y = height;
        }
        self
    }
}
