//! Model lifecycle controller for the gltfview mixed-reality viewer
//!
//! [`ModelController`] owns the currently displayed model. An "open" request
//! disposes the old model, asks a [`FileSelector`](gltfview_io::FileSelector)
//! for a file, imports it with a [`SceneImporter`](gltfview_io::SceneImporter),
//! then places it down the viewer's gaze at a fixed size, facing the viewer,
//! with two-handed manipulation attached. A "reset" request restores the
//! placed transform.

pub mod audio;
pub mod collaborators;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;

pub use audio::*;
pub use collaborators::*;
pub use command::*;
pub use config::*;
pub use controller::*;
pub use error::*;
