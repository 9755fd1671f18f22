//! Core data structures and traits for gltfview
//!
//! This crate provides the math aliases, bounds, meshes and the scene graph
//! that the importer fills and the model controller manipulates.

pub mod point;
pub mod transform;
pub mod bounds;
pub mod mesh;
pub mod components;
pub mod model;
pub mod scene;
pub mod traits;
pub mod error;

pub use point::*;
pub use transform::*;
pub use bounds::*;
pub use mesh::*;
pub use components::*;
pub use model::*;
pub use scene::*;
pub use traits::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4, UnitQuaternion};
