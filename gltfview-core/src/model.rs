//! Detached node trees produced by scene importers

use serde::{Deserialize, Serialize};

use crate::components::Collider;
use crate::mesh::TriangleMesh;
use crate::transform::Transform;

/// A node of an imported model, owning its children.
///
/// Importers build these off the scene; the scene takes ownership through
/// [`Scene::instantiate`](crate::Scene::instantiate).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<TriangleMesh>,
    pub collider: Option<Collider>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    /// Create an empty node with an identity transform
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: TriangleMesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_child(mut self, child: ModelNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ModelNode::node_count).sum::<usize>()
    }

    /// Number of nodes in this subtree carrying a mesh
    pub fn mesh_count(&self) -> usize {
        usize::from(self.mesh.is_some())
            + self.children.iter().map(ModelNode::mesh_count).sum::<usize>()
    }

    /// Depth-first search by name
    pub fn find(&self, name: &str) -> Option<&ModelNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}
