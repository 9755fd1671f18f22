//! Core traits for gltfview

use crate::bounds::Aabb;
use crate::mesh::TriangleMesh;
use crate::model::ModelNode;

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Bounds in the object's own coordinate space, `None` if it has no geometry
    fn bounding_box(&self) -> Option<Aabb>;
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> Option<Aabb> {
        self.bounds()
    }
}

impl Drawable for ModelNode {
    /// Merged bounds of every mesh in the subtree, expressed in the space of
    /// this node's parent
    fn bounding_box(&self) -> Option<Aabb> {
        let matrix = self.transform.to_homogeneous();
        let own = self.mesh.as_ref().and_then(TriangleMesh::bounds);
        let children = self
            .children
            .iter()
            .filter_map(Drawable::bounding_box)
            .reduce(|a, b| a.merge(&b));
        let local = match (own, children) {
            (Some(a), Some(b)) => Some(a.merge(&b)),
            (a, b) => a.or(b),
        };
        local.map(|bounds| bounds.transformed(&matrix))
    }
}
