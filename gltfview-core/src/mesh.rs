//! Triangle mesh geometry carried by renderable scene nodes

use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::point::*;

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append another mesh, re-indexing its faces
    pub fn append(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.faces
            .extend(other.faces.iter().map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]));
        // Normals only survive if both halves carry them
        self.normals = match (self.normals.take(), &other.normals) {
            (_, theirs) if offset == 0 => theirs.clone(),
            (Some(mut mine), Some(theirs)) if mine.len() == offset => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            _ => None,
        };
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Bounds of the vertices in mesh-local space, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(offset: f32) -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(offset, 0.0, 0.0),
                Point3f::new(offset + 1.0, 0.0, 0.0),
                Point3f::new(offset, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_append_reindexes_faces() {
        let mut mesh = triangle(0.0);
        mesh.append(&triangle(5.0));
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [3, 4, 5]]);
        assert!(mesh.normals.is_none());
    }

    #[test]
    fn test_append_into_empty_keeps_normals() {
        let mut part = triangle(0.0);
        part.set_normals(vec![Vector3f::z(); 3]);
        let mut mesh = TriangleMesh::new();
        mesh.append(&part);
        assert_eq!(mesh, part);
    }

    #[test]
    fn test_bounds() {
        let mut mesh = triangle(0.0);
        mesh.append(&triangle(5.0));
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.size(), Vector3f::new(6.0, 1.0, 0.0));
        assert!(TriangleMesh::new().bounds().is_none());
    }

    #[test]
    fn test_set_normals_requires_matching_length() {
        let mut mesh = triangle(0.0);
        mesh.set_normals(vec![Vector3f::z()]);
        assert!(mesh.normals.is_none());
        mesh.set_normals(vec![Vector3f::z(); 3]);
        assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(3));
    }
}
