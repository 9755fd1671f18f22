//! glTF 2.0 (`.gltf` / `.glb`) scene import

use std::collections::HashSet;
use std::path::Path;

use ::gltf::buffer::Data;
use ::gltf::mesh::Mode;
use ::gltf::scene::iter::Children;
use ::gltf::{Document, Gltf, Node};
use async_trait::async_trait;
use gltfview_core::{
    Collider, ColliderShape, Drawable, ModelNode, Point3f, Rotationf, Transform, TriangleMesh,
    Vector3f,
};
use nalgebra::Quaternion;
use tracing::{debug, info};

use crate::{ImportProgress, ImportRequest, IoError, NodeSelection, ProgressSender, Result, SceneImporter};

/// Imports glTF files with the `gltf` crate on a blocking worker thread
#[derive(Debug, Clone, Copy, Default)]
pub struct GltfImporter;

impl GltfImporter {
    pub fn new() -> Self {
        Self
    }

    /// Load a scene synchronously. [`SceneImporter::import_scene`] runs this
    /// on a blocking worker.
    pub fn load(
        path: &Path,
        nodes: NodeSelection,
        collider: ColliderShape,
        progress: Option<&ProgressSender>,
    ) -> Result<ModelNode> {
        if !path.is_file() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let Gltf { document, blob } = Gltf::open(path)?;
        let buffers = ::gltf::import_buffers(&document, path.parent(), blob)?;

        let mut builder = TreeBuilder {
            buffers: &buffers,
            collider,
            progress,
            loaded: 0,
        };

        let root = match nodes {
            NodeSelection::All => {
                let fallback_name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("model")
                    .to_string();
                builder.build_scene(&document, fallback_name)?
            }
            NodeSelection::Node(index) => {
                let node = document.nodes().nth(index).ok_or_else(|| IoError::InvalidFormat {
                    format: format!("node index {} out of range ({} nodes)", index, document.nodes().len()),
                })?;
                builder.build_tree(node)?
            }
        };

        info!(
            path = %path.display(),
            nodes = root.node_count(),
            meshes = root.mesh_count(),
            bounds = ?root.bounding_box(),
            "imported glTF scene"
        );
        Ok(root)
    }
}

#[async_trait]
impl SceneImporter for GltfImporter {
    async fn import_scene(&self, request: ImportRequest) -> Result<ModelNode> {
        let ImportRequest {
            path,
            nodes,
            collider,
            progress,
        } = request;
        debug!(path = %path.display(), ?nodes, ?collider, "starting glTF import");

        tokio::task::spawn_blocking(move || Self::load(&path, nodes, collider, progress.as_ref()))
            .await
            .map_err(|e| IoError::Worker(e.to_string()))?
    }
}

struct TreeBuilder<'a> {
    buffers: &'a [Data],
    collider: ColliderShape,
    progress: Option<&'a ProgressSender>,
    loaded: usize,
}

/// A node on the build stack, waiting for its remaining children
struct PendingNode<'d> {
    index: usize,
    model: ModelNode,
    children: Children<'d>,
}

impl TreeBuilder<'_> {
    /// Build the default scene (or the first one). Several root nodes are
    /// grouped under a synthetic root named `fallback_name`.
    fn build_scene(&mut self, document: &Document, fallback_name: String) -> Result<ModelNode> {
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| IoError::InvalidFormat {
                format: "glTF file contains no scene".to_string(),
            })?;

        let mut roots = scene
            .nodes()
            .map(|node| self.build_tree(node))
            .collect::<Result<Vec<_>>>()?;

        if roots.len() == 1 {
            return Ok(roots.remove(0));
        }
        let mut root = ModelNode::new(fallback_name);
        root.children = roots;
        Ok(root)
    }

    /// Build the subtree under `root` depth-first with an explicit stack,
    /// so hierarchy depth is not limited by the thread's stack. A node that
    /// shows up again below itself is rejected.
    fn build_tree<'d>(&mut self, root: Node<'d>) -> Result<ModelNode> {
        let mut path = HashSet::from([root.index()]);
        let mut stack = vec![self.open_node(&root)?];

        while let Some(top) = stack.last_mut() {
            if let Some(child) = top.children.next() {
                if !path.insert(child.index()) {
                    return Err(IoError::InvalidFormat {
                        format: format!("node {} is its own ancestor", child.index()),
                    });
                }
                let pending = self.open_node(&child)?;
                stack.push(pending);
                continue;
            }

            let Some(done) = stack.pop() else { break };
            path.remove(&done.index);
            let model = self.finish_node(done.model);
            match stack.last_mut() {
                Some(parent) => parent.model.children.push(model),
                None => return Ok(model),
            }
        }

        Err(IoError::InvalidFormat {
            format: "empty node hierarchy".to_string(),
        })
    }

    /// Read a node's own data; its children are filled in later
    fn open_node<'d>(&self, node: &Node<'d>) -> Result<PendingNode<'d>> {
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node{}", node.index()));

        let (translation, rotation, scale) = node.transform().decomposed();
        let transform = Transform::from_parts(
            Vector3f::from(translation),
            Rotationf::from_quaternion(Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2])),
            Vector3f::from(scale),
        );

        let mesh = match node.mesh() {
            Some(mesh) => self.read_mesh(&mesh)?,
            None => None,
        };
        let collider = match (self.collider, &mesh) {
            (ColliderShape::Box, Some(mesh)) => mesh.bounds().map(Collider::Box),
            _ => None,
        };

        Ok(PendingNode {
            index: node.index(),
            model: ModelNode {
                name,
                transform,
                mesh,
                collider,
                children: Vec::new(),
            },
            children: node.children(),
        })
    }

    /// Count a node whose children are all built and report it
    fn finish_node(&mut self, model: ModelNode) -> ModelNode {
        self.loaded += 1;
        if let Some(progress) = self.progress {
            // A dropped receiver just means nobody is listening
            let _ = progress.send(ImportProgress::NodeLoaded {
                name: model.name.clone(),
                loaded: self.loaded,
            });
        }
        model
    }

    /// Merge the triangle primitives of a mesh. Returns `None` when no
    /// primitive has positions.
    fn read_mesh(&self, mesh: &::gltf::Mesh) -> Result<Option<TriangleMesh>> {
        let buffers = self.buffers;
        let mut merged = TriangleMesh::new();

        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                debug!(mode = ?primitive.mode(), "skipping non-triangle primitive");
                continue;
            }
            let reader = primitive.reader(move |buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let vertices: Vec<Point3f> = positions.map(Point3f::from).collect();

            let faces: Vec<[usize; 3]> = match reader.read_indices() {
                Some(indices) => {
                    let indices: Vec<usize> = indices.into_u32().map(|i| i as usize).collect();
                    indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
                }
                None => (0..vertices.len() / 3).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]).collect(),
            };
            if let Some(bad) = faces.iter().flatten().find(|&&i| i >= vertices.len()) {
                return Err(IoError::InvalidFormat {
                    format: format!("index {} out of range for {} vertices", bad, vertices.len()),
                });
            }

            let mut part = TriangleMesh::from_vertices_and_faces(vertices, faces);
            if let Some(normals) = reader.read_normals() {
                part.set_normals(normals.map(Vector3f::from).collect());
            }
            merged.append(&part);
        }

        Ok((!merged.is_empty()).then_some(merged))
    }
}
