//! Scene graph
//!
//! An arena of nodes addressed by [`NodeId`]. Every node has a local
//! [`Transform`] relative to its parent; world matrices are composed from the
//! root down on demand, nothing is cached.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::components::{Collider, Manipulation};
use crate::error::{Error, Result};
use crate::mesh::TriangleMesh;
use crate::model::ModelNode;
use crate::point::*;
use crate::transform::{look_rotation, Transform};

/// Handle to a node in a [`Scene`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u64);

/// A node living in the scene
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub mesh: Option<TriangleMesh>,
    pub collider: Option<Collider>,
    pub manipulation: Option<Manipulation>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: String, transform: Transform) -> Self {
        Self {
            name,
            transform,
            mesh: None,
            collider: None,
            manipulation: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed scene graph
#[derive(Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeId, SceneNode>,
    next_id: u64,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode> {
        self.nodes.get(&id).ok_or(Error::NodeNotFound(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))
    }

    pub fn transform(&self, id: NodeId) -> Result<&Transform> {
        Ok(&self.node(id)?.transform)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Result<&mut Transform> {
        Ok(&mut self.node_mut(id)?.transform)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(self.node(id)?.children())
    }

    /// Create an empty node, optionally under `parent`
    pub fn create_node(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> Result<NodeId> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }
        let id = self.allocate(SceneNode::new(name.into(), Transform::identity()));
        if let Some(parent) = parent {
            self.link(id, parent);
        }
        Ok(id)
    }

    /// Take ownership of an imported tree and attach it under `parent`.
    /// Local transforms are kept as imported. Returns the id of the tree root.
    pub fn instantiate(&mut self, parent: Option<NodeId>, model: ModelNode) -> Result<NodeId> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }
        Ok(self.instantiate_inner(parent, model))
    }

    fn instantiate_inner(&mut self, parent: Option<NodeId>, model: ModelNode) -> NodeId {
        let ModelNode {
            name,
            transform,
            mesh,
            collider,
            children,
        } = model;
        let mut node = SceneNode::new(name, transform);
        node.mesh = mesh;
        node.collider = collider;
        let id = self.allocate(node);
        if let Some(parent) = parent {
            self.link(id, parent);
        }
        for child in children {
            self.instantiate_inner(Some(id), child);
        }
        id
    }

    /// Move `child` under `parent` (or to the root), keeping its local transform
    pub fn set_parent(&mut self, child: NodeId, parent: Option<NodeId>) -> Result<()> {
        self.node(child)?;
        if let Some(parent) = parent {
            self.node(parent)?;
            if self.is_ancestor_or_self(child, parent) {
                return Err(Error::Cycle { child, parent });
            }
        }
        self.unlink(child);
        if let Some(parent) = parent {
            self.link(child, parent);
        }
        Ok(())
    }

    /// Remove a node and its whole subtree. Returns the number of nodes removed.
    pub fn destroy(&mut self, id: NodeId) -> Result<usize> {
        self.node(id)?;
        self.unlink(id);
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Matrix taking node-local coordinates to world coordinates
    pub fn world_matrix(&self, id: NodeId) -> Result<Matrix4f> {
        let mut matrix = Matrix4f::identity();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            matrix = node.transform.to_homogeneous() * matrix;
            current = node.parent;
        }
        Ok(matrix)
    }

    pub fn world_position(&self, id: NodeId) -> Result<Point3f> {
        Ok(self.world_matrix(id)?.transform_point(&Point3f::origin()))
    }

    /// Accumulated rotation from the root down to this node
    pub fn world_rotation(&self, id: NodeId) -> Result<Rotationf> {
        let mut rotation = Rotationf::identity();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            rotation = node.transform.rotation * rotation;
            current = node.parent;
        }
        Ok(rotation)
    }

    /// Rotate a node so that its +Z axis points at a world-space `target`.
    /// Leaves the rotation untouched if the node sits on the target.
    pub fn look_at(&mut self, id: NodeId, target: &Point3f) -> Result<()> {
        let eye = self.world_position(id)?;
        let Some(world) = look_rotation(&eye, target) else {
            return Ok(());
        };
        let parent_rotation = match self.node(id)?.parent {
            Some(parent) => self.world_rotation(parent)?,
            None => Rotationf::identity(),
        };
        self.transform_mut(id)?.rotation = parent_rotation.inverse() * world;
        Ok(())
    }

    /// Merged world-space bounds of every mesh in the subtree rooted at `id`,
    /// `None` when the subtree has no geometry
    pub fn subtree_bounds(&self, id: NodeId) -> Result<Option<Aabb>> {
        let mut result: Option<Aabb> = None;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            if let Some(local) = node.mesh.as_ref().and_then(TriangleMesh::bounds) {
                let world = local.transformed(&self.world_matrix(current)?);
                result = Some(match result {
                    Some(bounds) => bounds.merge(&world),
                    None => world,
                });
            }
            stack.extend(node.children.iter().copied());
        }
        Ok(result)
    }

    pub fn set_manipulation(&mut self, id: NodeId, manipulation: Manipulation) -> Result<()> {
        self.node_mut(id)?.manipulation = Some(manipulation);
        Ok(())
    }

    /// Detach the manipulation component, returning it if there was one
    pub fn remove_manipulation(&mut self, id: NodeId) -> Result<Option<Manipulation>> {
        Ok(self.node_mut(id)?.manipulation.take())
    }

    fn allocate(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn link(&mut self, child: NodeId, parent: NodeId) {
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    fn unlink(&mut self, child: NodeId) {
        let parent = self.nodes.get_mut(&child).and_then(|node| node.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != child);
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.nodes.get(&node_id).and_then(|n| n.parent);
        }
        false
    }
}
