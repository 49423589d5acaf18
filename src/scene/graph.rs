use glam::{Mat3, Mat4, Quat, Vec3};
use std::collections::HashMap;

use super::mesh::MeshId;

/// Handle to a node in a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Transformable scene node, optionally drawing one mesh
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub visible: bool,
    pub mesh: Option<MeshId>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            visible: true,
            mesh: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: MeshId) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_transform(mut self, translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        self.translation = translation;
        self.rotation = rotation;
        self.scale = scale;
        self
    }

    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena scene graph. Nodes live until the whole graph is dropped,
/// so a `NodeId` doubles as a stable per-node identity.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    tags: HashMap<String, Vec<NodeId>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("Scene")],
            tags: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Attach `node` under `parent` and return its handle
    pub fn add(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = &self.nodes[id.0];
        match node.parent {
            Some(parent) => self.world_matrix(parent) * node.local_matrix(),
            None => node.local_matrix(),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).w_axis.truncate()
    }

    /// Inverse-transpose of the upper 3x3, correct for non-uniform scale
    pub fn normal_matrix(world: &Mat4) -> Mat3 {
        Mat3::from_mat4(*world).inverse().transpose()
    }

    /// Visible only if the node and every ancestor are visible
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            if !node.visible {
                return false;
            }
            current = node.parent;
        }
        true
    }

    /// Pre-order list of `root` and everything below it
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// First node under `root` (pre-order) whose name contains `pattern`, ignoring case
    pub fn find_by_name(&self, root: NodeId, pattern: &str) -> Option<NodeId> {
        let needle = pattern.to_lowercase();
        self.descendants(root)
            .into_iter()
            .find(|id| self.nodes[id.0].name.to_lowercase().contains(&needle))
    }

    /// Every node under `root` whose name contains `pattern`, ignoring case.
    /// Matches nested inside an earlier match are skipped.
    pub fn find_all_by_name(&self, root: NodeId, pattern: &str) -> Vec<NodeId> {
        let needle = pattern.to_lowercase();
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.nodes[id.0].name.to_lowercase().contains(&needle) {
                out.push(id);
                continue;
            }
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Deep-copy the subtree at `source` under `parent`. Meshes are shared, not duplicated.
    pub fn clone_subtree(&mut self, source: NodeId, parent: NodeId) -> NodeId {
        let copy = self.nodes[source.0].clone();
        let children = copy.children.clone();
        let id = self.add(parent, copy);
        for child in children {
            self.clone_subtree(child, id);
        }
        id
    }

    pub fn add_tag(&mut self, tag: &str, id: NodeId) {
        let entry = self.tags.entry(tag.to_string()).or_default();
        if !entry.contains(&id) {
            entry.push(id);
        }
    }

    pub fn tagged(&self, tag: &str) -> &[NodeId] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear_tag(&mut self, tag: &str) {
        self.tags.remove(tag);
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
