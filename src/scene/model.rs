use glam::{Quat, Vec3};

use super::graph::{Node, NodeId, SceneGraph};
use super::mesh::{Mesh, MeshId, MeshStore};

/// Node of a decoded model before it is attached to a scene
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Index into [`LoadedModel::meshes`]
    pub mesh: Option<usize>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mesh: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    pub fn with_child(mut self, child: ModelNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Decoded model detached from any scene
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub root: ModelNode,
    pub meshes: Vec<Mesh>,
}

impl LoadedModel {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    /// Move the model's meshes into `store` and its node tree under `parent`
    pub fn install(self, graph: &mut SceneGraph, store: &mut MeshStore, parent: NodeId) -> NodeId {
        let ids: Vec<MeshId> = self.meshes.into_iter().map(|m| store.insert(m)).collect();
        attach(&self.root, graph, parent, &ids)
    }
}

fn attach(model: &ModelNode, graph: &mut SceneGraph, parent: NodeId, meshes: &[MeshId]) -> NodeId {
    let mut node = Node::new(model.name.clone()).with_transform(
        model.translation,
        model.rotation,
        model.scale,
    );
    node.mesh = model.mesh.and_then(|i| meshes.get(i).copied());

    let id = graph.add(parent, node);
    for child in &model.children {
        attach(child, graph, id, meshes);
    }
    id
}
