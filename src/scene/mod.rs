mod graph;
mod mesh;
mod model;

pub use graph::{Node, NodeId, SceneGraph};
pub use mesh::{Mesh, MeshId, MeshStore};
pub use model::{LoadedModel, ModelNode};
