pub mod gltf;
pub mod pending;

pub use gltf::{load_model, load_model_from_slice};
pub use pending::PendingLoad;
