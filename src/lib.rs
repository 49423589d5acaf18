pub mod camera;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod host;
pub mod interaction;
pub mod loaders;
pub mod math;
pub mod particles;
pub mod placement;
pub mod render;
pub mod sampling;
pub mod scene;
pub mod traits;
pub mod types;

pub use error::{ConfigError, LoadError, PlacementWarning};
pub use host::{FrameStats, Lighting, SceneHost};
