use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Scene setup, loadable from JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Model to load at startup
    pub model: Option<PathBuf>,
    /// Case-insensitive substring naming the part foliage is scattered over
    pub target: String,
    pub palette_a: Vec<String>,
    pub palette_b: Vec<String>,
    pub instance_count: usize,
    pub interaction_radius: f32,
    /// Uniform scale of a placed instance before jitter
    pub base_scale: f32,
    /// Petal geometry is a variant mesh scaled by this factor
    pub petal_geometry_scale: f32,
    pub fov_y_degrees: f32,
    pub seed: Option<u64>,
    pub width: u32,
    pub height: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model: None,
            target: "ground".to_string(),
            palette_a: vec!["flowera".to_string()],
            palette_b: vec!["flowerb".to_string()],
            instance_count: 300,
            interaction_radius: 2.5,
            base_scale: 0.02,
            petal_geometry_scale: 4.0,
            fov_y_degrees: 45.0,
            seed: None,
            width: 1280,
            height: 720,
        }
    }
}

impl SceneConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y_degrees.to_radians()
    }

    /// Seed for every random stream in the scene, drawn from entropy when unset
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}
