// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

use crate::config::SceneConfig;
use crate::error::ConfigError;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "petal-field")]
#[command(
    about = "Interactive foliage scene with pointer-driven growth and petal bursts",
    long_about = None
)]
pub struct Cli {
    /// glTF/GLB model to load
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Name (case-insensitive substring) of the part to scatter foliage over
    #[arg(long)]
    pub target: Option<String>,

    /// Number of foliage instances to place
    #[arg(long)]
    pub count: Option<usize>,

    /// Pointer interaction radius in world units
    #[arg(long)]
    pub radius: Option<f32>,

    /// JSON scene configuration; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fixed random seed for reproducible placement
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    pub fn scene_config(&self) -> Result<SceneConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)?,
            None => SceneConfig::default(),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut SceneConfig) {
        if let Some(model) = &self.model {
            config.model = Some(model.clone());
        }
        if let Some(target) = &self.target {
            config.target = target.clone();
        }
        if let Some(count) = self.count {
            config.instance_count = count;
        }
        if let Some(radius) = self.radius {
            config.interaction_radius = radius;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
    }
}
