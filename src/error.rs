use std::path::PathBuf;
use thiserror::Error;

/// Failure to fetch or decode a model asset.
///
/// Surfaced through the asynchronous load result and never retried internally;
/// callers decide whether to substitute fallback geometry.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read model file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode glTF asset {path:?}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("model {path:?} contains no triangle geometry")]
    NoGeometry { path: PathBuf },

    #[error("a model load is already in progress")]
    LoadInProgress,

    #[error("scene has been disposed")]
    Disposed,

    #[error("model loader stopped before producing a result")]
    Cancelled,
}

/// Non-fatal placement outcome; the scene stays functional without instances
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementWarning {
    #[error("no part matching {name:?} found in the model")]
    TargetNotFound { name: String },

    #[error("no foliage variants matching {patterns:?} found in the model")]
    NoVariants { patterns: Vec<String> },

    #[error("no surface points could be sampled from {name:?}")]
    NoSurfacePoints { name: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
