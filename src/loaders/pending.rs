use futures::channel::{mpsc, oneshot};
use futures::{FutureExt, StreamExt};
use std::path::{Path, PathBuf};
use std::thread;

use super::gltf::load_model;
use crate::error::LoadError;
use crate::scene::LoadedModel;

type LoadResult = Result<LoadedModel, LoadError>;

/// A model load running on a background thread.
///
/// Resolves exactly once. Progress and the result are collected by polling from
/// the frame loop, so nothing here ever blocks the render thread.
#[derive(Debug)]
pub struct PendingLoad {
    path: PathBuf,
    progress: mpsc::UnboundedReceiver<f32>,
    result: oneshot::Receiver<LoadResult>,
}

impl PendingLoad {
    pub fn spawn(path: impl Into<PathBuf>) -> Result<Self, LoadError> {
        let path = path.into();
        let (progress_tx, progress) = mpsc::unbounded();
        let (result_tx, result) = oneshot::channel();

        let worker_path = path.clone();
        thread::Builder::new()
            .name("model-loader".to_string())
            .spawn(move || {
                let mut report = |percent: f32| {
                    // receiver gone means the load was abandoned; keep decoding quietly
                    let _ = progress_tx.unbounded_send(percent);
                };
                let loaded = load_model(&worker_path, &mut report);
                let _ = result_tx.send(loaded);
            })
            .map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            progress,
            result,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Progress percentages reported since the previous call
    pub fn drain_progress(&mut self) -> Vec<f32> {
        let mut drained = Vec::new();
        while let Some(Some(percent)) = self.progress.next().now_or_never() {
            drained.push(percent);
        }
        drained
    }

    /// Non-blocking check for the result. `None` while the load is still running.
    pub fn poll(&mut self) -> Option<LoadResult> {
        match (&mut self.result).now_or_never()? {
            Ok(result) => Some(result),
            Err(oneshot::Canceled) => Some(Err(LoadError::Cancelled)),
        }
    }

    /// Block the current thread until the load resolves
    pub fn wait(self) -> LoadResult {
        pollster::block_on(self.result).unwrap_or(Err(LoadError::Cancelled))
    }
}
