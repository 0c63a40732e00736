//! Model artifact persistence
//!
//! A single model slot backed by one file. Saving writes a temp file next to
//! the artifact and renames it into place, so a concurrent reader sees either
//! the previous model or the new one.

use crate::error::{PredictorError, Result};
use crate::model::WaitModel;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default artifact file name
pub const MODEL_FILE_NAME: &str = "wait_model.bin";

/// Single-slot store for the fitted model
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted at `dir` with the default file name
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(MODEL_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Persist the model, replacing any previous artifact
    pub fn save(&self, model: &WaitModel) -> Result<PathBuf> {
        let save_err = |message: String| PredictorError::ModelSave {
            path: self.path.clone(),
            message,
        };

        let bytes = bincode::serialize(model).map_err(|e| save_err(format!("serialization failed: {e}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| save_err(format!("failed to create {}: {e}", parent.display())))?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path)
            .map_err(|e| save_err(format!("failed to create {}: {e}", temp_path.display())))?;
        file.write_all(&bytes)
            .and_then(|_| file.sync_all())
            .map_err(|e| save_err(format!("failed to write model bytes: {e}")))?;

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(save_err(format!("failed to move model into place: {e}")));
        }

        info!(path = %self.path.display(), size = bytes.len(), "Model saved");
        Ok(self.path.clone())
    }

    /// Load the persisted model
    pub fn load(&self) -> Result<WaitModel> {
        if !self.exists() {
            return Err(PredictorError::ModelNotFound(self.path.clone()));
        }
        let load_err = |message: String| PredictorError::ModelLoad {
            path: self.path.clone(),
            message,
        };

        let bytes = fs::read(&self.path).map_err(|e| load_err(format!("read failed: {e}")))?;
        let model: WaitModel =
            bincode::deserialize(&bytes).map_err(|e| load_err(format!("deserialization failed: {e}")))?;

        debug!(
            path = %self.path.display(),
            trained_rows = model.trained_rows(),
            trained_at = %model.trained_at(),
            "Model loaded"
        );
        Ok(model)
    }
}
