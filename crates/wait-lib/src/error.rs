//! Error taxonomy for training and prediction
//!
//! Structural problems (missing columns, missing artifact, too little data)
//! surface here. Messy values inside a single record never do: the feature
//! deriver substitutes defaults for those.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, PredictorError>;

/// Errors raised by the wait-time pipeline
#[derive(Error, Debug)]
pub enum PredictorError {
    /// No dataset at any of the searched locations
    #[error("Dataset not found (searched: {})", format_paths(.searched))]
    DatasetNotFound { searched: Vec<PathBuf> },

    /// IO error
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed delimited input
    #[error("Failed to read dataset {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the dataset header
    #[error("Dataset is missing required column '{column}' (available: {available:?})")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Too few records with a positive wait to fit anything meaningful
    #[error("Not enough data to train: {usable} usable rows, need at least {required}")]
    InsufficientData { usable: usize, required: usize },

    /// Prediction requested before any model was trained
    #[error("Model not found at {0}")]
    ModelNotFound(PathBuf),

    /// Artifact exists but could not be read or decoded
    #[error("Failed to load model from {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    /// Artifact could not be encoded or written
    #[error("Failed to save model to {path}: {message}")]
    ModelSave { path: PathBuf, message: String },

    /// Regressor fitting or inference failed
    #[error("Model fitting failed: {0}")]
    ModelFit(String),

    /// Age is mandatory for a single case
    #[error("Age is required for prediction")]
    MissingAge,
}

impl PredictorError {
    /// Whether the caller can recover by running `train` first
    pub fn is_model_missing(&self) -> bool {
        matches!(self, Self::ModelNotFound(_))
    }
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
