//! Patient wait-time prediction
//!
//! This crate provides the core functionality for:
//! - Loading the served-patients history
//! - Feature derivation (severity, age, hour of arrival)
//! - Random forest training with held-out evaluation
//! - Model artifact persistence
//! - Single-case wait estimation

pub mod dataset;
pub mod error;
pub mod features;
pub mod model;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod store;
pub mod trainer;

pub use error::{PredictorError, Result};
pub use features::{AgeFill, FeatureDeriver};
pub use model::{ForestParams, Regressor, WaitModel};
pub use models::*;
pub use observability::{init_logging, LogFormat, StructuredLogger};
pub use predictor::{OutputFormatter, WaitPredictor, PREDICT_MARKER};
pub use store::{ModelStore, MODEL_FILE_NAME};
pub use trainer::{Trainer, TrainerConfig, MIN_TRAINING_ROWS};
