//! Random forest regressor for wait-time estimation
//!
//! Wraps smartcore's `RandomForestRegressor` behind [`WaitModel`] so the rest
//! of the crate only deals in [`FeatureVector`]s and seconds.

use crate::error::{PredictorError, Result};
use crate::models::{FeatureVector, TrainingSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::debug;

/// Number of trees in the forest
pub const DEFAULT_N_TREES: usize = 50;

/// Seed shared by the train/test split and the forest
pub const DEFAULT_SEED: u64 = 42;

type Forest = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Anything that maps a feature vector to estimated wait seconds
pub trait Regressor {
    fn predict_seconds(&self, features: &FeatureVector) -> Result<f64>;
}

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            seed: DEFAULT_SEED,
        }
    }
}

/// Fitted wait-time model, the unit persisted by the model store
#[derive(Debug, Serialize, Deserialize)]
pub struct WaitModel {
    forest: Forest,
    params: ForestParams,
    trained_rows: usize,
    trained_at: DateTime<Utc>,
}

impl WaitModel {
    /// Fit a forest on the given training partition
    pub fn fit(set: &TrainingSet, params: ForestParams) -> Result<Self> {
        if set.is_empty() {
            return Err(PredictorError::ModelFit("empty training partition".to_string()));
        }
        if params.n_trees == 0 {
            return Err(PredictorError::ModelFit("n_trees must be at least 1".to_string()));
        }
        let x = to_matrix(&set.features);
        // Every feature is a split candidate, as with a plain bagged forest
        let forest_params = RandomForestRegressorParameters::default()
            .with_n_trees(params.n_trees)
            .with_m(FeatureVector::LEN)
            .with_seed(params.seed);

        let forest = Forest::fit(&x, &set.targets, forest_params)
            .map_err(|e| PredictorError::ModelFit(e.to_string()))?;

        debug!(rows = set.len(), n_trees = params.n_trees, "Forest fitted");
        Ok(Self {
            forest,
            params,
            trained_rows: set.len(),
            trained_at: Utc::now(),
        })
    }

    /// Estimate seconds for several rows at once
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<f64>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }
        self.forest
            .predict(&to_matrix(features))
            .map_err(|e| PredictorError::ModelFit(e.to_string()))
    }

    pub fn params(&self) -> ForestParams {
        self.params
    }

    pub fn trained_rows(&self) -> usize {
        self.trained_rows
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }
}

impl Regressor for WaitModel {
    fn predict_seconds(&self, features: &FeatureVector) -> Result<f64> {
        self.predict_batch(std::slice::from_ref(features))?
            .first()
            .copied()
            .ok_or_else(|| PredictorError::ModelFit("model returned no prediction".to_string()))
    }
}

fn to_matrix(features: &[FeatureVector]) -> DenseMatrix<f64> {
    let rows: Vec<Vec<f64>> = features.iter().map(FeatureVector::to_row).collect();
    DenseMatrix::from_2d_vec(&rows)
}

/// Mean absolute error between observed and predicted values
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum();
    total / actual.len() as f64
}
