//! Model training
//!
//! Loads the served history, derives features, holds out a seeded 20% split
//! for evaluation, fits the forest and hands it to the model store. Nothing is
//! written unless every step before persistence succeeds.

use crate::dataset;
use crate::error::{PredictorError, Result};
use crate::features::{AgeFill, FeatureDeriver};
use crate::model::{mean_absolute_error, ForestParams, WaitModel, DEFAULT_N_TREES, DEFAULT_SEED};
use crate::models::{HistoricalRecord, TrainingReport, TrainingSet};
use crate::store::ModelStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Minimum number of usable rows needed to fit a model
pub const MIN_TRAINING_ROWS: usize = 5;

/// Fraction of rows held out for evaluation
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub n_trees: usize,
    /// Seeds both the split shuffle and the forest
    pub seed: u64,
    pub test_fraction: f64,
    pub min_rows: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            seed: DEFAULT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
            min_rows: MIN_TRAINING_ROWS,
        }
    }
}

impl TrainerConfig {
    fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.n_trees,
            seed: self.seed,
        }
    }
}

/// Fits and persists the wait-time model
pub struct Trainer {
    config: TrainerConfig,
    store: ModelStore,
}

impl Trainer {
    pub fn new(config: TrainerConfig, store: ModelStore) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Train from the dataset file at `dataset_path`
    pub fn train(&self, dataset_path: &Path) -> Result<TrainingReport> {
        let records = dataset::load_records(dataset_path)?;
        self.train_on_records(&records)
    }

    /// Train from already-loaded records
    pub fn train_on_records(&self, records: &[HistoricalRecord]) -> Result<TrainingReport> {
        let start = Instant::now();

        let fraction = self.config.test_fraction;
        if !(0.0..1.0).contains(&fraction) {
            return Err(PredictorError::ModelFit(format!(
                "test_fraction must be in [0, 1), got {fraction}"
            )));
        }

        let usable = records.iter().filter(|r| r.is_usable()).count();
        debug!(
            total = records.len(),
            usable,
            discarded = records.len() - usable,
            "Filtered records without a positive wait"
        );
        if usable < self.config.min_rows {
            return Err(PredictorError::InsufficientData {
                usable,
                required: self.config.min_rows,
            });
        }

        let deriver = FeatureDeriver::new(AgeFill::batch_median(records));
        let set = deriver.derive_training_set(records)?;

        let (train, test) = split(&set, self.config.test_fraction, self.config.seed);
        let model = WaitModel::fit(&train, self.config.forest_params())?;

        let predicted = model.predict_batch(&test.features)?;
        let mae_seconds = mean_absolute_error(&test.targets, &predicted);

        let artifact_path = self.store.save(&model)?;

        info!(
            train_rows = train.len(),
            test_rows = test.len(),
            mae_seconds,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Training completed"
        );

        Ok(TrainingReport {
            artifact_path,
            mae_seconds,
            train_rows: train.len(),
            test_rows: test.len(),
        })
    }
}

/// Seeded shuffle split into (train, test)
///
/// The test partition takes `ceil(n * test_fraction)` rows, but always leaves
/// at least one row for training.
pub fn split(set: &TrainingSet, test_fraction: f64, seed: u64) -> (TrainingSet, TrainingSet) {
    let n = set.len();
    let n_test = ((n as f64 * test_fraction).ceil() as usize).min(n.saturating_sub(1));

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    set.partition(train_idx, test_idx)
}
