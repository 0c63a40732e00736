//! `train` command

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::info;
use wait_lib::{dataset, ModelStore, StructuredLogger, Trainer};

use crate::config::PredictorConfig;
use crate::output::training_summary;

/// Train the model and print the artifact location and MAE
pub fn train(
    config: &PredictorConfig,
    store: ModelStore,
    dataset_override: Option<PathBuf>,
    exe_dir: &Path,
    logger: &StructuredLogger,
) -> Result<()> {
    let dataset_path = resolve_dataset(config, dataset_override, exe_dir)?;
    info!(dataset = %dataset_path.display(), "Using served history");

    let trainer = Trainer::new(config.trainer_config(), store);
    let report = trainer.train(&dataset_path)?;
    logger.log_training_completed(&dataset_path, &report);

    println!("{}", training_summary(&report));
    Ok(())
}

/// Explicit path from flag or configuration, otherwise the first conventional location
fn resolve_dataset(
    config: &PredictorConfig,
    dataset_override: Option<PathBuf>,
    exe_dir: &Path,
) -> Result<PathBuf> {
    if let Some(path) = dataset_override.or_else(|| config.dataset_path.clone()) {
        return Ok(path);
    }
    let cwd = std::env::current_dir()?;
    let candidates = dataset::default_candidates(&cwd, exe_dir);
    Ok(dataset::discover(&candidates)?)
}
