//! Configuration management for the CLI
//!
//! Layered: built-in defaults, then an optional `wait-predictor.toml` in the
//! working directory, then `WAIT_PREDICTOR_*` environment variables. Command
//! line flags are applied on top by the caller.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use wait_lib::model::{DEFAULT_N_TREES, DEFAULT_SEED};
use wait_lib::{LogFormat, ModelStore, TrainerConfig};

/// Config file name without extension
const CONFIG_FILE_STEM: &str = "wait-predictor";

/// Environment variable prefix
const ENV_PREFIX: &str = "WAIT_PREDICTOR";

/// CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PredictorConfig {
    /// Model artifact path; defaults to the executable's directory
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Served history path; searched for when unset
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,

    #[serde(default = "default_n_trees")]
    pub n_trees: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_n_trees() -> usize {
    DEFAULT_N_TREES
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            dataset_path: None,
            n_trees: default_n_trees(),
            seed: default_seed(),
            log_format: LogFormat::default(),
        }
    }
}

impl PredictorConfig {
    /// Load configuration from config file and environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE_STEM).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Model store for this invocation
    pub fn model_store(&self, exe_dir: &Path) -> ModelStore {
        match &self.model_path {
            Some(path) => ModelStore::new(path.clone()),
            None => ModelStore::in_dir(exe_dir),
        }
    }

    pub fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            n_trees: self.n_trees,
            seed: self.seed,
            ..TrainerConfig::default()
        }
    }
}

/// Directory holding the running executable
pub fn exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Could not determine executable path")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("Executable path has no parent directory")
}
