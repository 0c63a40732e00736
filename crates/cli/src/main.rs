//! Patient wait-time predictor CLI
//!
//! Trains a random forest on the served-patients history and estimates the
//! wait for a newly arriving patient.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use wait_lib::observability::DEFAULT_LOG_FILTER;
use wait_lib::{init_logging, CaseInput, LogFormat, PredictorError, StructuredLogger};

use crate::config::PredictorConfig;
use crate::output::{print_error, MODEL_MISSING_HINT};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code when `predict` runs before any model was trained
const EXIT_MODEL_MISSING: u8 = 2;

/// ML-based patient wait time predictor
#[derive(Parser)]
#[command(name = "wait-predictor")]
#[command(author, version, about = "ML-based patient wait time predictor", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Model artifact path (defaults to wait_model.bin next to the executable)
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    /// Diagnostic log format on stderr (text or json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the model from the served history and save it
    Train {
        /// Served history CSV (searched for under data/served.csv when omitted)
        #[arg(long)]
        dataset: Option<PathBuf>,
    },

    /// Estimate the wait for a new patient
    Predict {
        /// Severity code: 0=Normal, 1=Serious, 2=Critical
        #[arg(long, allow_negative_numbers = true)]
        severity: i64,

        /// Patient age
        #[arg(long)]
        age: f64,

        /// Arrival date-time, e.g. "2024-03-01 14:30:00"
        #[arg(long)]
        arrival: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let invocation = match cli.command {
        Commands::Train { .. } => "train",
        Commands::Predict { .. } => "predict",
    };
    let logger = StructuredLogger::new(invocation);

    match run(cli, &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            logger.log_failure(err.as_ref());
            report(&err)
        }
    }
}

fn run(cli: Cli, logger: &StructuredLogger) -> Result<()> {
    let mut config = PredictorConfig::load()?;
    if let Some(model) = cli.model {
        config.model_path = Some(model);
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    init_logging(config.log_format, DEFAULT_LOG_FILTER);

    let exe_dir = config::exe_dir()?;
    let store = config.model_store(&exe_dir);
    logger.log_startup(VERSION, store.path());

    match cli.command {
        Commands::Train { dataset } => {
            commands::train::train(&config, store, dataset, &exe_dir, logger)
                .context("Training failed")?;
        }
        Commands::Predict {
            severity,
            age,
            arrival,
        } => {
            let case = CaseInput {
                severity,
                age,
                arrival,
            };
            commands::predict::predict(&store, case, logger)?;
        }
    }

    Ok(())
}

/// Print the error for the user and choose the exit code
fn report(err: &anyhow::Error) -> ExitCode {
    let missing_model = err
        .downcast_ref::<PredictorError>()
        .is_some_and(PredictorError::is_model_missing);

    if missing_model {
        print_error(MODEL_MISSING_HINT);
        ExitCode::from(EXIT_MODEL_MISSING)
    } else {
        print_error(&format!("{err:#}"));
        ExitCode::FAILURE
    }
}
