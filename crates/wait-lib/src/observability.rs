//! Logging setup and structured events
//!
//! Logs go to stderr; stdout is reserved for the command output contract.

use crate::models::{CaseInput, TrainingReport, WaitEstimate};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected text or json)")),
        }
    }
}

/// Install the global subscriber; `RUST_LOG` overrides `default_filter`
///
/// Calling this more than once keeps the first subscriber.
pub fn init_logging(format: LogFormat, default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let registry = tracing_subscriber::registry().with(filter);

    // Already initialised by an embedding application or an earlier call
    let _ = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };
}

/// Structured events for one invocation
pub struct StructuredLogger {
    invocation: &'static str,
}

impl StructuredLogger {
    pub fn new(invocation: &'static str) -> Self {
        Self { invocation }
    }

    pub fn log_startup(&self, version: &str, model_path: &Path) {
        info!(
            event = "invocation_started",
            invocation = self.invocation,
            version = %version,
            model_path = %model_path.display(),
            "Wait predictor started"
        );
    }

    pub fn log_training_completed(&self, dataset: &Path, report: &TrainingReport) {
        info!(
            event = "model_trained",
            invocation = self.invocation,
            dataset = %dataset.display(),
            artifact = %report.artifact_path.display(),
            train_rows = report.train_rows,
            test_rows = report.test_rows,
            mae_seconds = report.mae_seconds,
            "Wait model trained"
        );
    }

    pub fn log_prediction(&self, case: &CaseInput, estimate: &WaitEstimate) {
        info!(
            event = "wait_predicted",
            invocation = self.invocation,
            severity = case.severity,
            age = case.age,
            arrival = ?case.arrival,
            raw_seconds = estimate.raw_seconds,
            minutes = estimate.minutes,
            "Wait predicted"
        );
    }

    pub fn log_failure(&self, error: &dyn std::error::Error) {
        info!(
            event = "invocation_failed",
            invocation = self.invocation,
            error = %error,
            "Wait predictor failed"
        );
    }
}
