//! Output formatting utilities
//!
//! stdout carries only command results; messages for humans go to stderr.

use colored::Colorize;
use wait_lib::TrainingReport;

/// Guidance shown when `predict` runs before `train`
pub const MODEL_MISSING_HINT: &str = "Model not found. Train first: wait-predictor train";

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// One-line training summary with MAE in seconds and minutes
pub fn training_summary(report: &TrainingReport) -> String {
    format!(
        "Trained model saved to {}  MAE={:.1} sec ({:.2} min)",
        report.artifact_path.display(),
        report.mae_seconds,
        report.mae_minutes()
    )
}
