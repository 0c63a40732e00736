//! Prediction output post-processing and formatting
//!
//! Converts the raw regressor output into a [`WaitEstimate`] and renders the
//! two output lines. The marker line is a stable contract for scripts calling
//! the binary: it carries only the marker token and the integer seconds.

use crate::models::WaitEstimate;

/// Prefix of the machine-readable seconds line
pub const PREDICT_MARKER: &str = "PREDICT_SEC:";

/// Formats raw model output into wait estimates and display lines
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter;

impl OutputFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Build an estimate from raw seconds
    ///
    /// Minutes are rounded to the nearest whole minute and never negative,
    /// even though an unconstrained regressor can in principle return a
    /// negative value. Seconds are truncated toward zero.
    pub fn estimate(&self, raw_seconds: f64) -> WaitEstimate {
        let minutes = (raw_seconds / 60.0).round().max(0.0);
        WaitEstimate {
            minutes: minutes as u64,
            seconds: raw_seconds.trunc() as i64,
            raw_seconds,
        }
    }

    /// Human-readable estimate line
    pub fn summary_line(&self, estimate: &WaitEstimate) -> String {
        format!(
            "Predicted wait ~{} minutes ({} sec)",
            estimate.minutes, estimate.seconds
        )
    }

    /// Machine-readable line: marker immediately followed by the seconds
    pub fn marker_line(&self, estimate: &WaitEstimate) -> String {
        format!("{}{}", PREDICT_MARKER, estimate.seconds)
    }
}

/// Extract the seconds value from output produced by [`OutputFormatter::marker_line`]
pub fn parse_marker_line(line: &str) -> Option<i64> {
    line.trim_end().strip_prefix(PREDICT_MARKER)?.parse().ok()
}
