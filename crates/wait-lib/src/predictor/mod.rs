//! Single-case wait-time prediction

mod inference;
mod output;

pub use inference::WaitPredictor;
pub use output::{parse_marker_line, OutputFormatter, PREDICT_MARKER};
