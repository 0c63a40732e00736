//! `predict` command

use anyhow::Result;
use wait_lib::{CaseInput, ModelStore, StructuredLogger, WaitPredictor};

/// Predict the wait for one case and print both output lines
///
/// The second line is the machine-readable `PREDICT_SEC:<seconds>` contract.
pub fn predict(store: &ModelStore, case: CaseInput, logger: &StructuredLogger) -> Result<()> {
    let predictor = WaitPredictor::from_store(store)?;
    let estimate = predictor.predict(&case)?;
    logger.log_prediction(&case, &estimate);

    let formatter = predictor.formatter();
    println!("{}", formatter.summary_line(&estimate));
    println!("{}", formatter.marker_line(&estimate));
    Ok(())
}
