//! Wait-time inference for a single case

use super::output::OutputFormatter;
use crate::error::Result;
use crate::features::FeatureDeriver;
use crate::model::{Regressor, WaitModel};
use crate::models::{CaseInput, WaitEstimate};
use crate::store::ModelStore;
use tracing::debug;

/// Predicts the wait for one new case with a loaded model
pub struct WaitPredictor<R = WaitModel> {
    model: R,
    deriver: FeatureDeriver,
    output_formatter: OutputFormatter,
}

impl WaitPredictor<WaitModel> {
    /// Load the model from the store
    ///
    /// Fails with `ModelNotFound` when nothing has been trained yet.
    pub fn from_store(store: &ModelStore) -> Result<Self> {
        Ok(Self::with_model(store.load()?))
    }
}

impl<R: Regressor> WaitPredictor<R> {
    pub fn with_model(model: R) -> Self {
        Self {
            model,
            deriver: FeatureDeriver::for_prediction(),
            output_formatter: OutputFormatter::new(),
        }
    }

    /// Estimate the wait for `case`
    pub fn predict(&self, case: &CaseInput) -> Result<WaitEstimate> {
        let features = self
            .deriver
            .derive_case(case.severity, Some(case.age), case.arrival.as_deref())?;
        let raw_seconds = self.model.predict_seconds(&features)?;
        debug!(?features, raw_seconds, "Wait estimated");
        Ok(self.output_formatter.estimate(raw_seconds))
    }

    pub fn formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictorError;
    use crate::models::FeatureVector;
    use tempfile::TempDir;

    /// Regressor returning a fixed value
    struct Constant(f64);

    impl Regressor for Constant {
        fn predict_seconds(&self, _features: &FeatureVector) -> Result<f64> {
            Ok(self.0)
        }
    }

    /// Regressor echoing the hour feature, to observe derivation
    struct EchoHour;

    impl Regressor for EchoHour {
        fn predict_seconds(&self, features: &FeatureVector) -> Result<f64> {
            Ok(features.hour_of_day as f64 * 60.0)
        }
    }

    fn case(arrival: Option<&str>) -> CaseInput {
        CaseInput {
            severity: 1,
            age: 40.0,
            arrival: arrival.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_model() {
        let dir = TempDir::new().unwrap();
        let err = WaitPredictor::from_store(&ModelStore::in_dir(dir.path()))
            .err()
            .unwrap();
        assert!(matches!(err, PredictorError::ModelNotFound(_)));
    }

    #[test]
    fn test_negative_prediction_never_yields_negative_minutes() {
        let predictor = WaitPredictor::with_model(Constant(-600.0));
        let estimate = predictor.predict(&case(None)).unwrap();
        assert_eq!(estimate.minutes, 0);
        assert_eq!(estimate.seconds, -600);
    }

    #[test]
    fn test_arrival_hour_reaches_model() {
        let predictor = WaitPredictor::with_model(EchoHour);
        let estimate = predictor.predict(&case(Some("2024-03-01T15:40:00"))).unwrap();
        assert_eq!(estimate.seconds, 900);
    }

    #[test]
    fn test_missing_and_unparseable_arrival_use_hour_zero() {
        let predictor = WaitPredictor::with_model(EchoHour);
        let none = predictor.predict(&case(None)).unwrap();
        let garbage = predictor.predict(&case(Some("not a time"))).unwrap();
        let midnight = predictor.predict(&case(Some("2024-03-01 00:05:00"))).unwrap();
        assert_eq!(none, midnight);
        assert_eq!(garbage, midnight);
    }

    #[test]
    fn test_non_finite_age_is_rejected() {
        let predictor = WaitPredictor::with_model(Constant(60.0));
        let mut input = case(None);
        input.age = f64::NAN;
        assert!(matches!(
            predictor.predict(&input),
            Err(PredictorError::MissingAge)
        ));
    }
}
