//! Core data models for the wait-time predictor

use std::path::PathBuf;

/// One row of the served-patients history, fields kept as raw text
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalRecord {
    pub arrival: Option<String>,
    pub age: Option<String>,
    pub severity: Option<String>,
    /// Observed wait; missing or unparseable values are stored as 0
    pub wait_seconds: f64,
}

impl HistoricalRecord {
    /// Only records with a strictly positive wait are used for training
    pub fn is_usable(&self) -> bool {
        self.wait_seconds > 0.0
    }
}

/// Feature vector for the regressor, in model column order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub severity: i64,
    pub age: f64,
    pub hour_of_day: u32,
}

impl FeatureVector {
    /// Number of features fed to the model
    pub const LEN: usize = 3;

    /// Row representation expected by the regressor
    pub fn to_row(&self) -> Vec<f64> {
        vec![self.severity as f64, self.age, self.hour_of_day as f64]
    }
}

/// Derived features paired with observed waits
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<f64>,
}

impl TrainingSet {
    pub fn push(&mut self, features: FeatureVector, target_seconds: f64) {
        self.features.push(features);
        self.targets.push(target_seconds);
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Split into (train, test) by row index
    pub fn partition(&self, train_idx: &[usize], test_idx: &[usize]) -> (TrainingSet, TrainingSet) {
        let pick = |idx: &[usize]| TrainingSet {
            features: idx.iter().map(|&i| self.features[i]).collect(),
            targets: idx.iter().map(|&i| self.targets[i]).collect(),
        };
        (pick(train_idx), pick(test_idx))
    }
}

/// A single new case to estimate
#[derive(Debug, Clone, PartialEq)]
pub struct CaseInput {
    /// 0 = normal, 1 = serious, 2 = critical by convention
    pub severity: i64,
    pub age: f64,
    pub arrival: Option<String>,
}

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub artifact_path: PathBuf,
    pub mae_seconds: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl TrainingReport {
    pub fn mae_minutes(&self) -> f64 {
        self.mae_seconds / 60.0
    }
}

/// Point estimate of wait time for one case
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitEstimate {
    /// Rounded to the nearest minute, never negative
    pub minutes: u64,
    /// Raw estimate truncated toward zero
    pub seconds: i64,
    pub raw_seconds: f64,
}
