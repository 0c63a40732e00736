//! Feature derivation for wait-time regression
//!
//! Turns raw record fields into the fixed-order `(severity, age, hour_of_day)`
//! vector. The same deriver runs at training and prediction time; the only
//! difference between the two call sites is the [`AgeFill`] strategy.
//!
//! Messy values are not errors here. An unparseable timestamp becomes hour 0
//! and a non-numeric severity becomes 0.

use crate::error::{PredictorError, Result};
use crate::models::{FeatureVector, HistoricalRecord, TrainingSet};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

/// Date-time layouts tried in order, first successful parse wins
pub const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only layouts, hour is 0
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// How a missing age is handled
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AgeFill {
    /// Substitute a statistic computed over the batch being processed
    BatchMedian(f64),
    /// Age must be supplied; callers validate it upstream
    Required,
}

impl AgeFill {
    /// Build the batch strategy from every parseable age in `records`
    pub fn batch_median(records: &[HistoricalRecord]) -> Self {
        let ages: Vec<f64> = records
            .iter()
            .filter_map(|r| r.age.as_deref().and_then(parse_number))
            .collect();
        let fill = median(&ages).unwrap_or_else(|| {
            debug!("No valid ages in batch, filling missing ages with 0");
            0.0
        });
        AgeFill::BatchMedian(fill)
    }
}

/// Derives feature vectors from raw values
#[derive(Debug, Clone, Copy)]
pub struct FeatureDeriver {
    age_fill: AgeFill,
}

impl FeatureDeriver {
    pub fn new(age_fill: AgeFill) -> Self {
        Self { age_fill }
    }

    /// Deriver for single-case prediction; age is never defaulted
    pub fn for_prediction() -> Self {
        Self::new(AgeFill::Required)
    }

    /// Derive a feature vector from raw text values
    pub fn derive(
        &self,
        arrival: Option<&str>,
        age: Option<&str>,
        severity: Option<&str>,
    ) -> Result<FeatureVector> {
        let age = self.resolve_age(age.and_then(parse_number))?;
        Ok(FeatureVector {
            severity: severity.map(parse_severity).unwrap_or(0),
            age,
            hour_of_day: arrival.map(extract_hour).unwrap_or(0),
        })
    }

    /// Derive from already-typed values, as supplied on the command line
    pub fn derive_case(&self, severity: i64, age: Option<f64>, arrival: Option<&str>) -> Result<FeatureVector> {
        let age = self.resolve_age(age.filter(|a| a.is_finite()))?;
        Ok(FeatureVector {
            severity,
            age,
            hour_of_day: arrival.map(extract_hour).unwrap_or(0),
        })
    }

    /// Derive training pairs from usable records
    pub fn derive_training_set(&self, records: &[HistoricalRecord]) -> Result<TrainingSet> {
        let mut set = TrainingSet::default();
        for record in records.iter().filter(|r| r.is_usable()) {
            let features = self.derive(
                record.arrival.as_deref(),
                record.age.as_deref(),
                record.severity.as_deref(),
            )?;
            set.push(features, record.wait_seconds);
        }
        Ok(set)
    }

    fn resolve_age(&self, age: Option<f64>) -> Result<f64> {
        match (age, self.age_fill) {
            (Some(age), _) => Ok(age),
            (None, AgeFill::BatchMedian(fill)) => Ok(fill),
            (None, AgeFill::Required) => Err(PredictorError::MissingAge),
        }
    }
}

/// Hour of day from a timestamp string, 0 when it cannot be parsed
pub fn extract_hour(raw: &str) -> u32 {
    parse_timestamp(raw).map(|dt| dt.hour()).unwrap_or(0)
}

/// Parse a timestamp using the known layouts
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        // Wall-clock hour as written, offset ignored
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Lenient numeric parse, `None` for blanks, garbage and non-finite values
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Severity code; fractional values truncate, anything else is 0
pub fn parse_severity(raw: &str) -> i64 {
    let raw = raw.trim();
    raw.parse::<i64>()
        .ok()
        .or_else(|| parse_number(raw).map(|v| v.trunc() as i64))
        .unwrap_or(0)
}

/// Median of the finite values, `None` when there are none
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
