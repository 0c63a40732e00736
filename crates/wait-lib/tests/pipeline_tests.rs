//! End-to-end tests for training and prediction through the public API

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wait_lib::{
    CaseInput, ModelStore, PredictorError, Trainer, TrainerConfig, WaitPredictor, PREDICT_MARKER,
};

const HEADER: &str = "ID,Phone,Name,Age,Severity,Arrival,Served At,Wait(sec),Problem";

/// Helper to write a served history in the queue application's layout
fn write_served(dir: &TempDir, rows: &[(i64, &str, &str, &str)]) -> PathBuf {
    let mut text = format!("# served patients\n{HEADER}\n");
    for (i, (severity, age, arrival, wait)) in rows.iter().enumerate() {
        text.push_str(&format!(
            "{id},555000{id},Patient {id},{age},{severity},{arrival},2024-03-01 23:00:00,{wait},checkup\n",
            id = i + 1
        ));
    }
    let path = dir.path().join("served.csv");
    fs::write(&path, text).unwrap();
    path
}

fn scenario_rows() -> Vec<(i64, &'static str, &'static str, &'static str)> {
    vec![
        (0, "30", "2024-03-01 08:00:00", "60"),
        (1, "40", "2024-03-01 09:00:00", "120"),
        (2, "50", "2024-03-01 10:00:00", "300"),
        (0, "30", "2024-03-01 11:00:00", "70"),
        (1, "40", "2024-03-01 12:00:00", "130"),
        (2, "50", "2024-03-01 13:00:00", "310"),
    ]
}

fn trainer_in(dir: &Path) -> Trainer {
    Trainer::new(TrainerConfig::default(), ModelStore::new(dir.join("model").join("wait_model.bin")))
}

#[test]
fn test_train_then_predict() {
    let data_dir = TempDir::new().unwrap();
    let dataset = write_served(&data_dir, &scenario_rows());
    let trainer = trainer_in(data_dir.path());

    let report = trainer.train(&dataset).unwrap();
    assert!(report.artifact_path.is_file());
    assert!(report.mae_seconds.is_finite() && report.mae_seconds >= 0.0);
    assert_eq!(report.train_rows + report.test_rows, 6);
    assert!((report.mae_minutes() - report.mae_seconds / 60.0).abs() < 1e-12);

    let predictor = WaitPredictor::from_store(trainer.store()).unwrap();
    let estimate = predictor
        .predict(&CaseInput {
            severity: 1,
            age: 40.0,
            arrival: Some("2024-03-01 09:00:00".to_string()),
        })
        .unwrap();

    // Severity 1, age 40 at 09:00 matches the 120 s and 130 s cases
    assert!(
        (100..=150).contains(&estimate.seconds),
        "estimate {} sec outside observed range",
        estimate.seconds
    );
    assert!((2..=3).contains(&estimate.minutes));

    let marker = predictor.formatter().marker_line(&estimate);
    assert_eq!(marker, format!("{PREDICT_MARKER}{}", estimate.seconds));
}

#[test]
fn test_training_is_deterministic() {
    let data_dir = TempDir::new().unwrap();
    let dataset = write_served(&data_dir, &scenario_rows());
    let trainer = trainer_in(data_dir.path());

    let first = trainer.train(&dataset).unwrap();
    let second = trainer.train(&dataset).unwrap();
    assert_eq!(first.mae_seconds, second.mae_seconds);
}

#[test]
fn test_non_positive_waits_do_not_count_towards_minimum() {
    let data_dir = TempDir::new().unwrap();
    let dataset = write_served(
        &data_dir,
        &[
            (0, "30", "2024-03-01 08:00:00", "60"),
            (1, "40", "2024-03-01 09:00:00", "120"),
            (2, "50", "2024-03-01 10:00:00", "300"),
            (0, "30", "2024-03-01 11:00:00", "70"),
            (1, "40", "2024-03-01 12:00:00", "0"),
            (2, "50", "2024-03-01 13:00:00", "-5"),
            (2, "50", "2024-03-01 14:00:00", "unknown"),
        ],
    );
    let trainer = trainer_in(data_dir.path());

    match trainer.train(&dataset).unwrap_err() {
        PredictorError::InsufficientData { usable, required } => {
            assert_eq!((usable, required), (4, 5));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!trainer.store().exists());
}

#[test]
fn test_messy_rows_still_train() {
    let data_dir = TempDir::new().unwrap();
    let dataset = write_served(
        &data_dir,
        &[
            (0, "", "2024-03-01 08:00:00", "60"),
            (1, "forty", "not a date", "120"),
            (2, "50", "", "300"),
            (0, "30", "2024-03-01T11:00:00", "70"),
            (1, "40", "2024-03-01", "130"),
        ],
    );
    let report = trainer_in(data_dir.path()).train(&dataset).unwrap();
    assert_eq!(report.train_rows + report.test_rows, 5);
}

#[test]
fn test_missing_required_column_writes_nothing() {
    let data_dir = TempDir::new().unwrap();
    let dataset = data_dir.path().join("served.csv");
    fs::write(&dataset, "Age,Arrival,Wait(sec)\n30,2024-03-01 08:00:00,60\n").unwrap();
    let trainer = trainer_in(data_dir.path());

    let err = trainer.train(&dataset).unwrap_err();
    assert!(matches!(err, PredictorError::MissingColumn { .. }));
    assert!(!trainer.store().exists());
}

#[test]
fn test_predict_before_train() {
    let dir = TempDir::new().unwrap();
    let store = ModelStore::in_dir(dir.path());
    let err = WaitPredictor::from_store(&store).err().unwrap();
    assert!(err.is_model_missing());
}
