//! Served-history dataset loading
//!
//! Reads the delimited history file written by the queue application.
//! Comment lines (`#`) and blank lines are skipped, header names are matched
//! after trimming. `Arrival` and `Severity` are required; the wait column is
//! located through [`WAIT_COLUMN_STRATEGIES`].

use crate::error::{PredictorError, Result};
use crate::features::parse_number;
use crate::models::HistoricalRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const ARRIVAL_COLUMN: &str = "Arrival";
pub const SEVERITY_COLUMN: &str = "Severity";
pub const AGE_COLUMN: &str = "Age";

/// Default dataset file name
pub const DATASET_FILE_NAME: &str = "served.csv";

/// Position of the wait column in the layout written by the queue application
const WAIT_COLUMN_INDEX: usize = 7;

/// One way of locating the wait-duration column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitColumnStrategy {
    /// Exact header name
    Alias(&'static str),
    /// Last resort: column 7 when present, otherwise second-to-last
    Positional,
}

/// Strategies tried in order until one resolves
pub const WAIT_COLUMN_STRATEGIES: &[WaitColumnStrategy] = &[
    WaitColumnStrategy::Alias("Wait(sec)"),
    WaitColumnStrategy::Alias("Wait_sec"),
    WaitColumnStrategy::Alias("wait_sec"),
    WaitColumnStrategy::Positional,
];

impl WaitColumnStrategy {
    pub fn resolve(&self, headers: &[String]) -> Option<usize> {
        match self {
            Self::Alias(name) => headers.iter().position(|h| h == name),
            Self::Positional if headers.len() > WAIT_COLUMN_INDEX => Some(WAIT_COLUMN_INDEX),
            Self::Positional => headers.len().checked_sub(2),
        }
    }
}

/// Column indices resolved from the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub arrival: usize,
    pub severity: usize,
    pub age: Option<usize>,
    pub wait: usize,
}

impl ColumnMap {
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let required = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| PredictorError::MissingColumn {
                    column: name.to_string(),
                    available: headers.to_vec(),
                })
        };
        let arrival = required(ARRIVAL_COLUMN)?;
        let severity = required(SEVERITY_COLUMN)?;
        let age = headers.iter().position(|h| h == AGE_COLUMN);
        if age.is_none() {
            warn!("Dataset has no '{}' column, every age will use the batch median", AGE_COLUMN);
        }

        let (strategy, wait) = WAIT_COLUMN_STRATEGIES
            .iter()
            .find_map(|s| s.resolve(headers).map(|idx| (*s, idx)))
            .ok_or_else(|| PredictorError::MissingColumn {
                column: "Wait(sec)".to_string(),
                available: headers.to_vec(),
            })?;

        if strategy == WaitColumnStrategy::Positional {
            warn!(
                column = %headers[wait],
                index = wait,
                "No known wait column alias found, falling back to positional column"
            );
        } else {
            debug!(column = %headers[wait], "Resolved wait column");
        }

        Ok(Self {
            arrival,
            severity,
            age,
            wait,
        })
    }

    fn extract(&self, row: &StringRecord) -> HistoricalRecord {
        let cell = |idx: usize| {
            row.get(idx)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        HistoricalRecord {
            arrival: cell(self.arrival),
            age: self.age.and_then(cell),
            severity: cell(self.severity),
            wait_seconds: cell(self.wait)
                .as_deref()
                .and_then(parse_number)
                .unwrap_or(0.0),
        }
    }
}

/// Load every record of the dataset at `path`
pub fn load_records(path: &Path) -> Result<Vec<HistoricalRecord>> {
    if !path.is_file() {
        return Err(PredictorError::DatasetNotFound {
            searched: vec![path.to_path_buf()],
        });
    }
    let file = File::open(path).map_err(|source| PredictorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = read_records(file, path)?;
    info!(path = %path.display(), records = records.len(), "Loaded served history");
    Ok(records)
}

/// Parse records from any reader; `path` is only used in error messages
pub fn read_records<R: Read>(reader: R, path: &Path) -> Result<Vec<HistoricalRecord>> {
    let csv_err = |source| PredictorError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let columns = ColumnMap::resolve(&headers)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        records.push(columns.extract(&row));
    }
    Ok(records)
}

/// Conventional dataset locations, in search order
pub fn default_candidates(cwd: &Path, exe_dir: &Path) -> Vec<PathBuf> {
    vec![
        cwd.join("data").join(DATASET_FILE_NAME),
        exe_dir.join("..").join("..").join("data").join(DATASET_FILE_NAME),
        exe_dir.join("..").join("data").join(DATASET_FILE_NAME),
        exe_dir.join("data").join(DATASET_FILE_NAME),
    ]
}

/// First candidate that exists as a file
pub fn discover(candidates: &[PathBuf]) -> Result<PathBuf> {
    candidates
        .iter()
        .find(|p| p.is_file())
        .map(|p| normalize(p))
        .ok_or_else(|| PredictorError::DatasetNotFound {
            searched: candidates.to_vec(),
        })
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SERVED_HEADER: &str = "ID,Phone,Name,Age,Severity,Arrival,Served At,Wait(sec),Problem";

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn read(text: &str) -> Result<Vec<HistoricalRecord>> {
        read_records(text.as_bytes(), Path::new("served.csv"))
    }

    #[test]
    fn test_reads_served_layout() {
        let text = format!(
            "{SERVED_HEADER}\n1,5551234,Ann,34,2,2024-03-01 08:10:00,2024-03-01 08:15:00,300,Chest pain\n"
        );
        let records = read(&text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].age.as_deref(), Some("34"));
        assert_eq!(records[0].severity.as_deref(), Some("2"));
        assert_eq!(records[0].arrival.as_deref(), Some("2024-03-01 08:10:00"));
        assert_eq!(records[0].wait_seconds, 300.0);
    }

    #[test]
    fn test_skips_comments_and_blank_lines() {
        let text = format!(
            "# exported by queue\n{SERVED_HEADER}\n\n1,1,A,30,0,2024-03-01 08:00:00,x,60,p\n# note\n\n2,2,B,40,1,2024-03-01 09:00:00,x,120,p\n"
        );
        let records = read(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].wait_seconds, 120.0);
    }

    #[test]
    fn test_headers_are_trimmed() {
        let text = " Age , Severity ,Arrival , Wait_sec \n30,1,2024-03-01 10:00:00,90\n";
        let records = read(text).unwrap();
        assert_eq!(records[0].wait_seconds, 90.0);
        assert_eq!(records[0].severity.as_deref(), Some("1"));
    }

    #[test]
    fn test_missing_required_column() {
        let err = read("Age,Arrival,Wait(sec)\n30,2024-03-01 10:00:00,90\n").unwrap_err();
        match err {
            PredictorError::MissingColumn { column, .. } => assert_eq!(column, SEVERITY_COLUMN),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unparseable_wait_becomes_zero() {
        let text = "Severity,Arrival,Wait(sec)\n1,2024-03-01 10:00:00,soon\n1,2024-03-01 10:00:00,\n";
        let records = read(text).unwrap();
        assert!(records.iter().all(|r| r.wait_seconds == 0.0));
        assert!(records.iter().all(|r| !r.is_usable()));
    }

    #[test]
    fn test_ragged_rows_are_tolerated() {
        let text = "Age,Severity,Arrival,Wait(sec)\n30,1\n";
        let records = read(text).unwrap();
        assert_eq!(records[0].arrival, None);
        assert_eq!(records[0].wait_seconds, 0.0);
    }

    #[test]
    fn test_alias_order() {
        let h = headers(&["wait_sec", "Severity", "Arrival", "Wait_sec"]);
        let map = ColumnMap::resolve(&h).unwrap();
        assert_eq!(map.wait, 3);
    }

    #[test]
    fn test_positional_fallback_prefers_index_seven() {
        let h = headers(&["ID", "Phone", "Name", "Age", "Severity", "Arrival", "Served At", "Waited", "Problem"]);
        assert_eq!(WaitColumnStrategy::Positional.resolve(&h), Some(7));
        assert_eq!(ColumnMap::resolve(&h).unwrap().wait, 7);
    }

    #[test]
    fn test_positional_fallback_second_to_last() {
        let h = headers(&["Severity", "Arrival", "Waited", "Problem"]);
        assert_eq!(WaitColumnStrategy::Positional.resolve(&h), Some(2));
        assert_eq!(WaitColumnStrategy::Positional.resolve(&headers(&["x"])), None);
    }

    #[test]
    fn test_load_records_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_records(&dir.path().join("served.csv")).unwrap_err();
        assert!(matches!(err, PredictorError::DatasetNotFound { .. }));
    }

    #[test]
    fn test_discover_first_existing_candidate() {
        let dir = TempDir::new().unwrap();
        let second = dir.path().join("b.csv");
        std::fs::write(&second, SERVED_HEADER).unwrap();
        let candidates = vec![dir.path().join("a.csv"), second.clone(), dir.path().join("c.csv")];
        let found = discover(&candidates).unwrap();
        assert_eq!(found, second.canonicalize().unwrap());
    }

    #[test]
    fn test_discover_reports_all_candidates() {
        let dir = TempDir::new().unwrap();
        let candidates = default_candidates(dir.path(), dir.path());
        match discover(&candidates).unwrap_err() {
            PredictorError::DatasetNotFound { searched } => assert_eq!(searched.len(), 4),
            other => panic!("unexpected error: {other}"),
        }
    }
}
