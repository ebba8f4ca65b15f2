// Dataset providers: resolve a division identifier to its record snapshot.
//
// The CSV layout matches the ingestion output: a header row of
// `team,player,track,score` followed by one row per (player, race). Columns
// beyond those four are ignored.

use crate::error::DatasetError;
use crate::record::{Dataset, ScoreRecord};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Source of per-division datasets.
///
/// Implementations must hand back the same snapshot for the same division for
/// the lifetime of a serving process; the query layer assumes it is immutable.
pub trait DatasetProvider: Send + Sync {
    fn load(&self, division: &str) -> Result<Arc<Dataset>, DatasetError>;
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// Identifier cells stay as strings so blank/NaN markers can be told apart
/// from real names. The score is parsed separately so a bad cell can be
/// reported with its line number instead of being skipped.
#[derive(Debug, Deserialize)]
struct RawScoreRow {
    team: String,
    player: String,
    track: String,
    score: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map an identifier cell to its stored form. Blank cells and pandas-style
/// `NaN` markers become the empty string.
fn normalize_identifier(cell: String) -> String {
    if cell.eq_ignore_ascii_case("nan") {
        String::new()
    } else {
        cell
    }
}

fn integrity_error(division: &str, line: u64, column: &str, message: String) -> DatasetError {
    DatasetError::Integrity {
        division: division.to_string(),
        line,
        column: column.to_string(),
        message,
    }
}

/// Convert a csv error into a dataset error, promoting invalid UTF-8 cells to
/// integrity errors that name the offending column.
fn csv_error(division: &str, headers: Option<&csv::StringRecord>, err: csv::Error) -> DatasetError {
    if let csv::ErrorKind::Utf8 { pos, err: utf8 } = err.kind() {
        let column = headers
            .and_then(|h| h.get(utf8.field()))
            .unwrap_or("?")
            .to_string();
        let line = pos.as_ref().map_or(0, |p| p.line());
        return DatasetError::Integrity {
            division: division.to_string(),
            line,
            column,
            message: "cell is not valid UTF-8 text".into(),
        };
    }
    DatasetError::Malformed {
        division: division.to_string(),
        source: err,
    }
}

/// Divisions become part of a file name, so only plain identifiers are
/// accepted (`1_2`, `3`, `4`).
fn is_valid_division(division: &str) -> bool {
    !division.is_empty()
        && division
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

// ---------------------------------------------------------------------------
// Reader-based loader
// ---------------------------------------------------------------------------

/// Parse a division's CSV snapshot from any reader.
///
/// Fails on the first cell that is neither text, blank, nor an integer score.
pub fn read_dataset<R: Read>(division: &str, rdr: R) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);
    let headers = reader
        .headers()
        .map_err(|e| csv_error(division, None, e))?
        .clone();

    let mut records = Vec::new();
    let mut blank_cells = 0usize;

    for result in reader.records() {
        let row = result.map_err(|e| csv_error(division, Some(&headers), e))?;
        let line = row.position().map_or(0, |p| p.line());
        let raw: RawScoreRow = row
            .deserialize(Some(&headers))
            .map_err(|e| csv_error(division, Some(&headers), e))?;

        let score = raw.score.parse::<i32>().map_err(|_| {
            integrity_error(
                division,
                line,
                "score",
                format!("expected an integer score, got '{}'", raw.score),
            )
        })?;

        let record = ScoreRecord::new(
            normalize_identifier(raw.team),
            normalize_identifier(raw.player),
            normalize_identifier(raw.track),
            score,
        );
        blank_cells += [&record.team, &record.player, &record.track]
            .iter()
            .filter(|v| v.is_empty())
            .count();
        records.push(record);
    }

    if blank_cells > 0 {
        warn!(
            "division '{}' has {} blank identifier cells; they are excluded from catalogs",
            division, blank_cells
        );
    }

    Ok(Dataset::new(division, records))
}

// ---------------------------------------------------------------------------
// CSV directory provider
// ---------------------------------------------------------------------------

/// Reads `<dir>/<file_pattern>` for each division, where `{division}` in the
/// pattern is replaced by the division identifier.
///
/// The file is read on every call. Caching belongs to whatever serves the
/// results.
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    dir: PathBuf,
    file_pattern: String,
}

impl CsvDirectoryProvider {
    pub const DEFAULT_FILE_PATTERN: &'static str = "ctc_d{division}.csv";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            file_pattern: Self::DEFAULT_FILE_PATTERN.to_string(),
        }
    }

    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot backing `division`, or `None` if the identifier
    /// cannot name a file.
    pub fn path_for(&self, division: &str) -> Option<PathBuf> {
        if !is_valid_division(division) {
            return None;
        }
        Some(self.dir.join(self.file_pattern.replace("{division}", division)))
    }
}

impl DatasetProvider for CsvDirectoryProvider {
    fn load(&self, division: &str) -> Result<Arc<Dataset>, DatasetError> {
        let Some(path) = self.path_for(division) else {
            return Err(DatasetError::NotFound {
                division: division.to_string(),
                path: None,
            });
        };

        let file = match std::fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no snapshot at {}", path.display());
                return Err(DatasetError::NotFound {
                    division: division.to_string(),
                    path: Some(path),
                });
            }
            Err(e) => return Err(DatasetError::Io { path, source: e }),
        };

        let dataset = read_dataset(division, std::io::BufReader::new(file))?;
        info!(
            "Loaded {} records for division {} from {}",
            dataset.len(),
            division,
            path.display()
        );
        Ok(Arc::new(dataset))
    }
}

// ---------------------------------------------------------------------------
// In-memory provider
// ---------------------------------------------------------------------------

/// Serves preloaded snapshots. Useful when a serving process loads every
/// division once at startup, and in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    datasets: HashMap<String, Arc<Dataset>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dataset under its own division identifier, replacing any
    /// previous snapshot for that division.
    pub fn insert(&mut self, dataset: Dataset) {
        self.datasets
            .insert(dataset.division().to_string(), Arc::new(dataset));
    }

    pub fn with_dataset(mut self, dataset: Dataset) -> Self {
        self.insert(dataset);
        self
    }

    /// Division identifiers currently held, sorted.
    pub fn divisions(&self) -> Vec<String> {
        let mut divisions: Vec<String> = self.datasets.keys().cloned().collect();
        divisions.sort();
        divisions
    }
}

impl DatasetProvider for InMemoryProvider {
    fn load(&self, division: &str) -> Result<Arc<Dataset>, DatasetError> {
        self.datasets
            .get(division)
            .cloned()
            .ok_or_else(|| DatasetError::NotFound {
                division: division.to_string(),
                path: None,
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
