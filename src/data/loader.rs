use std::cell::OnceCell;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;

use super::category::classify;
use super::model::{Category, Dataset, Pollutant, Reading};

pub const DATE_COLUMN: &str = "date";
pub const STATION_COLUMN: &str = "station";
pub const CATEGORY_COLUMN: &str = "Air_Quality_Category";

/// Locations searched, in order, when no configuration overrides them.
pub const DEFAULT_DATA_PATHS: [&str; 2] = ["dashboard/main_data.csv", "main_data.csv"];

/// Naive timestamps; `%.f` also accepts no fraction at all.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
/// Timestamps with a numeric UTC offset. `Z` suffixes go through RFC 3339.
/// Either way the local wall-clock time is kept and the offset dropped.
const OFFSET_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const MISSING_MARKERS: [&str; 5] = ["na", "n/a", "nan", "null", "none"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("no dataset found (looked in {})", display_paths(.candidates))]
    NotFound { candidates: Vec<PathBuf> },

    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: missing required column '{column}'", .path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("{}, line {line}: '{value}' is not a valid date", .path.display())]
    InvalidDate { path: PathBuf, line: u64, value: String },

    #[error("{}, line {line}: '{value}' in column '{column}' is not a number", .path.display())]
    InvalidNumber {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Memoized source
// ---------------------------------------------------------------------------

/// Lazily loads the dataset from the first existing candidate path and keeps
/// the outcome for as long as the source lives. The file is read at most once.
#[derive(Debug)]
pub struct DatasetSource {
    candidates: Vec<PathBuf>,
    loaded: OnceCell<Result<Dataset, LoadError>>,
}

impl DatasetSource {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            loaded: OnceCell::new(),
        }
    }

    /// A source backed by one explicit file (e.g. picked in a file dialog).
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(vec![path.into()])
    }

    fn outcome(&self) -> &Result<Dataset, LoadError> {
        self.loaded.get_or_init(|| {
            let result = load_dataset(&self.candidates);
            match &result {
                Ok(ds) => log::info!(
                    "Loaded {} readings for {} stations",
                    ds.len(),
                    ds.stations().len()
                ),
                Err(e) => log::error!("Failed to load dataset: {e}"),
            }
            result
        })
    }

    /// The loaded dataset, or `None` when it is absent.
    pub fn get(&self) -> Option<&Dataset> {
        self.outcome().as_ref().ok()
    }

    /// Why the dataset is absent, if it is.
    pub fn error(&self) -> Option<&LoadError> {
        self.outcome().as_ref().err()
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// First candidate that exists on disk.
pub fn locate(candidates: &[PathBuf]) -> Option<&Path> {
    candidates.iter().map(PathBuf::as_path).find(|p| p.exists())
}

/// Locate, parse and classify. Never returns a partial dataset.
pub fn load_dataset(candidates: &[PathBuf]) -> Result<Dataset, LoadError> {
    let path = locate(candidates).ok_or_else(|| LoadError::NotFound {
        candidates: candidates.to_vec(),
    })?;
    log::info!("Reading dataset from {}", path.display());

    let mut dataset = load_csv(path)?;
    if classify(&mut dataset) {
        log::debug!("Derived {CATEGORY_COLUMN} from PM2.5");
    }
    Ok(dataset)
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    station: usize,
    pollutants: [usize; 4],
    category: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, path: &Path) -> Result<Self, LoadError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
        };

        let mut pollutants = [0; 4];
        for (slot, p) in pollutants.iter_mut().zip(Pollutant::ALL) {
            *slot = require(p.column())?;
        }

        Ok(Columns {
            date: require(DATE_COLUMN)?,
            station: require(STATION_COLUMN)?,
            pollutants,
            category: find(CATEGORY_COLUMN),
        })
    }
}

/// Parse a CSV file whose header row names the columns.
pub fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    let cols = Columns::resolve(&headers, path)?;

    let mut readings = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        readings.push(parse_record(&record, &cols, path)?);
    }

    Ok(Dataset::new(readings, cols.category.is_some()))
}

fn parse_record(record: &StringRecord, cols: &Columns, path: &Path) -> Result<Reading, LoadError> {
    let line = record.position().map_or(0, |p| p.line());
    let cell = |idx: usize| record.get(idx).unwrap_or("");

    let raw_date = cell(cols.date);
    let date = parse_date(raw_date).ok_or_else(|| LoadError::InvalidDate {
        path: path.to_path_buf(),
        line,
        value: raw_date.to_string(),
    })?;

    let mut values = [None; 4];
    for (slot, (&idx, p)) in values.iter_mut().zip(cols.pollutants.iter().zip(Pollutant::ALL)) {
        let raw = cell(idx);
        *slot = parse_number(raw).map_err(|()| LoadError::InvalidNumber {
            path: path.to_path_buf(),
            line,
            column: p.column().to_string(),
            value: raw.to_string(),
        })?;
    }
    let [pm25, pm10, so2, no2] = values;

    let category = cols.category.and_then(|idx| {
        let raw = cell(idx);
        if raw.is_empty() {
            return None;
        }
        match raw.parse::<Category>() {
            Ok(c) => Some(c),
            Err(e) => {
                log::warn!("{}, line {line}: {e}; treating as unknown", path.display());
                None
            }
        }
    });

    Ok(Reading {
        date,
        station: cell(cols.station).to_string(),
        pm25,
        pm10,
        so2,
        no2,
        category,
    })
}

/// Parse a timestamp or plain calendar date (taken as midnight).
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .or_else(|| {
                    OFFSET_DATETIME_FORMATS
                        .iter()
                        .find_map(|f| DateTime::parse_from_str(s, f).ok())
                })
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// `Ok(None)` for a missing-value marker, `Err` for other non-numeric text.
fn parse_number(s: &str) -> Result<Option<f64>, ()> {
    if s.is_empty() || MISSING_MARKERS.iter().any(|m| s.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }
    let v = s.parse::<f64>().map_err(|_| ())?;
    Ok((!v.is_nan()).then_some(v))
}
