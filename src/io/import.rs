//! Strict CSV loader for metered production/consumption data.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::info;

use crate::series::{InputSeries, Interval, SeriesError};

pub const TIMESTAMP_COLUMN: &str = "Date/Time";
pub const PRODUCED_COLUMN: &str = "Energy Produced (Wh)";
pub const CONSUMED_COLUMN: &str = "Energy Consumed (Wh)";

/// Timestamp layouts accepted in the `Date/Time` column, tried in order.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%m-%Y %H:%M",
];

/// Hard failures while loading input data.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot open \"{}\": {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column \"{0}\"")]
    MissingColumn(&'static str),
    #[error("row {row}: unparseable timestamp \"{value}\"")]
    Timestamp { row: usize, value: String },
    #[error("row {row}: unparseable number \"{value}\" in \"{column}\"")]
    Number {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error(transparent)]
    Series(#[from] SeriesError),
}

/// Parses a timestamp in any of the accepted layouts.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn column_index(headers: &csv::StringRecord, name: &'static str) -> Result<usize, InputError> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or(InputError::MissingColumn(name))
}

fn parse_number(
    record: &csv::StringRecord,
    idx: usize,
    row: usize,
    column: &'static str,
) -> Result<f64, InputError> {
    let raw = record.get(idx).unwrap_or("").trim();
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::Number {
            row,
            column,
            value: raw.to_string(),
        })
}

/// Reads a series from CSV text. Extra columns are ignored.
///
/// # Errors
///
/// Returns an [`InputError`] for a missing column, an unparseable cell, a
/// negative energy or a timestamp that does not strictly increase.
pub fn read_series(reader: impl Read) -> Result<InputSeries, InputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let ts_idx = column_index(&headers, TIMESTAMP_COLUMN)?;
    let prod_idx = column_index(&headers, PRODUCED_COLUMN)?;
    let cons_idx = column_index(&headers, CONSUMED_COLUMN)?;

    let mut intervals = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let raw_ts = record.get(ts_idx).unwrap_or("");
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| InputError::Timestamp {
            row,
            value: raw_ts.to_string(),
        })?;
        let produced = parse_number(&record, prod_idx, row, PRODUCED_COLUMN)?;
        let consumed = parse_number(&record, cons_idx, row, CONSUMED_COLUMN)?;
        intervals.push(Interval::new(timestamp, produced, consumed));
    }

    Ok(InputSeries::new(intervals)?)
}

/// Reads a series from a CSV file.
///
/// # Errors
///
/// See [`read_series`]; also fails if the file cannot be opened.
pub fn read_series_file(path: &Path) -> Result<InputSeries, InputError> {
    let file = File::open(path).map_err(|source| InputError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_series(io::BufReader::new(file))?;
    info!(path = %path.display(), rows = series.len(), "loaded input series");
    Ok(series)
}
