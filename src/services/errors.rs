use std::{io, path::PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

use super::parsers::DecimalConvention;

/// Failures that end a run. Recoverable issues (unreadable dates, a page
/// without a table) never surface here.
#[derive(Debug, Error)]
pub enum ProventosError {
    #[error("invalid ticker '{0}': expected letters and digits only")]
    InvalidTicker(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("fetch: request to {url} failed")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetch: {url} answered with HTTP {status}")]
    HttpStatus { url: String, status: StatusCode },
    #[error("extract: column {position} ({field}) should be '{expected}' but the page shows '{found}'")]
    LayoutMismatch {
        position: usize,
        field: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("extract: row {row} has {cells} cells, expected at least {expected}")]
    ShortRow {
        row: usize,
        cells: usize,
        expected: usize,
    },
    #[error("quantity coercion: row {row} has share quantity '{raw}', which is not a positive integer")]
    InvalidQuantity { row: usize, raw: String },
    #[error("per-share value: row {row} has a share quantity of zero ('{raw}')")]
    ZeroQuantity { row: usize, raw: String },
    #[error("value normalization: row {row} has gross value '{raw}', which is not a number under the {convention} convention")]
    InvalidValue {
        row: usize,
        raw: String,
        convention: DecimalConvention,
    },
    #[error("export: could not write {}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("chart: could not render '{title}'")]
    Chart {
        title: String,
        #[source]
        source: io::Error,
    },
}
