//! Error types for calscan.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while loading or expanding a calendar.
#[derive(Error, Debug)]
pub enum CalScanError {
    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Could not expand recurrence of '{event}': {message}")]
    Expansion { event: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date range: {start} must be before {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Result type alias for calscan operations.
pub type CalScanResult<T> = Result<T, CalScanError>;
