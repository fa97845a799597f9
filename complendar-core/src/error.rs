//! Error types for complendar.

use thiserror::Error;

use crate::header::ResolutionFailure;

/// Errors that end a conversion (or one of the layers around it).
///
/// Per-row problems are not errors at this level; they are collected as
/// [`SkippedRow`](crate::record::SkippedRow)s instead.
#[derive(Error, Debug)]
pub enum ComplendarError {
    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),

    #[error("No valid birthdays found ({skipped} row(s) skipped)")]
    NoValidRecords { skipped: usize },

    #[error("ICS generation error: {0}")]
    Encoding(String),

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Could not read CSV: {0}")]
    Csv(String),

    #[error("Invalid spreadsheet link: {0}")]
    InvalidSource(String),

    #[error("Access denied. Perhaps the spreadsheet is not publicly shared? ({0})")]
    AccessDenied(String),

    #[error("Download failed: {0}")]
    Fetch(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for complendar operations.
pub type ComplendarResult<T> = Result<T, ComplendarError>;
