//! Error types for feedrelay.

use thiserror::Error;

/// Common error type for feedrelay.
#[derive(Error, Debug)]
pub enum RelayError {
    /// I/O error while reading or writing the source list or the record store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record carries a date that cannot be parsed.
    ///
    /// The store file is considered corrupt; the run cannot safely continue.
    #[error("corrupt record store at line {line}: invalid date {value:?}")]
    CorruptStore { line: usize, value: String },

    /// Feed retrieval or feed parsing failed for one source.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Delivering one record to the notification sink failed.
    #[error("notify error: {0}")]
    Notify(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for user supplied values.
    #[error("validation error: {0}")]
    Validation(String),
}

impl RelayError {
    /// Whether this error compromises the integrity of the whole run.
    ///
    /// Fetch and notify errors are contained at the boundary of the source
    /// or record they belong to.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RelayError::Fetch(_) | RelayError::Notify(_))
    }
}

/// Result type alias for feedrelay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
