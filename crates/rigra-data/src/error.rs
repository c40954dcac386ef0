//! Error types for data operations.

use crate::schema::SheetKind;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while fetching, parsing or caching survey sheets.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP error (non-success status from the sheet host)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// CSV decoding error
    #[error("CSV error in {sheet} sheet: {source}")]
    Csv {
        /// Sheet being decoded
        sheet: SheetKind,
        /// Underlying CSV error
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from a sheet
    #[error("Missing column '{column}' in {sheet} sheet")]
    MissingColumn {
        /// Sheet that was validated
        sheet: SheetKind,
        /// Name of the absent column
        column: String,
    },

    /// A cell violates the table contract
    #[error("Invalid value in {sheet} sheet at row {row}: {reason}")]
    InvalidValue {
        /// Sheet that was validated
        sheet: SheetKind,
        /// Zero-based data row index
        row: usize,
        /// What was wrong with the value
        reason: String,
    },

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No URL or file configured for a sheet
    #[error("No source configured for {0} sheet")]
    SheetNotConfigured(SheetKind),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for DataError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
