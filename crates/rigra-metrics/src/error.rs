//! Error types for metric computation.

use rigra_data::DataError;
use rigra_data::schema::UnknownVariant;
use thiserror::Error;

/// Result type for metric operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors raised while computing metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Expected exactly one row (or a non-empty input) and found none
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Expected exactly one row and found several
    #[error("Ambiguous data: {0}")]
    AmbiguousData(String),

    /// A percentage denominator is zero
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// Unrecognised selector or out-of-bounds filter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Table construction error
    #[error(transparent)]
    Data(#[from] DataError),
}

impl From<UnknownVariant> for MetricsError {
    fn from(err: UnknownVariant) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}
