//! Errors of dashboard operations.

use rigra_data::DataError;
use rigra_metrics::MetricsError;
use thiserror::Error;

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A dashboard page could not be produced.
#[derive(Debug, Error)]
pub enum Error {
    /// Loading a sheet failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// Computing a metric failed.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}
