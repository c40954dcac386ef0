//! Rounding helpers shared by the metric modules.

use crate::error::{MetricsError, Result};

/// `part / whole` as a whole percentage, rounded half away from zero.
///
/// # Errors
/// Returns `MetricsError::DivisionByZero` when `whole` is zero.
pub fn percent(part: f64, whole: f64, what: &str) -> Result<i64> {
    if whole == 0.0 {
        return Err(MetricsError::DivisionByZero(format!(
            "{} has no rows to take a percentage of",
            what
        )));
    }
    Ok((100.0 * part / whole).round() as i64)
}

/// Round to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
