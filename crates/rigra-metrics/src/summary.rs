//! Response counts from the summary sheet.
//!
//! Every card is a lookup of exactly one `(Type, Description)` row. Percentages
//! divide a resident-type count by the total number of responses and are
//! rounded independently, so they need not sum to 100.

use crate::error::{MetricsError, Result};
use crate::util::percent;
use polars::prelude::*;
use rigra_data::{SummaryTable, SummaryType, SurveyTable};
use serde::{Deserialize, Serialize};

/// Description of the total responses row.
pub const RESPONSES: &str = "Responses";
/// Description of the contactable responses row.
pub const CONTACTABLE: &str = "Contactable";
/// Resident type of leaseholders.
pub const LEASEHOLDER: &str = "Leaseholder";
/// Resident type of leaseholders who live elsewhere.
pub const NON_RESIDENT_LEASEHOLDER: &str = "Non-resident Leaseholder";
/// Resident type of tenants.
pub const TENANT: &str = "Tenant";

/// Rows of one summary type.
pub fn filter_summary(table: &SummaryTable, kind: SummaryType) -> Result<SummaryTable> {
    let df = table
        .lazy()
        .filter(col(SummaryTable::TYPE).eq(lit(kind.as_str())))
        .collect()?;
    Ok(SummaryTable::from_frame(df)?)
}

/// Rows of a summary type given by name.
///
/// # Errors
/// Returns `MetricsError::InvalidArgument` if `name` is not a summary type.
pub fn filter_summary_by_name(table: &SummaryTable, name: &str) -> Result<SummaryTable> {
    let kind: SummaryType = name.parse()?;
    filter_summary(table, kind)
}

/// `Number` of the single row matching `(kind, description)`.
///
/// # Errors
/// `MissingData` when no row matches, `AmbiguousData` when several do.
pub fn lookup_number(table: &SummaryTable, kind: SummaryType, description: &str) -> Result<i64> {
    let rows = table
        .lazy()
        .filter(
            col(SummaryTable::TYPE)
                .eq(lit(kind.as_str()))
                .and(col(SummaryTable::DESCRIPTION).eq(lit(description))),
        )
        .collect()?;

    match rows.height() {
        0 => Err(MetricsError::MissingData(format!(
            "no summary row for ({}, {})",
            kind, description
        ))),
        1 => rows
            .column(SummaryTable::NUMBER)?
            .i64()?
            .get(0)
            .ok_or_else(|| {
                MetricsError::MissingData(format!("empty Number for ({}, {})", kind, description))
            }),
        n => Err(MetricsError::AmbiguousData(format!(
            "{} summary rows for ({}, {})",
            n, kind, description
        ))),
    }
}

/// Total number of survey responses.
pub fn count_all(table: &SummaryTable) -> Result<i64> {
    lookup_number(table, SummaryType::All, RESPONSES)
}

/// Number of responses that left contact details.
pub fn count_contactable(table: &SummaryTable) -> Result<i64> {
    lookup_number(table, SummaryType::All, CONTACTABLE)
}

/// Share of all responses given by one resident type, as a whole percentage.
pub fn percent_of_responses(table: &SummaryTable, resident_type: &str) -> Result<i64> {
    let total = count_all(table)?;
    let part = lookup_number(table, SummaryType::ResidentType, resident_type)?;
    percent(part as f64, total as f64, "summary responses")
}

/// Share of responses from leaseholders.
pub fn percent_leaseholder(table: &SummaryTable) -> Result<i64> {
    percent_of_responses(table, LEASEHOLDER)
}

/// Share of responses from non-resident leaseholders.
pub fn percent_non_resident_leaseholder(table: &SummaryTable) -> Result<i64> {
    percent_of_responses(table, NON_RESIDENT_LEASEHOLDER)
}

/// Share of responses from tenants.
pub fn percent_tenant(table: &SummaryTable) -> Result<i64> {
    percent_of_responses(table, TENANT)
}

/// The five headline cards of the responses overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentOverview {
    /// All responses
    pub all: i64,
    /// Contactable responses
    pub contactable: i64,
    /// Leaseholders (%)
    pub leaseholder_pct: i64,
    /// Non-resident leaseholders (%)
    pub non_resident_leaseholder_pct: i64,
    /// Tenants (%)
    pub tenant_pct: i64,
}

/// Compute the responses overview.
pub fn resident_overview(table: &SummaryTable) -> Result<ResidentOverview> {
    Ok(ResidentOverview {
        all: count_all(table)?,
        contactable: count_contactable(table)?,
        leaseholder_pct: percent_leaseholder(table)?,
        non_resident_leaseholder_pct: percent_non_resident_leaseholder(table)?,
        tenant_pct: percent_tenant(table)?,
    })
}

/// One bar of a breakdown chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownRow {
    /// Category label
    pub description: String,
    /// Number of responses
    pub number: i64,
}

/// `(Description, Number)` pairs of one summary type, ascending by description.
pub fn breakdown(table: &SummaryTable, kind: SummaryType) -> Result<Vec<BreakdownRow>> {
    let df = filter_summary(table, kind)?
        .lazy()
        .sort([SummaryTable::DESCRIPTION], Default::default())
        .collect()?;

    let descriptions = df.column(SummaryTable::DESCRIPTION)?.str()?;
    let numbers = df.column(SummaryTable::NUMBER)?.i64()?;

    Ok(descriptions
        .into_iter()
        .zip(numbers.into_iter())
        .filter_map(|(d, n)| {
            Some(BreakdownRow {
                description: d?.to_string(),
                number: n?,
            })
        })
        .collect())
}
