//! The feedback explorer: a filter chain over the sentiment table.
//!
//! Five predicates are combined into one conjunction, so the order in which they
//! are set does not matter and applying a filter twice equals applying it once.

use crate::error::{MetricsError, Result};
use crate::sentiment::{SentimentBreakdown, sentiment_breakdown};
use polars::prelude::*;
use rigra_data::{Sentiment, SentimentTable, SurveyTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Column holding building names.
const BUILDING_NAME: &str = "building_name";

/// Display names of the explorer table, keyed by source column.
pub const DISPLAY_COLUMNS: [(&str, &str); 7] = [
    ("resident_type", "Resident"),
    ("building_name", "Building Name"),
    ("building_floor", "Building Floor"),
    ("resident_length", "Length of Residency"),
    ("feedback_category", "Category"),
    ("sentiment", "Sentiment Category"),
    ("free_text", "Feedback Response"),
];

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl ValueRange {
    /// Full polarity range.
    pub const POLARITY: Self = Self::new(-1.0, 1.0);
    /// Full subjectivity range.
    pub const SUBJECTIVITY: Self = Self::new(0.0, 1.0);

    /// Create a range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies in the range.
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Check the range is ordered and lies within `bounds`.
    pub fn validate(&self, bounds: Self, name: &str) -> Result<()> {
        if self.min.is_nan() || self.max.is_nan() || self.min > self.max {
            return Err(MetricsError::InvalidArgument(format!(
                "{} range {} has min above max",
                name, self
            )));
        }
        if self.min < bounds.min || self.max > bounds.max {
            return Err(MetricsError::InvalidArgument(format!(
                "{} range {} outside {}",
                name, self, bounds
            )));
        }
        Ok(())
    }

    fn expr(&self, column: &str) -> Expr {
        col(column)
            .gt_eq(lit(self.min))
            .and(col(column).lt_eq(lit(self.max)))
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

impl FromStr for ValueRange {
    type Err = MetricsError;

    /// Parse `MIN..MAX`, e.g. `-0.5..1`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MetricsError::InvalidArgument(format!("expected MIN..MAX, got '{}'", s));
        let (min, max) = s.trim().split_once("..").ok_or_else(invalid)?;
        let min = min.trim().parse::<f64>().map_err(|_| invalid())?;
        let max = max.trim().parse::<f64>().map_err(|_| invalid())?;
        Ok(Self::new(min, max))
    }
}

/// Selection of the feedback explorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerFilter {
    /// Keep one feedback category (`None` keeps all)
    pub category: Option<String>,
    /// Keep one building (`None` keeps all)
    pub building: Option<String>,
    /// Sentiments to keep; an empty set keeps nothing
    pub sentiments: BTreeSet<Sentiment>,
    /// Polarity range, within [-1, 1]
    pub polarity: ValueRange,
    /// Subjectivity range, within [0, 1]
    pub subjectivity: ValueRange,
}

impl Default for ExplorerFilter {
    fn default() -> Self {
        Self {
            category: None,
            building: None,
            sentiments: Sentiment::all().into_iter().collect(),
            polarity: ValueRange::POLARITY,
            subjectivity: ValueRange::SUBJECTIVITY,
        }
    }
}

impl ExplorerFilter {
    /// Filter that keeps every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep one feedback category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Keep one building.
    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = Some(building.into());
        self
    }

    /// Keep only the given sentiments.
    pub fn with_sentiments(mut self, sentiments: impl IntoIterator<Item = Sentiment>) -> Self {
        self.sentiments = sentiments.into_iter().collect();
        self
    }

    /// Restrict polarity.
    pub const fn with_polarity(mut self, range: ValueRange) -> Self {
        self.polarity = range;
        self
    }

    /// Restrict subjectivity.
    pub const fn with_subjectivity(mut self, range: ValueRange) -> Self {
        self.subjectivity = range;
        self
    }

    /// Whether the filter keeps every row.
    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }

    /// Check both ranges.
    pub fn validate(&self) -> Result<()> {
        self.polarity.validate(ValueRange::POLARITY, "polarity")?;
        self.subjectivity
            .validate(ValueRange::SUBJECTIVITY, "subjectivity")
    }

    /// The conjunction of all five predicates.
    pub fn expr(&self) -> Expr {
        let sentiment = self.sentiments.iter().fold(lit(false), |acc, s| {
            acc.or(col(SentimentTable::SENTIMENT).eq(lit(s.as_str())))
        });

        let mut predicate = sentiment
            .and(self.polarity.expr(SentimentTable::POLARITY))
            .and(self.subjectivity.expr(SentimentTable::SUBJECTIVITY));

        if let Some(category) = &self.category {
            predicate = predicate.and(col(SentimentTable::FEEDBACK_CATEGORY).eq(lit(category.as_str())));
        }
        if let Some(building) = &self.building {
            predicate = predicate.and(col(BUILDING_NAME).eq(lit(building.as_str())));
        }
        predicate
    }

    /// Rows of `table` kept by the filter.
    ///
    /// # Errors
    /// Returns `MetricsError::InvalidArgument` for an invalid range.
    pub fn apply(&self, table: &SentimentTable) -> Result<SentimentTable> {
        self.validate()?;
        let df = table.lazy().filter(self.expr()).collect()?;
        Ok(SentimentTable::from_frame(df)?)
    }
}

/// Result of exploring the sentiment table with a filter.
#[derive(Debug, Clone)]
pub struct ExplorerView {
    /// The filter that was applied
    pub filter: ExplorerFilter,
    /// Matching rows
    pub table: SentimentTable,
    /// Sentiment percentages of the matching rows
    pub breakdown: SentimentBreakdown,
    /// Sentiment percentages of the whole table
    pub baseline: SentimentBreakdown,
}

impl ExplorerView {
    /// Point differences of the filtered percentages against the whole table.
    pub const fn delta(&self) -> SentimentBreakdown {
        self.breakdown.delta_from(&self.baseline)
    }
}

/// Apply a filter and compute the percentages with their deltas.
///
/// # Errors
/// `InvalidArgument` for an invalid filter; `DivisionByZero` when the table or
/// the filtered rows are empty.
pub fn explore(table: &SentimentTable, filter: &ExplorerFilter) -> Result<ExplorerView> {
    let baseline = sentiment_breakdown(table)?;
    let filtered = filter.apply(table)?;
    let breakdown = sentiment_breakdown(&filtered)?;

    Ok(ExplorerView {
        filter: filter.clone(),
        table: filtered,
        breakdown,
        baseline,
    })
}

fn distinct_sorted(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let values: BTreeSet<&str> = df.column(column)?.str()?.into_iter().flatten().collect();
    Ok(values.into_iter().map(str::to_string).collect())
}

/// Selectable feedback categories, sorted.
pub fn category_options(table: &SentimentTable) -> Result<Vec<String>> {
    distinct_sorted(table.frame(), SentimentTable::FEEDBACK_CATEGORY)
}

/// Selectable buildings, sorted, among the rows of `category` if given.
pub fn building_options(table: &SentimentTable, category: Option<&str>) -> Result<Vec<String>> {
    match category {
        Some(category) => {
            let df = table
                .lazy()
                .filter(col(SentimentTable::FEEDBACK_CATEGORY).eq(lit(category)))
                .collect()?;
            distinct_sorted(&df, BUILDING_NAME)
        }
        None => distinct_sorted(table.frame(), BUILDING_NAME),
    }
}

/// Project the explorer columns under their display names.
pub fn display_frame(table: &SentimentTable) -> Result<DataFrame> {
    let exprs: Vec<Expr> = DISPLAY_COLUMNS
        .iter()
        .map(|(source, display)| col(*source).alias(*display))
        .collect();
    Ok(table.lazy().select(exprs).collect()?)
}

/// One row of the explorer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerRow {
    /// Resident type
    #[serde(rename = "Resident")]
    pub resident: String,
    /// Building name
    #[serde(rename = "Building Name")]
    pub building_name: String,
    /// Building floor
    #[serde(rename = "Building Floor")]
    pub building_floor: String,
    /// Length of residency
    #[serde(rename = "Length of Residency")]
    pub resident_length: String,
    /// Feedback category
    #[serde(rename = "Category")]
    pub category: String,
    /// Sentiment label
    #[serde(rename = "Sentiment Category")]
    pub sentiment: String,
    /// Free-text answer
    #[serde(rename = "Feedback Response")]
    pub feedback_response: String,
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    Ok(df.column(name)?.str()?)
}

/// Rows of the explorer table, in table order.
pub fn explorer_rows(table: &SentimentTable) -> Result<Vec<ExplorerRow>> {
    let df = table.frame();
    let resident = text_column(df, "resident_type")?;
    let building = text_column(df, BUILDING_NAME)?;
    let floor = text_column(df, "building_floor")?;
    let length = text_column(df, "resident_length")?;
    let category = text_column(df, SentimentTable::FEEDBACK_CATEGORY)?;
    let sentiment = text_column(df, SentimentTable::SENTIMENT)?;
    let text = text_column(df, SentimentTable::FREE_TEXT)?;

    let cell = |ca: &StringChunked, row: usize| ca.get(row).unwrap_or_default().to_string();

    Ok((0..df.height())
        .map(|row| ExplorerRow {
            resident: cell(resident, row),
            building_name: cell(building, row),
            building_floor: cell(floor, row),
            resident_length: cell(length, row),
            category: cell(category, row),
            sentiment: cell(sentiment, row),
            feedback_response: cell(text, row),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigra_data::tables::SentimentRecord;
    use rstest::rstest;

    fn record(
        category: &str,
        building: &str,
        sentiment: &str,
        polarity: f64,
        subjectivity: f64,
    ) -> SentimentRecord {
        SentimentRecord {
            response_id: 1,
            resident_type: "Leaseholder".to_string(),
            building_name: building.to_string(),
            building_floor: "2".to_string(),
            resident_length: "5+ years".to_string(),
            feedback_category: category.to_string(),
            sentiment: sentiment.to_string(),
            polarity,
            subjectivity,
            free_text: format!("{} about {}", sentiment, category),
        }
    }

    fn table() -> SentimentTable {
        SentimentTable::from_records(&[
            record("Repairs", "Alpha", "positive", 0.8, 0.9),
            record("Repairs", "Beta", "negative", -0.6, 0.4),
            record("Repairs", "Alpha", "neutral", 0.0, 0.1),
            record("Cleaning", "Gamma", "positive", 0.3, 0.5),
            record("Cleaning", "Alpha", "negative", -1.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        let t = table();
        let filter = ExplorerFilter::new();
        assert!(filter.is_unrestricted());
        assert_eq!(filter.apply(&t).unwrap().height(), t.height());
    }

    #[test]
    fn test_category_and_building() {
        let filter = ExplorerFilter::new()
            .with_category("Repairs")
            .with_building("Alpha");
        assert_eq!(filter.apply(&table()).unwrap().height(), 2);
    }

    #[test]
    fn test_sentiment_selection() {
        let t = table();
        let negative = ExplorerFilter::new().with_sentiments([Sentiment::Negative]);
        assert_eq!(negative.apply(&t).unwrap().height(), 2);

        let nothing = ExplorerFilter::new().with_sentiments([]);
        assert!(nothing.apply(&t).unwrap().is_empty());
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let t = table();
        let filter = ExplorerFilter::new()
            .with_polarity(ValueRange::new(-1.0, -0.6))
            .with_subjectivity(ValueRange::new(0.4, 1.0));
        assert_eq!(filter.apply(&t).unwrap().height(), 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let t = table();
        let filter = ExplorerFilter::new()
            .with_sentiments([Sentiment::Positive, Sentiment::Negative])
            .with_polarity(ValueRange::new(-0.7, 1.0));
        let once = filter.apply(&t).unwrap();
        let twice = filter.apply(&once).unwrap();
        assert!(once.frame().equals(twice.frame()));
    }

    #[rstest]
    #[case(ValueRange::new(0.5, -0.5), ValueRange::SUBJECTIVITY)]
    #[case(ValueRange::new(-1.5, 1.0), ValueRange::SUBJECTIVITY)]
    #[case(ValueRange::POLARITY, ValueRange::new(0.0, 1.2))]
    #[case(ValueRange::POLARITY, ValueRange::new(f64::NAN, 1.0))]
    fn test_invalid_ranges(#[case] polarity: ValueRange, #[case] subjectivity: ValueRange) {
        let filter = ExplorerFilter::new()
            .with_polarity(polarity)
            .with_subjectivity(subjectivity);
        assert!(matches!(
            filter.apply(&table()),
            Err(MetricsError::InvalidArgument(_))
        ));
    }

    #[rstest]
    #[case("-1..1", ValueRange::new(-1.0, 1.0))]
    #[case(" 0.2 .. 0.8 ", ValueRange::new(0.2, 0.8))]
    fn test_range_parse(#[case] input: &str, #[case] expected: ValueRange) {
        assert_eq!(input.parse::<ValueRange>().unwrap(), expected);
    }

    #[test]
    fn test_range_parse_rejects_garbage() {
        assert!("0.2-0.8".parse::<ValueRange>().is_err());
        assert!("a..b".parse::<ValueRange>().is_err());
    }

    #[test]
    fn test_explore_deltas() {
        let view = explore(&table(), &ExplorerFilter::new().with_category("Repairs")).unwrap();
        assert_eq!(view.baseline.positive, 40);
        assert_eq!(view.breakdown.positive, 33);
        assert_eq!(view.delta().positive, -7);
        assert_eq!(view.table.height(), 3);
    }

    #[test]
    fn test_explore_empty_selection_fails() {
        let filter = ExplorerFilter::new().with_category("Parking");
        assert!(matches!(
            explore(&table(), &filter),
            Err(MetricsError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_options() {
        let t = table();
        assert_eq!(category_options(&t).unwrap(), ["Cleaning", "Repairs"]);
        assert_eq!(building_options(&t, None).unwrap(), ["Alpha", "Beta", "Gamma"]);
        assert_eq!(
            building_options(&t, Some("Cleaning")).unwrap(),
            ["Alpha", "Gamma"]
        );
    }

    #[test]
    fn test_display_frame_names() {
        let df = display_frame(&table()).unwrap();
        let names: Vec<&str> = df.get_column_names().into_iter().map(|n| n.as_str()).collect();
        let expected: Vec<&str> = DISPLAY_COLUMNS.iter().map(|(_, d)| *d).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_explorer_rows() {
        let rows = explorer_rows(&table()).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].building_name, "Beta");
        assert_eq!(rows[1].feedback_response, "negative about Repairs");

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["Sentiment Category"], "positive");
    }
}
