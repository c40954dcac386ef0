//! Feedback score metrics.
//!
//! Scores run from 1 (worst) to 5 (best) and are bucketed into three NPS bands:
//!
//! | Band     | Scores            |
//! |----------|-------------------|
//! | Positive | `score > 4`       |
//! | Neutral  | `3 <= score <= 4` |
//! | Negative | `score < 3`       |
//!
//! The bands partition the score range, so a score of exactly 4 is neutral and
//! the three band counts always sum to the number of rows.

use crate::error::{MetricsError, Result};
use crate::util::{percent, round_to};
use polars::prelude::*;
use rigra_data::{Dimension, FeedbackTable, SurveyTable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Column holding building names.
const BUILDING_NAME: &str = "building_name";

/// NPS band of a feedback score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NpsBand {
    /// `score > 4`
    Positive,
    /// `3 <= score <= 4`
    Neutral,
    /// `score < 3`
    Negative,
}

impl NpsBand {
    /// Lower edge of the neutral band.
    pub const NEUTRAL_MIN: f64 = 3.0;
    /// Upper edge of the neutral band.
    pub const NEUTRAL_MAX: f64 = 4.0;

    /// Returns all bands.
    pub const fn all() -> [Self; 3] {
        [Self::Positive, Self::Neutral, Self::Negative]
    }

    /// Band of a score (or of an average score).
    pub fn classify(score: f64) -> Self {
        if score > Self::NEUTRAL_MAX {
            Self::Positive
        } else if score < Self::NEUTRAL_MIN {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    /// Lower-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }

    /// Caption describing the score range of the band.
    pub const fn caption(&self) -> &'static str {
        match self {
            Self::Positive => "Score above 4",
            Self::Neutral => "Score 3 to 4",
            Self::Negative => "Score below 3",
        }
    }

    /// Predicate selecting the rows of this band.
    pub fn expr(&self) -> Expr {
        let score = col(FeedbackTable::FEEDBACK_SCORE);
        match self {
            Self::Positive => score.gt(lit(Self::NEUTRAL_MAX)),
            Self::Neutral => score
                .clone()
                .gt_eq(lit(Self::NEUTRAL_MIN))
                .and(score.lt_eq(lit(Self::NEUTRAL_MAX))),
            Self::Negative => score.lt(lit(Self::NEUTRAL_MIN)),
        }
    }
}

impl fmt::Display for NpsBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NpsBand {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|b| b.as_str() == normalized)
            .ok_or_else(|| MetricsError::InvalidArgument(format!("unknown NPS band: '{}'", s)))
    }
}

/// Mean of all feedback scores, rounded to one decimal place.
///
/// # Errors
/// Returns `MetricsError::MissingData` for an empty table.
pub fn mean_score(table: &FeedbackTable) -> Result<f64> {
    table
        .frame()
        .column(FeedbackTable::FEEDBACK_SCORE)?
        .f64()?
        .mean()
        .map(|m| round_to(m, 1))
        .ok_or_else(|| MetricsError::MissingData("feedback table has no scores".to_string()))
}

/// Number of rows in one band.
pub fn count_by_band(table: &FeedbackTable, band: NpsBand) -> Result<usize> {
    Ok(table.lazy().filter(band.expr()).collect()?.height())
}

/// Share of rows in one band, as a whole percentage.
///
/// # Errors
/// Returns `MetricsError::DivisionByZero` for an empty table.
pub fn percent_by_band(table: &FeedbackTable, band: NpsBand) -> Result<i64> {
    let count = count_by_band(table, band)?;
    percent(count as f64, table.height() as f64, "feedback table")
}

/// Number of survey responses, taken as the highest response id.
///
/// # Errors
/// Returns `MetricsError::MissingData` for an empty table.
pub fn response_count(table: &FeedbackTable) -> Result<i64> {
    table
        .frame()
        .column(FeedbackTable::RESPONSE_ID)?
        .i64()?
        .max()
        .ok_or_else(|| MetricsError::MissingData("feedback table has no responses".to_string()))
}

/// Average score of one question category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAverage {
    /// Question category
    pub category: String,
    /// Mean score (unrounded)
    pub score: f64,
    /// Band of the mean score
    pub band: NpsBand,
}

/// Mean score per question category, sorted by category.
pub fn average_by_category(table: &FeedbackTable) -> Result<Vec<CategoryAverage>> {
    let df = table
        .lazy()
        .group_by([col(FeedbackTable::QUESTION_CATEGORY)])
        .agg([col(FeedbackTable::FEEDBACK_SCORE).mean()])
        .sort([FeedbackTable::QUESTION_CATEGORY], Default::default())
        .collect()?;

    let categories = df.column(FeedbackTable::QUESTION_CATEGORY)?.str()?;
    let scores = df.column(FeedbackTable::FEEDBACK_SCORE)?.f64()?;

    Ok(categories
        .into_iter()
        .zip(scores.into_iter())
        .filter_map(|(category, score)| {
            let score = score?;
            Some(CategoryAverage {
                category: category?.to_string(),
                score,
                band: NpsBand::classify(score),
            })
        })
        .collect())
}

/// Project the table onto one respondent dimension and the score columns.
///
/// Columns of the result: `[dimension, question, question_category, feedback_score]`.
pub fn filter_feedback(table: &FeedbackTable, dimension: Dimension) -> Result<DataFrame> {
    Ok(table
        .lazy()
        .select([
            col(dimension.column()),
            col(FeedbackTable::QUESTION),
            col(FeedbackTable::QUESTION_CATEGORY),
            col(FeedbackTable::FEEDBACK_SCORE),
        ])
        .collect()?)
}

/// A question and the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMapping {
    /// Question category
    pub category: String,
    /// Question text
    pub question: String,
}

/// Distinct `(question_category, question)` pairs in first-appearance order.
pub fn question_mapping(table: &FeedbackTable) -> Result<Vec<QuestionMapping>> {
    let df = table.frame();
    let categories = df.column(FeedbackTable::QUESTION_CATEGORY)?.str()?;
    let questions = df.column(FeedbackTable::QUESTION)?.str()?;

    let mut seen = HashSet::new();
    let mut mapping = Vec::new();
    for (category, question) in categories.into_iter().zip(questions.into_iter()) {
        if let (Some(category), Some(question)) = (category, question)
            && seen.insert((category, question))
        {
            mapping.push(QuestionMapping {
                category: category.to_string(),
                question: question.to_string(),
            });
        }
    }
    Ok(mapping)
}

/// Category averages of one building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingAverages {
    /// Building name
    pub building: String,
    /// Category averages of the building's rows
    pub averages: Vec<CategoryAverage>,
}

/// Category averages per building, buildings in first-appearance order.
pub fn averages_by_building(table: &FeedbackTable) -> Result<Vec<BuildingAverages>> {
    let names = table.frame().column(BUILDING_NAME)?.str()?;

    let mut seen = HashSet::new();
    let buildings: Vec<&str> = names
        .into_iter()
        .flatten()
        .filter(|name| seen.insert(*name))
        .collect();

    buildings
        .into_iter()
        .map(|building| -> Result<BuildingAverages> {
            let rows = table
                .lazy()
                .filter(col(BUILDING_NAME).eq(lit(building)))
                .collect()?;
            Ok(BuildingAverages {
                building: building.to_string(),
                averages: average_by_category(&FeedbackTable::from_frame(rows)?)?,
            })
        })
        .collect()
}

/// The five headline cards of the feedback overview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackOverview {
    /// Number of responses
    pub responses: i64,
    /// Mean score, one decimal place
    pub mean_score: f64,
    /// Positive feedback (%)
    pub positive_pct: i64,
    /// Neutral feedback (%)
    pub neutral_pct: i64,
    /// Negative feedback (%)
    pub negative_pct: i64,
}

impl FeedbackOverview {
    /// Percentage of one band.
    pub const fn percent(&self, band: NpsBand) -> i64 {
        match band {
            NpsBand::Positive => self.positive_pct,
            NpsBand::Neutral => self.neutral_pct,
            NpsBand::Negative => self.negative_pct,
        }
    }
}

/// Compute the feedback overview.
pub fn feedback_overview(table: &FeedbackTable) -> Result<FeedbackOverview> {
    Ok(FeedbackOverview {
        responses: response_count(table)?,
        mean_score: mean_score(table)?,
        positive_pct: percent_by_band(table, NpsBand::Positive)?,
        neutral_pct: percent_by_band(table, NpsBand::Neutral)?,
        negative_pct: percent_by_band(table, NpsBand::Negative)?,
    })
}
