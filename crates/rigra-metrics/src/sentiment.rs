//! Sentiment metrics over the free-text answers.

use crate::error::Result;
use crate::util::percent;
use polars::prelude::*;
use rigra_data::{Sentiment, SentimentTable, SurveyTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Share of answers with one sentiment, as a whole percentage.
///
/// Matching is exact on the lower-case label; rows with any other label count
/// towards the total only.
///
/// # Errors
/// Returns `MetricsError::DivisionByZero` for an empty table.
pub fn sentiment_percent(table: &SentimentTable, sentiment: Sentiment) -> Result<i64> {
    let matching = table
        .lazy()
        .filter(col(SentimentTable::SENTIMENT).eq(lit(sentiment.as_str())))
        .collect()?
        .height();
    percent(matching as f64, table.height() as f64, "sentiment table")
}

/// Percentages of the three sentiments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    /// Positive (%)
    pub positive: i64,
    /// Neutral (%)
    pub neutral: i64,
    /// Negative (%)
    pub negative: i64,
}

impl SentimentBreakdown {
    /// Percentage of one sentiment.
    pub const fn get(&self, sentiment: Sentiment) -> i64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    /// Point difference of each percentage against a baseline.
    pub const fn delta_from(&self, baseline: &Self) -> Self {
        Self {
            positive: self.positive - baseline.positive,
            neutral: self.neutral - baseline.neutral,
            negative: self.negative - baseline.negative,
        }
    }
}

/// Compute all three sentiment percentages.
pub fn sentiment_breakdown(table: &SentimentTable) -> Result<SentimentBreakdown> {
    Ok(SentimentBreakdown {
        positive: sentiment_percent(table, Sentiment::Positive)?,
        neutral: sentiment_percent(table, Sentiment::Neutral)?,
        negative: sentiment_percent(table, Sentiment::Negative)?,
    })
}

/// Number of answers in one feedback category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// Feedback category
    pub category: String,
    /// Number of answers
    pub counts: i64,
}

/// Answers per feedback category, sorted by category.
pub fn counts_by_category(table: &SentimentTable) -> Result<Vec<CategoryCount>> {
    let df = table
        .lazy()
        .group_by([col(SentimentTable::FEEDBACK_CATEGORY)])
        .agg([len().cast(DataType::Int64).alias("counts")])
        .sort([SentimentTable::FEEDBACK_CATEGORY], Default::default())
        .collect()?;

    let categories = df.column(SentimentTable::FEEDBACK_CATEGORY)?.str()?;
    let counts = df.column("counts")?.i64()?;

    Ok(categories
        .into_iter()
        .zip(counts.into_iter())
        .filter_map(|(category, counts)| {
            Some(CategoryCount {
                category: category?.to_string(),
                counts: counts?,
            })
        })
        .collect())
}

/// Number of answers with one sentiment label in one feedback category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySentimentCount {
    /// Feedback category
    pub category: String,
    /// Sentiment label as stored
    pub sentiment: String,
    /// Number of answers
    pub counts: i64,
}

/// Answers per `(feedback_category, sentiment)`, sorted by both.
pub fn counts_by_category_and_sentiment(
    table: &SentimentTable,
) -> Result<Vec<CategorySentimentCount>> {
    let df = table
        .lazy()
        .group_by([
            col(SentimentTable::FEEDBACK_CATEGORY),
            col(SentimentTable::SENTIMENT),
        ])
        .agg([len().cast(DataType::Int64).alias("counts")])
        .sort(
            [SentimentTable::FEEDBACK_CATEGORY, SentimentTable::SENTIMENT],
            Default::default(),
        )
        .collect()?;

    let categories = df.column(SentimentTable::FEEDBACK_CATEGORY)?.str()?;
    let sentiments = df.column(SentimentTable::SENTIMENT)?.str()?;
    let counts = df.column("counts")?.i64()?;

    Ok(categories
        .into_iter()
        .zip(sentiments.into_iter())
        .zip(counts.into_iter())
        .filter_map(|((category, sentiment), counts)| {
            Some(CategorySentimentCount {
                category: category?.to_string(),
                sentiment: sentiment?.to_string(),
                counts: counts?,
            })
        })
        .collect())
}

/// Positive and negative answer counts of one feedback category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolarityCount {
    /// Feedback category
    pub category: String,
    /// Positive answers
    pub positive: i64,
    /// Negative answers
    pub negative: i64,
}

impl PolarityCount {
    /// Positive minus negative answers.
    pub const fn net(&self) -> i64 {
        self.positive - self.negative
    }
}

/// Positive and negative counts per feedback category, sorted by category.
///
/// Categories with neither positive nor negative answers are left out.
pub fn polarity_counts(table: &SentimentTable) -> Result<Vec<PolarityCount>> {
    let mut by_category: BTreeMap<String, PolarityCount> = BTreeMap::new();

    for row in counts_by_category_and_sentiment(table)? {
        // Exact labels, as in `sentiment_percent`.
        let slot = if row.sentiment == Sentiment::Positive.as_str() {
            true
        } else if row.sentiment == Sentiment::Negative.as_str() {
            false
        } else {
            continue;
        };

        let entry = by_category
            .entry(row.category.clone())
            .or_insert_with(|| PolarityCount {
                category: row.category,
                positive: 0,
                negative: 0,
            });
        if slot {
            entry.positive += row.counts;
        } else {
            entry.negative += row.counts;
        }
    }

    Ok(by_category.into_values().collect())
}
