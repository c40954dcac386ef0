//! Metric Registry
//!
//! Central registry of every headline card on the dashboard. Allows a card to
//! be looked up by name and evaluated against a loaded survey.

use crate::error::{MetricsError, Result};
use crate::feedback::{self, NpsBand};
use crate::sentiment;
use crate::summary;
use rigra_data::{Sentiment, SurveyData};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Dashboard page a metric is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricPage {
    /// Survey responses overview
    Responses,
    /// Feedback overview
    Feedback,
    /// Feedback explorer
    Sentiment,
}

impl MetricPage {
    /// Lower-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Responses => "responses",
            Self::Feedback => "feedback",
            Self::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for MetricPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricUnit {
    /// Number of responses
    Count,
    /// Whole percentage
    Percent,
    /// Mean score out of 5
    Score,
}

impl MetricUnit {
    /// Lower-case name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Percent => "percent",
            Self::Score => "score",
        }
    }
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every headline metric of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// All responses
    AllResponses,
    /// Contactable responses
    ContactableResponses,
    /// Leaseholders (%)
    LeaseholderPercent,
    /// Non-resident leaseholders (%)
    NonResidentLeaseholderPercent,
    /// Tenants (%)
    TenantPercent,
    /// Responses to the scored questions
    FeedbackResponses,
    /// Average feedback score
    AverageFeedback,
    /// Positive feedback (%)
    PositiveFeedback,
    /// Neutral feedback (%)
    NeutralFeedback,
    /// Negative feedback (%)
    NegativeFeedback,
    /// Positive sentiment (%)
    PositiveSentiment,
    /// Neutral sentiment (%)
    NeutralSentiment,
    /// Negative sentiment (%)
    NegativeSentiment,
}

impl MetricKind {
    /// Returns all metrics in dashboard order.
    pub const fn all() -> [Self; 13] {
        [
            Self::AllResponses,
            Self::ContactableResponses,
            Self::LeaseholderPercent,
            Self::NonResidentLeaseholderPercent,
            Self::TenantPercent,
            Self::FeedbackResponses,
            Self::AverageFeedback,
            Self::PositiveFeedback,
            Self::NeutralFeedback,
            Self::NegativeFeedback,
            Self::PositiveSentiment,
            Self::NeutralSentiment,
            Self::NegativeSentiment,
        ]
    }

    /// Unique snake_case name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AllResponses => "all_responses",
            Self::ContactableResponses => "contactable_responses",
            Self::LeaseholderPercent => "leaseholder_percent",
            Self::NonResidentLeaseholderPercent => "non_resident_leaseholder_percent",
            Self::TenantPercent => "tenant_percent",
            Self::FeedbackResponses => "feedback_responses",
            Self::AverageFeedback => "average_feedback",
            Self::PositiveFeedback => "positive_feedback",
            Self::NeutralFeedback => "neutral_feedback",
            Self::NegativeFeedback => "negative_feedback",
            Self::PositiveSentiment => "positive_sentiment",
            Self::NeutralSentiment => "neutral_sentiment",
            Self::NegativeSentiment => "negative_sentiment",
        }
    }

    /// Registry entry of this metric.
    pub fn info(&self) -> MetricInfo {
        let (page, title, description, unit) = match self {
            Self::AllResponses => (
                MetricPage::Responses,
                "All Responses",
                "Total number of survey responses",
                MetricUnit::Count,
            ),
            Self::ContactableResponses => (
                MetricPage::Responses,
                "Contactable Responses",
                "Responses that left contact details",
                MetricUnit::Count,
            ),
            Self::LeaseholderPercent => (
                MetricPage::Responses,
                "Leaseholders",
                "Share of responses from leaseholders",
                MetricUnit::Percent,
            ),
            Self::NonResidentLeaseholderPercent => (
                MetricPage::Responses,
                "Non-resident Leaseholders",
                "Share of responses from leaseholders living elsewhere",
                MetricUnit::Percent,
            ),
            Self::TenantPercent => (
                MetricPage::Responses,
                "Tenants",
                "Share of responses from tenants",
                MetricUnit::Percent,
            ),
            Self::FeedbackResponses => (
                MetricPage::Feedback,
                "Responses",
                "Highest response id in the feedback sheet",
                MetricUnit::Count,
            ),
            Self::AverageFeedback => (
                MetricPage::Feedback,
                "Average Feedback",
                "Mean score over every scored answer, out of 5.0",
                MetricUnit::Score,
            ),
            Self::PositiveFeedback => (
                MetricPage::Feedback,
                "Positive Feedback",
                "Share of scored answers above 4",
                MetricUnit::Percent,
            ),
            Self::NeutralFeedback => (
                MetricPage::Feedback,
                "Neutral Feedback",
                "Share of scored answers from 3 to 4",
                MetricUnit::Percent,
            ),
            Self::NegativeFeedback => (
                MetricPage::Feedback,
                "Negative Feedback",
                "Share of scored answers below 3",
                MetricUnit::Percent,
            ),
            Self::PositiveSentiment => (
                MetricPage::Sentiment,
                "Positive Feedback Sentiment",
                "Share of free-text answers with positive sentiment",
                MetricUnit::Percent,
            ),
            Self::NeutralSentiment => (
                MetricPage::Sentiment,
                "Neutral Feedback Sentiment",
                "Share of free-text answers with neutral sentiment",
                MetricUnit::Percent,
            ),
            Self::NegativeSentiment => (
                MetricPage::Sentiment,
                "Negative Feedback Sentiment",
                "Share of free-text answers with negative sentiment",
                MetricUnit::Percent,
            ),
        };

        MetricInfo {
            kind: *self,
            name: self.name(),
            page,
            title,
            description,
            unit,
        }
    }

    /// Compute the metric from a loaded survey.
    pub fn evaluate(&self, data: &SurveyData) -> Result<MetricValue> {
        evaluate(*self, data)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::all()
            .into_iter()
            .find(|k| k.name() == normalized)
            .ok_or_else(|| MetricsError::InvalidArgument(format!("unknown metric: '{}'", s)))
    }
}

/// Metric metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricInfo {
    /// Metric kind
    pub kind: MetricKind,
    /// Metric name (unique identifier)
    pub name: &'static str,
    /// Page the metric is shown on
    pub page: MetricPage,
    /// Card title
    pub title: &'static str,
    /// Brief description of what the metric measures
    pub description: &'static str,
    /// Unit of the value
    pub unit: MetricUnit,
}

/// A computed metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum MetricValue {
    /// Number of responses
    Count(i64),
    /// Whole percentage
    Percent(i64),
    /// Mean score
    Score(f64),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Percent(p) => write!(f, "{}%", p),
            Self::Score(s) => write!(f, "{:.1}", s),
        }
    }
}

/// Get all available metric info
pub fn available_metrics() -> Vec<MetricInfo> {
    MetricKind::all().iter().map(MetricKind::info).collect()
}

/// Get metrics by page
pub fn metrics_by_page(page: MetricPage) -> Vec<MetricInfo> {
    available_metrics()
        .into_iter()
        .filter(|m| m.page == page)
        .collect()
}

/// Get metric info by name
pub fn get_metric_info(name: &str) -> Option<MetricInfo> {
    name.parse::<MetricKind>().ok().map(|k| k.info())
}

/// Count metrics by page
pub fn count_by_page() -> HashMap<MetricPage, usize> {
    let mut counts = HashMap::new();
    for metric in available_metrics() {
        *counts.entry(metric.page).or_insert(0) += 1;
    }
    counts
}

/// Compute one metric from a loaded survey.
pub fn evaluate(kind: MetricKind, data: &SurveyData) -> Result<MetricValue> {
    let summary = &data.summary;
    let feedback = &data.feedback;
    let sentiment = &data.sentiment;

    Ok(match kind {
        MetricKind::AllResponses => MetricValue::Count(summary::count_all(summary)?),
        MetricKind::ContactableResponses => {
            MetricValue::Count(summary::count_contactable(summary)?)
        }
        MetricKind::LeaseholderPercent => {
            MetricValue::Percent(summary::percent_leaseholder(summary)?)
        }
        MetricKind::NonResidentLeaseholderPercent => {
            MetricValue::Percent(summary::percent_non_resident_leaseholder(summary)?)
        }
        MetricKind::TenantPercent => MetricValue::Percent(summary::percent_tenant(summary)?),
        MetricKind::FeedbackResponses => {
            MetricValue::Count(feedback::response_count(feedback)?)
        }
        MetricKind::AverageFeedback => MetricValue::Score(feedback::mean_score(feedback)?),
        MetricKind::PositiveFeedback => {
            MetricValue::Percent(feedback::percent_by_band(feedback, NpsBand::Positive)?)
        }
        MetricKind::NeutralFeedback => {
            MetricValue::Percent(feedback::percent_by_band(feedback, NpsBand::Neutral)?)
        }
        MetricKind::NegativeFeedback => {
            MetricValue::Percent(feedback::percent_by_band(feedback, NpsBand::Negative)?)
        }
        MetricKind::PositiveSentiment => {
            MetricValue::Percent(sentiment::sentiment_percent(sentiment, Sentiment::Positive)?)
        }
        MetricKind::NeutralSentiment => {
            MetricValue::Percent(sentiment::sentiment_percent(sentiment, Sentiment::Neutral)?)
        }
        MetricKind::NegativeSentiment => {
            MetricValue::Percent(sentiment::sentiment_percent(sentiment, Sentiment::Negative)?)
        }
    })
}
