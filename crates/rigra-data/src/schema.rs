//! Closed vocabularies of the survey sheets.
//!
//! Every selector that the sheets encode as free strings (summary row
//! types, respondent breakdown columns, sentiment labels, sheet names) is an enum
//! here. Strings are parsed once, at the configuration or command-line boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a row in the summary sheet (the `Type` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryType {
    /// Estate-wide totals (`Responses`, `Contactable`)
    All,
    /// Counts per resident type (leaseholder, tenant, ...)
    ResidentType,
    /// Counts per building
    BuildingName,
    /// Counts per building floor
    BuildingFloor,
    /// Counts per length of residency
    ResidentLength,
}

impl SummaryType {
    /// Returns all summary types in sheet order.
    pub const fn all() -> [Self; 5] {
        [
            Self::All,
            Self::ResidentType,
            Self::BuildingName,
            Self::BuildingFloor,
            Self::ResidentLength,
        ]
    }

    /// Value stored in the `Type` column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ResidentType => "resident_type",
            Self::BuildingName => "building_name",
            Self::BuildingFloor => "building_floor",
            Self::ResidentLength => "resident_length",
        }
    }

    /// Human readable title.
    pub const fn title(&self) -> &'static str {
        match self {
            Self::All => "All Responses",
            Self::ResidentType => "Resident Type",
            Self::BuildingName => "Building Name",
            Self::BuildingFloor => "Building Floor",
            Self::ResidentLength => "Resident Length",
        }
    }

    /// The respondent dimension this summary type counts, if any.
    pub const fn dimension(&self) -> Option<Dimension> {
        match self {
            Self::All => None,
            Self::ResidentType => Some(Dimension::ResidentType),
            Self::BuildingName => Some(Dimension::BuildingName),
            Self::BuildingFloor => Some(Dimension::BuildingFloor),
            Self::ResidentLength => Some(Dimension::ResidentLength),
        }
    }
}

impl fmt::Display for SummaryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownVariant::new("summary type", s))
    }
}

/// Respondent breakdown column shared by the feedback and sentiment sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// `resident_type`
    ResidentType,
    /// `building_name`
    BuildingName,
    /// `building_floor`
    BuildingFloor,
    /// `resident_length`
    ResidentLength,
}

impl Dimension {
    /// Returns all dimensions.
    pub const fn all() -> [Self; 4] {
        [
            Self::ResidentType,
            Self::BuildingName,
            Self::BuildingFloor,
            Self::ResidentLength,
        ]
    }

    /// Column name in the feedback and sentiment sheets.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::ResidentType => "resident_type",
            Self::BuildingName => "building_name",
            Self::BuildingFloor => "building_floor",
            Self::ResidentLength => "resident_length",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Dimension {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|d| d.column() == normalized)
            .ok_or_else(|| UnknownVariant::new("dimension", s))
    }
}

/// Sentiment label attached to a free-text answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    /// `positive`
    Positive,
    /// `neutral`
    Neutral,
    /// `negative`
    Negative,
}

impl Sentiment {
    /// Returns all sentiments.
    pub const fn all() -> [Self; 3] {
        [Self::Positive, Self::Neutral, Self::Negative]
    }

    /// Value stored in the `sentiment` column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|v| v.as_str() == normalized)
            .ok_or_else(|| UnknownVariant::new("sentiment", s))
    }
}

/// One of the four sheets backing the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetKind {
    /// Precomputed category counts
    Summary,
    /// Per-question feedback scores
    Feedback,
    /// Sentiment-tagged free text
    Sentiment,
    /// Topic-model output
    Topics,
}

impl SheetKind {
    /// Returns all sheets.
    pub const fn all() -> [Self; 4] {
        [Self::Summary, Self::Feedback, Self::Sentiment, Self::Topics]
    }

    /// Stable key used for cache rows and file names.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Feedback => "feedback",
            Self::Sentiment => "sentiment",
            Self::Topics => "topics",
        }
    }

    /// File name used by directory-backed sources.
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.key())
    }
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SheetKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|k| k.key() == normalized)
            .ok_or_else(|| UnknownVariant::new("sheet", s))
    }
}

/// A string did not name any variant of a closed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    /// Vocabulary that was searched
    pub kind: &'static str,
    /// Offending input
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
