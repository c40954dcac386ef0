//! Report envelope for RIGRA pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A timestamped report around one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Page name (`summary`, `explorer`, `topics`, ...).
    pub page: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Where the survey data came from, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(page: String, source: Option<String>, contents: serde_json::Value) -> Self {
        Self {
            page,
            timestamp: Utc::now(),
            source,
            contents,
        }
    }

    /// Create a report around any serialisable page.
    pub fn from_page<T: Serialize>(page: &str, contents: &T) -> Result<Self, ReportError> {
        Ok(Self::new(
            page.to_string(),
            None,
            serde_json::to_value(contents)?,
        ))
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    page: Option<String>,
    source: Option<String>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page name.
    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = Some(page.into());
        self
    }

    /// Set the data source description.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Serialise a page into the report contents.
    pub fn page_contents<T: Serialize>(mut self, contents: &T) -> Result<Self, ReportError> {
        self.contents = Some(serde_json::to_value(contents)?);
        Ok(self)
    }

    /// Build the report.
    pub fn build(self) -> Report {
        Report::new(
            self.page.unwrap_or_default(),
            self.source,
            self.contents.unwrap_or(serde_json::Value::Null),
        )
    }
}
