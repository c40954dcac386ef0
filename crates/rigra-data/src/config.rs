//! Data source configuration.
//!
//! ```toml
//! query_ttl_secs = 86400
//! sheet_ttl_secs = 600
//!
//! [sheets]
//! summary = "https://docs.google.com/spreadsheets/d/<id>/edit#gid=0"
//! feedback = "https://docs.google.com/spreadsheets/d/<id>/edit#gid=1"
//! ```

use crate::error::{DataError, Result};
use crate::schema::SheetKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default lifetime of a persisted sheet payload (24 hours).
pub const DEFAULT_QUERY_TTL_SECS: u64 = 24 * 60 * 60;

/// Default lifetime of a parsed table in memory (10 minutes).
pub const DEFAULT_SHEET_TTL_SECS: u64 = 600;

/// Default HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// URLs of the four survey sheets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetUrls {
    /// Summary counts sheet
    pub summary: Option<String>,
    /// Feedback scores sheet
    pub feedback: Option<String>,
    /// Sentiment sheet
    pub sentiment: Option<String>,
    /// Topic model sheet
    pub topics: Option<String>,
}

impl SheetUrls {
    /// URL of one sheet, if configured.
    pub fn get(&self, sheet: SheetKind) -> Option<&str> {
        match sheet {
            SheetKind::Summary => self.summary.as_deref(),
            SheetKind::Feedback => self.feedback.as_deref(),
            SheetKind::Sentiment => self.sentiment.as_deref(),
            SheetKind::Topics => self.topics.as_deref(),
        }
    }

    /// Set the URL of one sheet.
    pub fn set(&mut self, sheet: SheetKind, url: impl Into<String>) {
        let slot = match sheet {
            SheetKind::Summary => &mut self.summary,
            SheetKind::Feedback => &mut self.feedback,
            SheetKind::Sentiment => &mut self.sentiment,
            SheetKind::Topics => &mut self.topics,
        };
        *slot = Some(url.into());
    }
}

/// Configuration of the data source adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Sheet URLs
    pub sheets: SheetUrls,
    /// Lifetime of persisted payloads, in seconds
    pub query_ttl_secs: u64,
    /// Lifetime of parsed tables in memory, in seconds
    pub sheet_ttl_secs: u64,
    /// HTTP request timeout, in seconds
    pub request_timeout_secs: u64,
    /// Location of the SQLite payload cache
    pub cache_path: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            sheets: SheetUrls::default(),
            query_ttl_secs: DEFAULT_QUERY_TTL_SECS,
            sheet_ttl_secs: DEFAULT_SHEET_TTL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            cache_path: None,
        }
    }
}

impl DataConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject settings the adapter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(DataError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        for sheet in SheetKind::all() {
            if let Some(url) = self.sheets.get(sheet)
                && url.trim().is_empty()
            {
                return Err(DataError::Config(format!("empty URL for {} sheet", sheet)));
            }
        }

        Ok(())
    }

    /// URL of one sheet, or an error if it is not configured.
    pub fn url_for(&self, sheet: SheetKind) -> Result<&str> {
        self.sheets
            .get(sheet)
            .ok_or(DataError::SheetNotConfigured(sheet))
    }

    /// Persisted payload lifetime.
    pub const fn query_ttl(&self) -> Duration {
        Duration::from_secs(self.query_ttl_secs)
    }

    /// In-memory table lifetime.
    pub const fn sheet_ttl(&self) -> Duration {
        Duration::from_secs(self.sheet_ttl_secs)
    }

    /// HTTP request timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DataConfig::default();
        assert_eq!(config.query_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.sheet_ttl(), Duration::from_secs(600));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.cache_path.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = DataConfig::from_toml_str(
            r#"
            sheet_ttl_secs = 60

            [sheets]
            summary = "https://example.com/summary.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.sheet_ttl_secs, 60);
        assert_eq!(config.query_ttl_secs, DEFAULT_QUERY_TTL_SECS);
        assert_eq!(
            config.url_for(SheetKind::Summary).unwrap(),
            "https://example.com/summary.csv"
        );
        assert!(matches!(
            config.url_for(SheetKind::Topics),
            Err(DataError::SheetNotConfigured(SheetKind::Topics))
        ));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = DataConfig::from_toml_str("query_ttl_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = DataConfig::from_toml_str("request_timeout_secs = 0").unwrap_err();
        assert!(matches!(err, DataError::Config(_)));
    }

    #[test]
    fn test_empty_url_rejected() {
        let err = DataConfig::from_toml_str("[sheets]\nfeedback = \"  \"").unwrap_err();
        assert!(err.to_string().contains("feedback"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DataConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, DataConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "cache_path = \"/tmp/rigra.db\"\n").unwrap();

        let config = DataConfig::load_from(&path).unwrap();
        assert_eq!(config.cache_path, Some(PathBuf::from("/tmp/rigra.db")));
    }

    #[test]
    fn test_set_url() {
        let mut urls = SheetUrls::default();
        urls.set(SheetKind::Sentiment, "https://example.com/s");
        assert_eq!(urls.get(SheetKind::Sentiment), Some("https://example.com/s"));
        assert_eq!(urls.get(SheetKind::Summary), None);
    }
}
