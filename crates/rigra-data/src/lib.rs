#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/seanaller/rigra-survey/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod error;
pub mod provider;
pub mod schema;
pub mod sheets;
pub mod tables;

pub use cache::SqliteCache;
pub use config::DataConfig;
pub use error::{DataError, Result};
pub use provider::SurveyDataProvider;
pub use schema::{Dimension, Sentiment, SheetKind, SummaryType};
pub use sheets::{CsvDirSource, GoogleSheetsSource, MemorySource, SheetSource};
pub use tables::{FeedbackTable, SentimentTable, SummaryTable, SurveyData, SurveyTable, TopicTable};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
