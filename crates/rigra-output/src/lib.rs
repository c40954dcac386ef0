#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/seanaller/rigra-survey/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod explorer;
pub mod export;
pub mod report;
pub mod summary;
pub mod topics;

pub use explorer::ExplorerPage;
pub use export::{
    BuildingAverageRecord, ExportError, ExportFormat, Exporter, TopicWordRecord, write_page_exports,
};
pub use report::{Report, ReportBuilder, ReportError};
pub use summary::{Breakdown, SurveySummaryPage};
pub use topics::TopicsPage;

/// Escape a value for use inside a Markdown table cell.
pub(crate) fn markdown_cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

/// Shorten `value` to at most `width` characters, marking the cut with `...`.
pub(crate) fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let kept: String = value.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_cell() {
        assert_eq!(markdown_cell("a | b\nc"), "a \\| b c");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer answer", 10), "a much ...");
        assert_eq!(truncate("a much longer answer", 10).chars().count(), 10);
    }
}
