//! The feedback explorer page.

use crate::{markdown_cell, truncate};
use rigra_metrics::explorer::{DISPLAY_COLUMNS, explorer_rows};
use rigra_metrics::{ExplorerFilter, ExplorerRow, ExplorerView, Result, SentimentBreakdown};
use rigra_data::{Sentiment, SurveyTable};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the free-text column in the ASCII table.
const TEXT_WIDTH: usize = 44;

/// A filtered view of the free-text answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerPage {
    /// Applied filter
    pub filter: ExplorerFilter,
    /// Sentiment percentages of the matching answers
    pub breakdown: SentimentBreakdown,
    /// Point differences against the whole survey
    pub delta: SentimentBreakdown,
    /// Number of matching answers
    pub matching: usize,
    /// Matching answers, possibly limited to the first few
    pub rows: Vec<ExplorerRow>,
}

impl ExplorerPage {
    /// Build the page from an explorer view, keeping at most `max_rows` rows.
    pub fn from_view(view: &ExplorerView, max_rows: Option<usize>) -> Result<Self> {
        let mut rows = explorer_rows(&view.table)?;
        if let Some(limit) = max_rows {
            rows.truncate(limit);
        }
        Ok(Self {
            filter: view.filter.clone(),
            breakdown: view.breakdown,
            delta: view.delta(),
            matching: view.table.height(),
            rows,
        })
    }

    /// Whether some matching rows were left out.
    pub const fn is_truncated(&self) -> bool {
        self.rows.len() < self.matching
    }

    fn filter_lines(&self) -> Vec<(&'static str, String)> {
        let sentiments: Vec<&str> = self.filter.sentiments.iter().map(Sentiment::as_str).collect();
        vec![
            ("Category", self.filter.category.clone().unwrap_or_else(|| "All".to_string())),
            ("Building", self.filter.building.clone().unwrap_or_else(|| "All".to_string())),
            ("Sentiment", sentiments.join(", ")),
            ("Polarity", self.filter.polarity.to_string()),
            ("Subjectivity", self.filter.subjectivity.to_string()),
        ]
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str("Feedback Explorer\n");
        output.push_str(&"=".repeat(80));
        output.push('\n');

        for (label, value) in self.filter_lines() {
            output.push_str(&format!("{:<20} {}\n", format!("{}:", label), value));
        }

        output.push_str("\nSentiment:\n");
        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!("{:<20} {:>10} {:>10}\n", "", "Share", "Delta"));
        for sentiment in Sentiment::all() {
            output.push_str(&format!(
                "{:<20} {:>9}% {:>+10}\n",
                sentiment.as_str(),
                self.breakdown.get(sentiment),
                self.delta.get(sentiment)
            ));
        }

        output.push_str(&format!("\nMatching answers: {}", self.matching));
        if self.is_truncated() {
            output.push_str(&format!(" (showing {})", self.rows.len()));
        }
        output.push('\n');

        if !self.rows.is_empty() {
            output.push_str(&"-".repeat(80));
            output.push('\n');
            output.push_str(&format!(
                "{:<12} {:<10} {:<10} {}\n",
                "Resident", "Building", "Sentiment", "Feedback Response"
            ));
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for row in &self.rows {
                output.push_str(&format!(
                    "{:<12} {:<10} {:<10} {}\n",
                    truncate(&row.resident, 12),
                    truncate(&row.building_name, 10),
                    row.sentiment,
                    truncate(&row.feedback_response, TEXT_WIDTH)
                ));
            }
        }

        output.push_str(&"=".repeat(80));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Feedback Explorer\n\n");

        output.push_str("## Filter\n\n");
        for (label, value) in self.filter_lines() {
            output.push_str(&format!("- **{}:** {}\n", label, value));
        }
        output.push('\n');

        output.push_str("## Sentiment\n\n");
        output.push_str("| Sentiment | Share | Delta |\n");
        output.push_str("|-----------|------:|------:|\n");
        for sentiment in Sentiment::all() {
            output.push_str(&format!(
                "| {} | {}% | {:+} |\n",
                sentiment.as_str(),
                self.breakdown.get(sentiment),
                self.delta.get(sentiment)
            ));
        }
        output.push('\n');

        output.push_str(&format!("## Answers ({})\n\n", self.matching));
        if !self.rows.is_empty() {
            let headers: Vec<&str> = DISPLAY_COLUMNS.iter().map(|(_, display)| *display).collect();
            output.push_str(&format!("| {} |\n", headers.join(" | ")));
            output.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
            for row in &self.rows {
                let cells = [
                    &row.resident,
                    &row.building_name,
                    &row.building_floor,
                    &row.resident_length,
                    &row.category,
                    &row.sentiment,
                    &row.feedback_response,
                ];
                let cells: Vec<String> = cells.iter().map(|c| markdown_cell(c)).collect();
                output.push_str(&format!("| {} |\n", cells.join(" | ")));
            }
            if self.is_truncated() {
                output.push_str(&format!(
                    "\n_Showing {} of {} answers._\n",
                    self.rows.len(),
                    self.matching
                ));
            }
        }

        output
    }
}

impl fmt::Display for ExplorerPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Feedback Explorer: {} answers", self.matching)?;
        for sentiment in Sentiment::all() {
            writeln!(
                f,
                "  {}: {}% ({:+})",
                sentiment,
                self.breakdown.get(sentiment),
                self.delta.get(sentiment)
            )?;
        }
        Ok(())
    }
}
