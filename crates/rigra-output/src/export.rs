//! CSV and JSON export of derived survey records.
//!
//! Every list a page shows can be written out on its own. Nested results
//! (per-building averages, topic words) have flat record types so that they fit
//! a CSV file, one row per value.

use crate::explorer::ExplorerPage;
use crate::summary::SurveySummaryPage;
use rigra_metrics::{
    BreakdownRow, BuildingAverages, CategoryAverage, ExplorerRow, FeedbackOverview, NpsBand,
    PolarityCount, QuestionMapping, ResidentOverview, TopicGroup,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::PrettyJson => "pretty-json",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Average score of one question category in one building, flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingAverageRecord {
    /// Building name
    pub building: String,
    /// Question category
    pub category: String,
    /// Average score
    pub score: f64,
    /// NPS band of the average
    pub band: NpsBand,
}

impl BuildingAverageRecord {
    /// Flatten per-building averages into one record per building and category.
    pub fn flatten(buildings: &[BuildingAverages]) -> Vec<Self> {
        buildings
            .iter()
            .flat_map(|b| {
                b.averages.iter().map(|avg| Self {
                    building: b.building.clone(),
                    category: avg.category.clone(),
                    score: avg.score,
                    band: avg.band,
                })
            })
            .collect()
    }
}

/// One top word of one topic, flattened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicWordRecord {
    /// Feedback category
    pub category: String,
    /// Topic identifier
    pub topic: String,
    /// Position of the word within its topic, starting at 1
    pub rank: usize,
    /// The word
    pub word: String,
}

impl TopicWordRecord {
    /// Flatten topic groups into one record per word.
    pub fn flatten(groups: &[TopicGroup]) -> Vec<Self> {
        groups
            .iter()
            .flat_map(|g| {
                g.topics.iter().flat_map(move |t| {
                    t.words.iter().enumerate().map(move |(i, word)| Self {
                        category: g.category.clone(),
                        topic: t.topic.clone(),
                        rank: i + 1,
                        word: word.clone(),
                    })
                })
            })
            .collect()
    }
}

/// Trait for types that can be exported.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn records_to_string<T: Serialize>(
    records: &[T],
    format: ExportFormat,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            for record in records {
                wtr.serialize(record)?;
            }
            let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
            String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
        }
        ExportFormat::Json => Ok(serde_json::to_string(records)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(records)?),
    }
}

fn record_to_string<T: Serialize>(record: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => records_to_string(std::slice::from_ref(record), format),
        ExportFormat::Json => Ok(serde_json::to_string(record)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(record)?),
    }
}

macro_rules! impl_list_exporter {
    ($($record:ty),* $(,)?) => {
        $(
            impl Exporter for Vec<$record> {
                fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
                    records_to_string(self, format)
                }
            }
        )*
    };
}

macro_rules! impl_record_exporter {
    ($($record:ty),* $(,)?) => {
        $(
            impl Exporter for $record {
                fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
                    record_to_string(self, format)
                }
            }
        )*
    };
}

impl_list_exporter!(
    BreakdownRow,
    CategoryAverage,
    BuildingAverageRecord,
    QuestionMapping,
    PolarityCount,
    TopicWordRecord,
    ExplorerRow,
);

impl_record_exporter!(ResidentOverview, FeedbackOverview);

/// Write every list of a summary page (and optionally an explorer page) into `dir`.
///
/// The directory is created if missing. Returns the written paths in order.
///
/// # Errors
///
/// Returns an error if serialization or file writing fails.
pub fn write_page_exports(
    summary: &SurveySummaryPage,
    explorer: Option<&ExplorerPage>,
    dir: &Path,
    format: ExportFormat,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    let mut write = |stem: &str, data: &dyn Exporter| -> Result<(), ExportError> {
        let path = dir.join(format!("{}.{}", stem, format.extension()));
        data.export_to_file(&path, format)?;
        written.push(path);
        Ok(())
    };

    write("residents", &summary.residents)?;
    for b in &summary.breakdowns {
        write(&format!("breakdown_{}", b.kind.as_str()), &b.rows)?;
    }
    write("feedback", &summary.feedback)?;
    write("category_averages", &summary.category_averages)?;
    write(
        "building_averages",
        &BuildingAverageRecord::flatten(&summary.building_averages),
    )?;
    write("questions", &summary.question_mapping)?;
    write("polarity", &summary.polarity)?;
    write("topics", &TopicWordRecord::flatten(&summary.topics))?;
    if let Some(page) = explorer {
        write("explorer_rows", &page.rows)?;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigra_metrics::Topic;
    use rstest::rstest;

    fn averages() -> Vec<CategoryAverage> {
        vec![
            CategoryAverage {
                category: "Cleaning".to_string(),
                score: 4.5,
                band: NpsBand::Positive,
            },
            CategoryAverage {
                category: "Repairs".to_string(),
                score: 2.75,
                band: NpsBand::Negative,
            },
        ]
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("JSON", ExportFormat::Json)]
    #[case("pretty-json", ExportFormat::PrettyJson)]
    #[case("pretty_json", ExportFormat::PrettyJson)]
    fn test_format_from_str(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_format_rejects_unknown() {
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }

    #[test]
    fn test_category_averages_csv() {
        let csv = averages().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "category,score,band");
        assert_eq!(lines[1], "Cleaning,4.5,positive");
        assert_eq!(lines[2], "Repairs,2.75,negative");
    }

    #[test]
    fn test_category_averages_json() {
        let json = averages().export_to_string(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[1]["band"], "negative");
    }

    #[test]
    fn test_explorer_rows_use_display_headers() {
        let rows = vec![ExplorerRow {
            resident: "Tenant".to_string(),
            building_name: "Alpha".to_string(),
            building_floor: "2".to_string(),
            resident_length: "1-5 years".to_string(),
            category: "Repairs".to_string(),
            sentiment: "negative".to_string(),
            feedback_response: "Slow, and noisy".to_string(),
        }];
        let csv = rows.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.starts_with(
            "Resident,Building Name,Building Floor,Length of Residency,Category,Sentiment Category,Feedback Response"
        ));
        assert!(csv.contains("\"Slow, and noisy\""));
    }

    #[test]
    fn test_single_record_csv() {
        let overview = ResidentOverview {
            all: 159,
            contactable: 140,
            leaseholder_pct: 60,
            non_resident_leaseholder_pct: 9,
            tenant_pct: 31,
        };
        let csv = overview.export_to_string(ExportFormat::Csv).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.lines().nth(1).unwrap().starts_with("159,140,60"));
    }

    #[test]
    fn test_flatten_topics() {
        let groups = vec![TopicGroup {
            category: "All".to_string(),
            topics: vec![Topic {
                topic: "0".to_string(),
                words: vec!["repair".to_string(), "damp".to_string()],
            }],
        }];
        let records = TopicWordRecord::flatten(&groups);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].rank, 2);
        assert_eq!(records[1].word, "damp");
    }

    #[test]
    fn test_flatten_buildings() {
        let buildings = vec![BuildingAverages {
            building: "Alpha".to_string(),
            averages: averages(),
        }];
        let records = BuildingAverageRecord::flatten(&buildings);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.building == "Alpha"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("averages.json");
        averages()
            .export_to_file(&path, ExportFormat::PrettyJson)
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Repairs\""));
    }
}
