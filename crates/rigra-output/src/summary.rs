//! The survey summary page.

use crate::markdown_cell;
use rigra_data::{SummaryType, SurveyData};
use rigra_metrics::feedback::{
    average_by_category, averages_by_building, feedback_overview, question_mapping,
};
use rigra_metrics::sentiment::{polarity_counts, sentiment_breakdown};
use rigra_metrics::summary::{breakdown, resident_overview};
use rigra_metrics::topics::topic_summary;
use rigra_metrics::util::round_to;
use rigra_metrics::{
    BreakdownRow, BuildingAverages, CategoryAverage, FeedbackOverview, NpsBand, PolarityCount,
    QuestionMapping, ResidentOverview, Result, SentimentBreakdown, TopicGroup,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary types broken down on the page, in display order.
const BREAKDOWN_TYPES: [SummaryType; 4] = [
    SummaryType::ResidentType,
    SummaryType::BuildingName,
    SummaryType::BuildingFloor,
    SummaryType::ResidentLength,
];

/// Response counts of one summary type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Summary type
    pub kind: SummaryType,
    /// `(description, number)` rows, ascending by description
    pub rows: Vec<BreakdownRow>,
}

/// Everything shown on the survey summary page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveySummaryPage {
    /// Response counts and resident-type shares
    pub residents: ResidentOverview,
    /// Counts per summary type; types without rows are left out
    pub breakdowns: Vec<Breakdown>,
    /// Mean score and NPS band shares
    pub feedback: FeedbackOverview,
    /// Average score per question category
    pub category_averages: Vec<CategoryAverage>,
    /// Average score per question category, per building
    pub building_averages: Vec<BuildingAverages>,
    /// Question text per category
    pub question_mapping: Vec<QuestionMapping>,
    /// Sentiment shares of the free-text answers
    pub sentiment: SentimentBreakdown,
    /// Positive and negative answers per feedback category
    pub polarity: Vec<PolarityCount>,
    /// Top words per topic
    pub topics: Vec<TopicGroup>,
}

impl SurveySummaryPage {
    /// Compute the page from a loaded survey.
    ///
    /// # Errors
    /// Fails on the first metric that fails; no partial page is returned.
    pub fn compute(data: &SurveyData) -> Result<Self> {
        let mut breakdowns = Vec::new();
        for kind in BREAKDOWN_TYPES {
            let rows = breakdown(&data.summary, kind)?;
            if !rows.is_empty() {
                breakdowns.push(Breakdown { kind, rows });
            }
        }

        Ok(Self {
            residents: resident_overview(&data.summary)?,
            breakdowns,
            feedback: feedback_overview(&data.feedback)?,
            category_averages: average_by_category(&data.feedback)?,
            building_averages: averages_by_building(&data.feedback)?,
            question_mapping: question_mapping(&data.feedback)?,
            sentiment: sentiment_breakdown(&data.sentiment)?,
            polarity: polarity_counts(&data.sentiment)?,
            topics: topic_summary(&data.topics)?,
        })
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str("Resident Survey Summary\n");
        output.push_str(&"=".repeat(80));
        output.push('\n');

        let r = &self.residents;
        output.push_str(&format!("{:<40} {:>10}\n", "Responses:", r.all));
        output.push_str(&format!("{:<40} {:>10}\n", "Contactable:", r.contactable));
        output.push_str(&format!("{:<40} {:>9}%\n", "Leaseholders:", r.leaseholder_pct));
        output.push_str(&format!(
            "{:<40} {:>9}%\n",
            "Non-resident leaseholders:", r.non_resident_leaseholder_pct
        ));
        output.push_str(&format!("{:<40} {:>9}%\n", "Tenants:", r.tenant_pct));

        for b in &self.breakdowns {
            output.push_str(&format!("\n{}:\n", b.kind.title()));
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for row in &b.rows {
                output.push_str(&format!("{:<60} {:>10}\n", row.description, row.number));
            }
        }

        output.push_str("\nFeedback:\n");
        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!("{:<40} {:>10}\n", "Responses:", self.feedback.responses));
        output.push_str(&format!("{:<40} {:>10.1}\n", "Mean score:", self.feedback.mean_score));
        for band in NpsBand::all() {
            output.push_str(&format!(
                "{:<40} {:>9}%\n",
                format!("{} ({}):", capitalise(band.as_str()), band.caption()),
                self.feedback.percent(band)
            ));
        }

        if !self.category_averages.is_empty() {
            output.push_str("\nAverage Score by Category:\n");
            output.push_str(&"-".repeat(80));
            output.push('\n');
            output.push_str(&format!("{:<50} {:>10} {:>12}\n", "Category", "Score", "Band"));
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for avg in &self.category_averages {
                output.push_str(&format!(
                    "{:<50} {:>10.1} {:>12}\n",
                    avg.category,
                    round_to(avg.score, 1),
                    avg.band.as_str()
                ));
            }
        }

        if !self.building_averages.is_empty() {
            output.push_str("\nAverage Score by Building:\n");
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for building in &self.building_averages {
                output.push_str(&format!("{}\n", building.building));
                for avg in &building.averages {
                    output.push_str(&format!(
                        "  {:<48} {:>10.1} {:>12}\n",
                        avg.category,
                        round_to(avg.score, 1),
                        avg.band.as_str()
                    ));
                }
            }
        }

        if !self.question_mapping.is_empty() {
            output.push_str("\nQuestions:\n");
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for q in &self.question_mapping {
                output.push_str(&format!("{:<30} {}\n", q.category, q.question));
            }
        }

        output.push_str("\nSentiment:\n");
        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!("{:<40} {:>9}%\n", "Positive:", self.sentiment.positive));
        output.push_str(&format!("{:<40} {:>9}%\n", "Neutral:", self.sentiment.neutral));
        output.push_str(&format!("{:<40} {:>9}%\n", "Negative:", self.sentiment.negative));

        if !self.polarity.is_empty() {
            output.push('\n');
            output.push_str(&format!(
                "{:<40} {:>10} {:>10} {:>10}\n",
                "Category", "Positive", "Negative", "Net"
            ));
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for p in &self.polarity {
                output.push_str(&format!(
                    "{:<40} {:>10} {:>10} {:>+10}\n",
                    p.category,
                    p.positive,
                    p.negative,
                    p.net()
                ));
            }
        }

        if !self.topics.is_empty() {
            output.push_str("\nTopics:\n");
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for group in &self.topics {
                output.push_str(&format!("{}\n", group.category));
                for topic in &group.topics {
                    output.push_str(&format!("  {}\n", topic));
                }
            }
        }

        output.push_str(&"=".repeat(80));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Resident Survey Summary\n\n");

        let r = &self.residents;
        output.push_str("## Responses\n\n");
        output.push_str(&format!("- **Responses:** {}\n", r.all));
        output.push_str(&format!("- **Contactable:** {}\n", r.contactable));
        output.push_str(&format!("- **Leaseholders:** {}%\n", r.leaseholder_pct));
        output.push_str(&format!(
            "- **Non-resident leaseholders:** {}%\n",
            r.non_resident_leaseholder_pct
        ));
        output.push_str(&format!("- **Tenants:** {}%\n\n", r.tenant_pct));

        for b in &self.breakdowns {
            output.push_str(&format!("### {}\n\n", b.kind.title()));
            output.push_str("| Description | Number |\n");
            output.push_str("|-------------|-------:|\n");
            for row in &b.rows {
                output.push_str(&format!(
                    "| {} | {} |\n",
                    markdown_cell(&row.description),
                    row.number
                ));
            }
            output.push('\n');
        }

        output.push_str("## Feedback\n\n");
        output.push_str(&format!("- **Responses:** {}\n", self.feedback.responses));
        output.push_str(&format!("- **Mean score:** {:.1}\n", self.feedback.mean_score));
        for band in NpsBand::all() {
            output.push_str(&format!(
                "- **{}** ({}): {}%\n",
                capitalise(band.as_str()),
                band.caption(),
                self.feedback.percent(band)
            ));
        }
        output.push('\n');

        if !self.category_averages.is_empty() {
            output.push_str("### Average Score by Category\n\n");
            output.push_str("| Category | Score | Band |\n");
            output.push_str("|----------|------:|------|\n");
            for avg in &self.category_averages {
                output.push_str(&format!(
                    "| {} | {:.1} | {} |\n",
                    markdown_cell(&avg.category),
                    round_to(avg.score, 1),
                    avg.band
                ));
            }
            output.push('\n');
        }

        if !self.building_averages.is_empty() {
            output.push_str("### Average Score by Building\n\n");
            output.push_str("| Building | Category | Score | Band |\n");
            output.push_str("|----------|----------|------:|------|\n");
            for building in &self.building_averages {
                for avg in &building.averages {
                    output.push_str(&format!(
                        "| {} | {} | {:.1} | {} |\n",
                        markdown_cell(&building.building),
                        markdown_cell(&avg.category),
                        round_to(avg.score, 1),
                        avg.band
                    ));
                }
            }
            output.push('\n');
        }

        if !self.question_mapping.is_empty() {
            output.push_str("### Questions\n\n");
            output.push_str("| Category | Question |\n");
            output.push_str("|----------|----------|\n");
            for q in &self.question_mapping {
                output.push_str(&format!(
                    "| {} | {} |\n",
                    markdown_cell(&q.category),
                    markdown_cell(&q.question)
                ));
            }
            output.push('\n');
        }

        output.push_str("## Sentiment\n\n");
        output.push_str(&format!("- **Positive:** {}%\n", self.sentiment.positive));
        output.push_str(&format!("- **Neutral:** {}%\n", self.sentiment.neutral));
        output.push_str(&format!("- **Negative:** {}%\n\n", self.sentiment.negative));

        if !self.polarity.is_empty() {
            output.push_str("| Category | Positive | Negative | Net |\n");
            output.push_str("|----------|---------:|---------:|----:|\n");
            for p in &self.polarity {
                output.push_str(&format!(
                    "| {} | {} | {} | {:+} |\n",
                    markdown_cell(&p.category),
                    p.positive,
                    p.negative,
                    p.net()
                ));
            }
            output.push('\n');
        }

        if !self.topics.is_empty() {
            output.push_str("## Topics\n\n");
            for group in &self.topics {
                output.push_str(&format!("### {}\n\n", group.category));
                for topic in &group.topics {
                    output.push_str(&format!("- **{}:** {}\n", topic.topic, topic.words.join(", ")));
                }
                output.push('\n');
            }
        }

        output
    }
}

impl fmt::Display for SurveySummaryPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resident Survey Summary")?;
        writeln!(
            f,
            "  Responses: {} ({} contactable)",
            self.residents.all, self.residents.contactable
        )?;
        writeln!(f, "  Mean score: {:.1}", self.feedback.mean_score)?;
        writeln!(
            f,
            "  Feedback: {}% positive, {}% neutral, {}% negative",
            self.feedback.positive_pct, self.feedback.neutral_pct, self.feedback.negative_pct
        )?;
        writeln!(
            f,
            "  Sentiment: {}% positive, {}% neutral, {}% negative",
            self.sentiment.positive, self.sentiment.neutral, self.sentiment.negative
        )?;
        Ok(())
    }
}

fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigra_metrics::Topic;

    fn page() -> SurveySummaryPage {
        SurveySummaryPage {
            residents: ResidentOverview {
                all: 159,
                contactable: 140,
                leaseholder_pct: 60,
                non_resident_leaseholder_pct: 9,
                tenant_pct: 31,
            },
            breakdowns: vec![Breakdown {
                kind: SummaryType::BuildingName,
                rows: vec![
                    BreakdownRow {
                        description: "Alpha House".to_string(),
                        number: 90,
                    },
                    BreakdownRow {
                        description: "Beta | Court".to_string(),
                        number: 69,
                    },
                ],
            }],
            feedback: FeedbackOverview {
                responses: 159,
                mean_score: 3.8,
                positive_pct: 20,
                neutral_pct: 40,
                negative_pct: 40,
            },
            category_averages: vec![CategoryAverage {
                category: "Repairs".to_string(),
                score: 2.75,
                band: NpsBand::Negative,
            }],
            building_averages: vec![BuildingAverages {
                building: "Alpha House".to_string(),
                averages: vec![CategoryAverage {
                    category: "Repairs".to_string(),
                    score: 4.5,
                    band: NpsBand::Positive,
                }],
            }],
            question_mapping: vec![QuestionMapping {
                category: "Repairs".to_string(),
                question: "How satisfied are you with repairs?".to_string(),
            }],
            sentiment: SentimentBreakdown {
                positive: 60,
                neutral: 30,
                negative: 10,
            },
            polarity: vec![PolarityCount {
                category: "Repairs".to_string(),
                positive: 2,
                negative: 5,
            }],
            topics: vec![TopicGroup {
                category: "All".to_string(),
                topics: vec![Topic {
                    topic: "0".to_string(),
                    words: vec!["repair".to_string(), "damp".to_string()],
                }],
            }],
        }
    }

    #[test]
    fn test_ascii_table() {
        let ascii = page().to_ascii_table();
        assert!(ascii.starts_with(&"=".repeat(80)));
        assert!(ascii.contains("Resident Survey Summary"));
        assert!(ascii.contains("Building Name:"));
        assert!(ascii.contains("Neutral (Score 3 to 4):"));
        assert!(ascii.contains("2.8"));
        assert!(ascii.contains("-3"));
        assert!(ascii.contains("  0: repair, damp"));
    }

    #[test]
    fn test_markdown() {
        let md = page().to_markdown();
        assert!(md.contains("# Resident Survey Summary"));
        assert!(md.contains("### Building Name"));
        assert!(md.contains("| Beta \\| Court | 69 |"));
        assert!(md.contains("- **Positive** (Score above 4): 20%"));
        assert!(md.contains("| Alpha House | Repairs | 4.5 | positive |"));
        assert!(md.contains("- **0:** repair, damp"));
    }

    #[test]
    fn test_display() {
        let text = page().to_string();
        assert!(text.contains("Responses: 159 (140 contactable)"));
        assert!(text.contains("Sentiment: 60% positive, 30% neutral, 10% negative"));
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(page()).unwrap();
        assert_eq!(json["residents"]["all"], 159);
        assert_eq!(json["breakdowns"][0]["kind"], "building_name");
        assert_eq!(json["category_averages"][0]["band"], "negative");
    }

    #[test]
    fn test_capitalise() {
        assert_eq!(capitalise("neutral"), "Neutral");
        assert_eq!(capitalise(""), "");
    }
}
