//! The topics page.

use crate::markdown_cell;
use rigra_metrics::TopicGroup;
use serde::{Deserialize, Serialize};

/// Top words per topic, one group per feedback category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicsPage {
    /// Topic groups, `All` first
    pub groups: Vec<TopicGroup>,
}

impl TopicsPage {
    /// Wrap topic groups in a page.
    pub const fn new(groups: Vec<TopicGroup>) -> Self {
        Self { groups }
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str("Topics\n");
        output.push_str(&"=".repeat(80));
        output.push('\n');

        for group in &self.groups {
            output.push_str(&format!("\n{}:\n", group.category));
            output.push_str(&"-".repeat(80));
            output.push('\n');
            output.push_str(&format!("{:<8} {}\n", "Topic", "Top words"));
            for topic in &group.topics {
                output.push_str(&format!("{:<8} {}\n", topic.topic, topic.words.join(", ")));
            }
        }

        output.push_str(&"=".repeat(80));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("# Topics\n\n");
        for group in &self.groups {
            output.push_str(&format!("## {}\n\n", group.category));
            output.push_str("| Topic | Top words |\n");
            output.push_str("|-------|-----------|\n");
            for topic in &group.topics {
                output.push_str(&format!(
                    "| {} | {} |\n",
                    markdown_cell(&topic.topic),
                    markdown_cell(&topic.words.join(", "))
                ));
            }
            output.push('\n');
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigra_metrics::Topic;

    fn page() -> TopicsPage {
        TopicsPage::new(vec![
            TopicGroup {
                category: "All".to_string(),
                topics: vec![Topic {
                    topic: "0".to_string(),
                    words: vec!["repair".to_string(), "damp".to_string()],
                }],
            },
            TopicGroup {
                category: "Repairs".to_string(),
                topics: vec![Topic {
                    topic: "1".to_string(),
                    words: vec!["slow".to_string()],
                }],
            },
        ])
    }

    #[test]
    fn test_ascii_table() {
        let ascii = page().to_ascii_table();
        assert!(ascii.contains("\nAll:\n"));
        assert!(ascii.contains("0        repair, damp"));
        assert!(ascii.find("All:").unwrap() < ascii.find("Repairs:").unwrap());
    }

    #[test]
    fn test_markdown() {
        let md = page().to_markdown();
        assert!(md.contains("## Repairs"));
        assert!(md.contains("| 0 | repair, damp |"));
    }
}
