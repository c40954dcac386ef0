//! Top words per topic per feedback category.

use crate::error::{MetricsError, Result};
use rigra_data::{SurveyTable, TopicTable};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// One topic and its top words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Topic identifier
    pub topic: String,
    /// Top words, in sheet order
    pub words: Vec<String>,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.topic, self.words.join(", "))
    }
}

/// Topics of one feedback category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicGroup {
    /// Feedback category (`All` for the model over every answer)
    pub category: String,
    /// Topics, ordered by identifier
    pub topics: Vec<Topic>,
}

impl TopicGroup {
    /// Whether this is the group modelled over every answer.
    pub fn is_all(&self) -> bool {
        self.category == TopicTable::ALL_CATEGORY
    }
}

/// Order topic identifiers numerically when both are integers, textually otherwise.
fn compare_topics(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Every topic group.
///
/// The `All` group comes first when present, followed by the other categories
/// in lexicographic order. Words keep their sheet row order.
pub fn topic_summary(table: &TopicTable) -> Result<Vec<TopicGroup>> {
    let df = table.frame();
    let categories = df.column(TopicTable::FEEDBACK_CATEGORY)?.str()?;
    let topics = df.column(TopicTable::TOPIC)?.str()?;
    let words = df.column(TopicTable::WORD)?.str()?;

    let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<String>>> = BTreeMap::new();
    for ((category, topic), word) in categories
        .into_iter()
        .zip(topics.into_iter())
        .zip(words.into_iter())
    {
        if let (Some(category), Some(topic), Some(word)) = (category, topic, word) {
            grouped
                .entry(category)
                .or_default()
                .entry(topic)
                .or_default()
                .push(word.to_string());
        }
    }

    let mut groups: Vec<TopicGroup> = grouped
        .into_iter()
        .map(|(category, topics)| {
            let mut topics: Vec<Topic> = topics
                .into_iter()
                .map(|(topic, words)| Topic {
                    topic: topic.to_string(),
                    words,
                })
                .collect();
            topics.sort_by(|a, b| compare_topics(&a.topic, &b.topic));
            TopicGroup {
                category: category.to_string(),
                topics,
            }
        })
        .collect();

    // Stable sort keeps the remaining categories in lexicographic order.
    groups.sort_by_key(|g| !g.is_all());
    Ok(groups)
}

/// Topics of one feedback category.
///
/// # Errors
/// Returns `MetricsError::MissingData` if the category has no topics.
pub fn topics_for_category(table: &TopicTable, category: &str) -> Result<TopicGroup> {
    topic_summary(table)?
        .into_iter()
        .find(|g| g.category == category)
        .ok_or_else(|| MetricsError::MissingData(format!("no topics for category '{}'", category)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigra_data::tables::TopicRecord;

    fn table(rows: &[(&str, &str, &str)]) -> TopicTable {
        let records: Vec<TopicRecord> = rows
            .iter()
            .map(|(c, t, w)| TopicRecord {
                feedback_category: c.to_string(),
                topic: t.to_string(),
                word: w.to_string(),
            })
            .collect();
        TopicTable::from_records(&records).unwrap()
    }

    #[test]
    fn test_all_first_then_lexicographic() {
        let t = table(&[
            ("Repairs", "0", "slow"),
            ("Cleaning", "0", "bins"),
            ("All", "0", "repair"),
            ("Communal Areas", "0", "lift"),
        ]);
        let groups = topic_summary(&t).unwrap();
        let categories: Vec<&str> = groups.iter().map(|g| g.category.as_str()).collect();
        assert_eq!(categories, ["All", "Cleaning", "Communal Areas", "Repairs"]);
    }

    #[test]
    fn test_words_keep_row_order() {
        let t = table(&[
            ("All", "1", "wait"),
            ("All", "0", "repair"),
            ("All", "1", "phone"),
            ("All", "0", "damp"),
        ]);
        let group = topics_for_category(&t, "All").unwrap();
        assert_eq!(group.topics[0].to_string(), "0: repair, damp");
        assert_eq!(group.topics[1].to_string(), "1: wait, phone");
    }

    #[test]
    fn test_numeric_topic_order() {
        let t = table(&[("All", "10", "a"), ("All", "2", "b"), ("All", "1", "c")]);
        let group = topics_for_category(&t, "All").unwrap();
        let ids: Vec<&str> = group.topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(ids, ["1", "2", "10"]);
    }

    #[test]
    fn test_missing_category() {
        let t = table(&[("Repairs", "0", "slow")]);
        assert!(matches!(
            topics_for_category(&t, "All"),
            Err(MetricsError::MissingData(_))
        ));
        assert!(!topic_summary(&t).unwrap()[0].is_all());
    }

    #[test]
    fn test_empty_table() {
        assert!(topic_summary(&table(&[])).unwrap().is_empty());
    }
}
