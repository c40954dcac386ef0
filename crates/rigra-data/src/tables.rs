//! Typed survey tables.
//!
//! Each table is a thin wrapper around a polars [`DataFrame`] whose columns,
//! dtypes and value ranges are checked when the table is built. Tables are
//! immutable: derived views (filters, projections) produce new frames.

use crate::error::{DataError, Result};
use crate::schema::{SheetKind, SummaryType};
use polars::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Storage type of a contract column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// UTF-8 text
    Text,
    /// 64-bit integer
    Integer,
    /// 64-bit float
    Float,
}

impl ColumnType {
    fn dtype(self) -> DataType {
        match self {
            Self::Text => DataType::String,
            Self::Integer => DataType::Int64,
            Self::Float => DataType::Float64,
        }
    }
}

/// Common behaviour of the four survey tables.
pub trait SurveyTable: Sized {
    /// Sheet this table is loaded from.
    const SHEET: SheetKind;

    /// Contract columns, in canonical order.
    const COLUMNS: &'static [(&'static str, ColumnType)];

    /// Row record used when decoding CSV payloads.
    type Record: DeserializeOwned + Serialize;

    /// Build the table from decoded records.
    fn from_records(records: &[Self::Record]) -> Result<Self>;

    /// Build the table from an existing frame, validating the contract.
    fn from_frame(df: DataFrame) -> Result<Self>;

    /// Borrow the underlying frame.
    fn frame(&self) -> &DataFrame;

    /// Consume the table, returning the underlying frame.
    fn into_frame(self) -> DataFrame;

    /// A lazy view over the table.
    fn lazy(&self) -> LazyFrame {
        self.frame().clone().lazy()
    }

    /// Number of rows.
    fn height(&self) -> usize {
        self.frame().height()
    }

    /// Whether the table has no rows.
    fn is_empty(&self) -> bool {
        self.height() == 0
    }

    /// Decode a CSV payload (with header row) into the table.
    fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|source| DataError::Csv {
                sheet: Self::SHEET,
                source,
            })?
            .clone();

        for (column, _) in Self::COLUMNS {
            if !headers.iter().any(|h| h == *column) {
                return Err(DataError::MissingColumn {
                    sheet: Self::SHEET,
                    column: (*column).to_string(),
                });
            }
        }

        let records = rdr
            .deserialize::<Self::Record>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|source| DataError::Csv {
                sheet: Self::SHEET,
                source,
            })?;

        Self::from_records(&records)
    }

    /// Decode a CSV payload held in memory.
    fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_csv_reader(text.as_bytes())
    }
}

/// Select the contract columns in canonical order, cast them and reject nulls.
fn normalize(
    df: DataFrame,
    sheet: SheetKind,
    columns: &[(&'static str, ColumnType)],
) -> Result<DataFrame> {
    for (name, _) in columns {
        if df.column(name).is_err() {
            return Err(DataError::MissingColumn {
                sheet,
                column: (*name).to_string(),
            });
        }
    }

    let exprs: Vec<Expr> = columns
        .iter()
        .map(|(name, kind)| col(*name).cast(kind.dtype()))
        .collect();
    let out = df.lazy().select(exprs).collect()?;

    for (name, _) in columns {
        let column = out.column(name)?;
        if column.null_count() > 0 {
            let row = column
                .as_materialized_series()
                .is_null()
                .into_iter()
                .position(|v| v == Some(true))
                .unwrap_or_default();
            return Err(DataError::InvalidValue {
                sheet,
                row,
                reason: format!("'{}' is empty or not a valid {:?}", name, columns_kind(columns, name)),
            });
        }
    }

    Ok(out)
}

fn columns_kind(columns: &[(&'static str, ColumnType)], name: &str) -> ColumnType {
    columns
        .iter()
        .find(|(n, _)| *n == name)
        .map_or(ColumnType::Text, |(_, k)| *k)
}

/// Reject any value of a float column outside `[lo, hi]`.
fn check_bounds(df: &DataFrame, sheet: SheetKind, column: &str, lo: f64, hi: f64) -> Result<()> {
    let values = df.column(column)?.f64()?;
    for (row, value) in values.into_iter().enumerate() {
        if let Some(v) = value
            && !(lo..=hi).contains(&v)
        {
            return Err(DataError::InvalidValue {
                sheet,
                row,
                reason: format!("{} = {} outside [{}, {}]", column, v, lo, hi),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// A row of the summary sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Summary type (`Type` column)
    #[serde(rename = "Type")]
    pub kind: String,
    /// Category label (`Description` column)
    #[serde(rename = "Description")]
    pub description: String,
    /// Respondent count (`Number` column)
    #[serde(rename = "Number")]
    pub number: i64,
}

impl SummaryRecord {
    /// Create a summary row.
    pub fn new(kind: SummaryType, description: impl Into<String>, number: i64) -> Self {
        Self {
            kind: kind.as_str().to_string(),
            description: description.into(),
            number,
        }
    }
}

/// Precomputed category counts: `Type`, `Description`, `Number`.
#[derive(Debug, Clone)]
pub struct SummaryTable(DataFrame);

impl SummaryTable {
    /// `Type` column name.
    pub const TYPE: &'static str = "Type";
    /// `Description` column name.
    pub const DESCRIPTION: &'static str = "Description";
    /// `Number` column name.
    pub const NUMBER: &'static str = "Number";
}

impl SurveyTable for SummaryTable {
    const SHEET: SheetKind = SheetKind::Summary;
    const COLUMNS: &'static [(&'static str, ColumnType)] = &[
        (Self::TYPE, ColumnType::Text),
        (Self::DESCRIPTION, ColumnType::Text),
        (Self::NUMBER, ColumnType::Integer),
    ];
    type Record = SummaryRecord;

    fn from_records(records: &[Self::Record]) -> Result<Self> {
        let kinds: Vec<&str> = records.iter().map(|r| r.kind.as_str()).collect();
        let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        let numbers: Vec<i64> = records.iter().map(|r| r.number).collect();

        let df = DataFrame::new(vec![
            Series::new(Self::TYPE.into(), kinds).into(),
            Series::new(Self::DESCRIPTION.into(), descriptions).into(),
            Series::new(Self::NUMBER.into(), numbers).into(),
        ])?;

        Self::from_frame(df)
    }

    fn from_frame(df: DataFrame) -> Result<Self> {
        let mut df = normalize(df, Self::SHEET, Self::COLUMNS)?;

        // Lookups match the canonical spelling, so `All` is stored as `all`.
        let mut canonical: Vec<Option<&'static str>> = Vec::with_capacity(df.height());
        for (row, kind) in df.column(Self::TYPE)?.str()?.into_iter().enumerate() {
            let kind = match kind {
                Some(kind) => match kind.parse::<SummaryType>() {
                    Ok(parsed) => Some(parsed.as_str()),
                    Err(_) => {
                        return Err(DataError::InvalidValue {
                            sheet: Self::SHEET,
                            row,
                            reason: format!("unknown Type '{}'", kind),
                        });
                    }
                },
                None => None,
            };
            canonical.push(kind);
        }
        df.with_column(Series::new(Self::TYPE.into(), canonical))?;

        let numbers = df.column(Self::NUMBER)?.i64()?;
        for (row, number) in numbers.into_iter().enumerate() {
            if let Some(n) = number
                && n < 0
            {
                return Err(DataError::InvalidValue {
                    sheet: Self::SHEET,
                    row,
                    reason: format!("Number = {} is negative", n),
                });
            }
        }

        Ok(Self(df))
    }

    fn frame(&self) -> &DataFrame {
        &self.0
    }

    fn into_frame(self) -> DataFrame {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Feedback
// ---------------------------------------------------------------------------

/// A row of the feedback sheet: one answer to one scored question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Survey response identifier
    pub response_id: i64,
    /// Resident type of the respondent
    pub resident_type: String,
    /// Building of the respondent
    pub building_name: String,
    /// Floor of the respondent
    pub building_floor: String,
    /// Length of residency of the respondent
    pub resident_length: String,
    /// Category of the question
    pub question_category: String,
    /// Question text
    pub question: String,
    /// Score between 1 (worst) and 5 (best)
    pub feedback_score: f64,
}

/// Per-question feedback scores.
#[derive(Debug, Clone)]
pub struct FeedbackTable(DataFrame);

impl FeedbackTable {
    /// `response_id` column name.
    pub const RESPONSE_ID: &'static str = "response_id";
    /// `question_category` column name.
    pub const QUESTION_CATEGORY: &'static str = "question_category";
    /// `question` column name.
    pub const QUESTION: &'static str = "question";
    /// `feedback_score` column name.
    pub const FEEDBACK_SCORE: &'static str = "feedback_score";
    /// Lowest valid score.
    pub const MIN_SCORE: f64 = 1.0;
    /// Highest valid score.
    pub const MAX_SCORE: f64 = 5.0;
}

impl SurveyTable for FeedbackTable {
    const SHEET: SheetKind = SheetKind::Feedback;
    const COLUMNS: &'static [(&'static str, ColumnType)] = &[
        (Self::RESPONSE_ID, ColumnType::Integer),
        ("resident_type", ColumnType::Text),
        ("building_name", ColumnType::Text),
        ("building_floor", ColumnType::Text),
        ("resident_length", ColumnType::Text),
        (Self::QUESTION_CATEGORY, ColumnType::Text),
        (Self::QUESTION, ColumnType::Text),
        (Self::FEEDBACK_SCORE, ColumnType::Float),
    ];
    type Record = FeedbackRecord;

    fn from_records(records: &[Self::Record]) -> Result<Self> {
        let ids: Vec<i64> = records.iter().map(|r| r.response_id).collect();
        let resident_types: Vec<&str> = records.iter().map(|r| r.resident_type.as_str()).collect();
        let buildings: Vec<&str> = records.iter().map(|r| r.building_name.as_str()).collect();
        let floors: Vec<&str> = records.iter().map(|r| r.building_floor.as_str()).collect();
        let lengths: Vec<&str> = records.iter().map(|r| r.resident_length.as_str()).collect();
        let categories: Vec<&str> = records
            .iter()
            .map(|r| r.question_category.as_str())
            .collect();
        let questions: Vec<&str> = records.iter().map(|r| r.question.as_str()).collect();
        let scores: Vec<f64> = records.iter().map(|r| r.feedback_score).collect();

        let df = DataFrame::new(vec![
            Series::new(Self::RESPONSE_ID.into(), ids).into(),
            Series::new("resident_type".into(), resident_types).into(),
            Series::new("building_name".into(), buildings).into(),
            Series::new("building_floor".into(), floors).into(),
            Series::new("resident_length".into(), lengths).into(),
            Series::new(Self::QUESTION_CATEGORY.into(), categories).into(),
            Series::new(Self::QUESTION.into(), questions).into(),
            Series::new(Self::FEEDBACK_SCORE.into(), scores).into(),
        ])?;

        Self::from_frame(df)
    }

    fn from_frame(df: DataFrame) -> Result<Self> {
        let df = normalize(df, Self::SHEET, Self::COLUMNS)?;
        check_bounds(
            &df,
            Self::SHEET,
            Self::FEEDBACK_SCORE,
            Self::MIN_SCORE,
            Self::MAX_SCORE,
        )?;
        Ok(Self(df))
    }

    fn frame(&self) -> &DataFrame {
        &self.0
    }

    fn into_frame(self) -> DataFrame {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// A row of the sentiment sheet: one free-text answer and its analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    /// Survey response identifier
    pub response_id: i64,
    /// Resident type of the respondent
    pub resident_type: String,
    /// Building of the respondent
    pub building_name: String,
    /// Floor of the respondent
    pub building_floor: String,
    /// Length of residency of the respondent
    pub resident_length: String,
    /// Category of the free-text question
    pub feedback_category: String,
    /// Sentiment label (`positive`, `neutral` or `negative`)
    pub sentiment: String,
    /// Polarity in [-1, 1]
    pub polarity: f64,
    /// Subjectivity in [0, 1]
    pub subjectivity: f64,
    /// The answer text
    pub free_text: String,
}

/// Sentiment-tagged free-text answers.
#[derive(Debug, Clone)]
pub struct SentimentTable(DataFrame);

impl SentimentTable {
    /// `response_id` column name.
    pub const RESPONSE_ID: &'static str = "response_id";
    /// `feedback_category` column name.
    pub const FEEDBACK_CATEGORY: &'static str = "feedback_category";
    /// `sentiment` column name.
    pub const SENTIMENT: &'static str = "sentiment";
    /// `polarity` column name.
    pub const POLARITY: &'static str = "polarity";
    /// `subjectivity` column name.
    pub const SUBJECTIVITY: &'static str = "subjectivity";
    /// `free_text` column name.
    pub const FREE_TEXT: &'static str = "free_text";
}

impl SurveyTable for SentimentTable {
    const SHEET: SheetKind = SheetKind::Sentiment;
    const COLUMNS: &'static [(&'static str, ColumnType)] = &[
        (Self::RESPONSE_ID, ColumnType::Integer),
        ("resident_type", ColumnType::Text),
        ("building_name", ColumnType::Text),
        ("building_floor", ColumnType::Text),
        ("resident_length", ColumnType::Text),
        (Self::FEEDBACK_CATEGORY, ColumnType::Text),
        (Self::SENTIMENT, ColumnType::Text),
        (Self::POLARITY, ColumnType::Float),
        (Self::SUBJECTIVITY, ColumnType::Float),
        (Self::FREE_TEXT, ColumnType::Text),
    ];
    type Record = SentimentRecord;

    fn from_records(records: &[Self::Record]) -> Result<Self> {
        let ids: Vec<i64> = records.iter().map(|r| r.response_id).collect();
        let resident_types: Vec<&str> = records.iter().map(|r| r.resident_type.as_str()).collect();
        let buildings: Vec<&str> = records.iter().map(|r| r.building_name.as_str()).collect();
        let floors: Vec<&str> = records.iter().map(|r| r.building_floor.as_str()).collect();
        let lengths: Vec<&str> = records.iter().map(|r| r.resident_length.as_str()).collect();
        let categories: Vec<&str> = records
            .iter()
            .map(|r| r.feedback_category.as_str())
            .collect();
        let sentiments: Vec<&str> = records.iter().map(|r| r.sentiment.as_str()).collect();
        let polarities: Vec<f64> = records.iter().map(|r| r.polarity).collect();
        let subjectivities: Vec<f64> = records.iter().map(|r| r.subjectivity).collect();
        let texts: Vec<&str> = records.iter().map(|r| r.free_text.as_str()).collect();

        let df = DataFrame::new(vec![
            Series::new(Self::RESPONSE_ID.into(), ids).into(),
            Series::new("resident_type".into(), resident_types).into(),
            Series::new("building_name".into(), buildings).into(),
            Series::new("building_floor".into(), floors).into(),
            Series::new("resident_length".into(), lengths).into(),
            Series::new(Self::FEEDBACK_CATEGORY.into(), categories).into(),
            Series::new(Self::SENTIMENT.into(), sentiments).into(),
            Series::new(Self::POLARITY.into(), polarities).into(),
            Series::new(Self::SUBJECTIVITY.into(), subjectivities).into(),
            Series::new(Self::FREE_TEXT.into(), texts).into(),
        ])?;

        Self::from_frame(df)
    }

    fn from_frame(df: DataFrame) -> Result<Self> {
        let df = normalize(df, Self::SHEET, Self::COLUMNS)?;
        check_bounds(&df, Self::SHEET, Self::POLARITY, -1.0, 1.0)?;
        check_bounds(&df, Self::SHEET, Self::SUBJECTIVITY, 0.0, 1.0)?;
        Ok(Self(df))
    }

    fn frame(&self) -> &DataFrame {
        &self.0
    }

    fn into_frame(self) -> DataFrame {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// A row of the topics sheet: one top word of one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    /// Feedback category, or `All` for the estate-wide model
    pub feedback_category: String,
    /// Topic identifier
    pub topic: String,
    /// One of the topic's top words
    pub word: String,
}

/// Topic-model output.
#[derive(Debug, Clone)]
pub struct TopicTable(DataFrame);

impl TopicTable {
    /// `feedback_category` column name.
    pub const FEEDBACK_CATEGORY: &'static str = "feedback_category";
    /// `topic` column name.
    pub const TOPIC: &'static str = "topic";
    /// `word` column name.
    pub const WORD: &'static str = "word";
    /// Category holding topics modelled over every answer.
    pub const ALL_CATEGORY: &'static str = "All";
}

impl SurveyTable for TopicTable {
    const SHEET: SheetKind = SheetKind::Topics;
    const COLUMNS: &'static [(&'static str, ColumnType)] = &[
        (Self::FEEDBACK_CATEGORY, ColumnType::Text),
        (Self::TOPIC, ColumnType::Text),
        (Self::WORD, ColumnType::Text),
    ];
    type Record = TopicRecord;

    fn from_records(records: &[Self::Record]) -> Result<Self> {
        let categories: Vec<&str> = records
            .iter()
            .map(|r| r.feedback_category.as_str())
            .collect();
        let topics: Vec<&str> = records.iter().map(|r| r.topic.as_str()).collect();
        let words: Vec<&str> = records.iter().map(|r| r.word.as_str()).collect();

        let df = DataFrame::new(vec![
            Series::new(Self::FEEDBACK_CATEGORY.into(), categories).into(),
            Series::new(Self::TOPIC.into(), topics).into(),
            Series::new(Self::WORD.into(), words).into(),
        ])?;

        Self::from_frame(df)
    }

    fn from_frame(df: DataFrame) -> Result<Self> {
        Ok(Self(normalize(df, Self::SHEET, Self::COLUMNS)?))
    }

    fn frame(&self) -> &DataFrame {
        &self.0
    }

    fn into_frame(self) -> DataFrame {
        self.0
    }
}

/// The four tables of one survey snapshot.
#[derive(Debug, Clone)]
pub struct SurveyData {
    /// Summary counts
    pub summary: SummaryTable,
    /// Feedback scores
    pub feedback: FeedbackTable,
    /// Sentiment-tagged free text
    pub sentiment: SentimentTable,
    /// Topic words
    pub topics: TopicTable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SUMMARY_CSV: &str = "Type,Description,Number\n\
        all,Responses,159\n\
        all,Contactable,140\n\
        resident_type,Leaseholder,95\n";

    #[test]
    fn test_summary_from_csv() {
        let table = SummaryTable::from_csv_str(SUMMARY_CSV).unwrap();
        assert_eq!(table.height(), 3);
        assert_eq!(
            table.frame().get_column_names(),
            vec!["Type", "Description", "Number"]
        );
        let numbers = table.frame().column("Number").unwrap().i64().unwrap();
        assert_eq!(numbers.get(0), Some(159));
    }

    #[test]
    fn test_summary_ignores_extra_columns() {
        let csv = "Notes,Type,Description,Number\nx,all,Responses,10\n";
        let table = SummaryTable::from_csv_str(csv).unwrap();
        assert_eq!(table.frame().width(), 3);
    }

    #[test]
    fn test_summary_missing_column() {
        let csv = "Type,Description\nall,Responses\n";
        let err = SummaryTable::from_csv_str(csv).unwrap_err();
        assert!(matches!(
            err,
            DataError::MissingColumn { sheet: SheetKind::Summary, ref column } if column == "Number"
        ));
    }

    #[test]
    fn test_summary_rejects_negative_number() {
        let records = vec![SummaryRecord::new(SummaryType::All, "Responses", -1)];
        let err = SummaryTable::from_records(&records).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { row: 0, .. }));
    }

    #[test]
    fn test_summary_canonicalises_type() {
        let csv = "Type,Description,Number\nAll,Responses,159\n Resident_Type ,Tenant,50\n";
        let table = SummaryTable::from_csv_str(csv).unwrap();
        let kinds: Vec<Option<&str>> = table
            .frame()
            .column("Type")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(kinds, vec![Some("all"), Some("resident_type")]);
    }

    #[test]
    fn test_summary_rejects_unknown_type() {
        let csv = "Type,Description,Number\nall,Responses,1\npostcode,SE10,4\n";
        let err = SummaryTable::from_csv_str(csv).unwrap_err();
        assert!(matches!(err, DataError::InvalidValue { row: 1, .. }));
    }

    #[test]
    fn test_feedback_rejects_out_of_range_score() {
        let csv = "response_id,resident_type,building_name,building_floor,resident_length,question_category,question,feedback_score\n\
            1,Tenant,Tower A,1,1-3 years,Security,Do you feel safe?,6\n";
        let err = FeedbackTable::from_csv_str(csv).unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidValue {
                sheet: SheetKind::Feedback,
                row: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_feedback_unparseable_score_is_csv_error() {
        let csv = "response_id,resident_type,building_name,building_floor,resident_length,question_category,question,feedback_score\n\
            1,Tenant,Tower A,1,1-3 years,Security,Do you feel safe?,great\n";
        let err = FeedbackTable::from_csv_str(csv).unwrap_err();
        assert!(matches!(err, DataError::Csv { .. }));
    }

    #[test]
    fn test_sentiment_scores_from_csv() {
        let csv = "response_id,resident_type,building_name,building_floor,resident_length,feedback_category,sentiment,polarity,subjectivity,free_text\n\
            1,Tenant,Tower A,2,<1 year,Lifts,negative,-0.35,0.6,Often broken\n";
        let table = SentimentTable::from_csv_str(csv).unwrap();
        let polarity = table.frame().column("polarity").unwrap().f64().unwrap();
        let subjectivity = table.frame().column("subjectivity").unwrap().f64().unwrap();
        assert_relative_eq!(polarity.get(0).unwrap(), -0.35);
        assert_relative_eq!(subjectivity.get(0).unwrap(), 0.6);
    }

    #[test]
    fn test_sentiment_bounds() {
        let record = SentimentRecord {
            response_id: 1,
            resident_type: "Tenant".into(),
            building_name: "Tower A".into(),
            building_floor: "2".into(),
            resident_length: "<1 year".into(),
            feedback_category: "Lifts".into(),
            sentiment: "negative".into(),
            polarity: -1.5,
            subjectivity: 0.5,
            free_text: "Always broken".into(),
        };
        assert!(SentimentTable::from_records(&[record.clone()]).is_err());

        let ok = SentimentRecord {
            polarity: -1.0,
            ..record
        };
        assert_eq!(SentimentTable::from_records(&[ok]).unwrap().height(), 1);
    }

    #[test]
    fn test_from_frame_casts_columns() {
        let df = DataFrame::new(vec![
            Series::new("feedback_category".into(), vec!["All"]).into(),
            Series::new("topic".into(), vec![0i64]).into(),
            Series::new("word".into(), vec!["lift"]).into(),
        ])
        .unwrap();
        let table = TopicTable::from_frame(df).unwrap();
        let topics = table.frame().column("topic").unwrap().str().unwrap();
        assert_eq!(topics.get(0), Some("0"));
    }

    #[test]
    fn test_empty_tables_are_valid() {
        let table = FeedbackTable::from_records(&[]).unwrap();
        assert!(table.is_empty());
    }
}
