//! Integration tests for loading survey sheets from disk

use rigra_data::cache::SqliteCache;
use rigra_data::sheets::CsvDirSource;
use rigra_data::{DataConfig, DataError, SheetKind, SurveyDataProvider, SurveyTable};
use std::path::Path;

const SUMMARY: &str = "Type,Description,Number
all,Responses,159
all,Contactable,140
resident_type,Leaseholder,95
resident_type,Tenant,50
building_name,Alpha House,80
building_name,Beta House,79
";

const FEEDBACK: &str = "response_id,resident_type,building_name,building_floor,resident_length,question_category,question,feedback_score
1,Tenant,Alpha House,1,0-1 years,Repairs,How quickly are repairs done?,5
1,Tenant,Alpha House,1,0-1 years,Cleaning,How clean are shared areas?,4
2,Leaseholder,Beta House,3,5+ years,Repairs,How quickly are repairs done?,2
";

const SENTIMENT: &str = "response_id,resident_type,building_name,building_floor,resident_length,feedback_category,sentiment,polarity,subjectivity,free_text
1,Tenant,Alpha House,1,0-1 years,Repairs,positive,0.6,0.5,\"Fast, friendly repairs\"
2,Leaseholder,Beta House,3,5+ years,Repairs,negative,-0.4,0.7,Waited weeks
";

const TOPICS: &str = "feedback_category,topic,word
All,0,repair
All,0,wait
Repairs,1,fast
";

fn write_sheets(dir: &Path) {
    std::fs::write(dir.join("summary.csv"), SUMMARY).unwrap();
    std::fs::write(dir.join("feedback.csv"), FEEDBACK).unwrap();
    std::fs::write(dir.join("sentiment.csv"), SENTIMENT).unwrap();
    std::fs::write(dir.join("topics.csv"), TOPICS).unwrap();
}

#[tokio::test]
async fn test_load_all_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_sheets(dir.path());

    let mut provider = SurveyDataProvider::new(CsvDirSource::new(dir.path()), &DataConfig::default());
    let data = provider.load_all().await.unwrap();

    assert_eq!(data.summary.height(), 6);
    assert_eq!(data.feedback.height(), 3);
    assert_eq!(data.sentiment.height(), 2);
    assert_eq!(data.topics.height(), 3);

    let text = data.sentiment.frame().column("free_text").unwrap().str().unwrap().get(0);
    assert_eq!(text, Some("Fast, friendly repairs"));
}

#[tokio::test]
async fn test_persisted_cache_survives_provider_restart() {
    let dir = tempfile::tempdir().unwrap();
    write_sheets(dir.path());
    let db = dir.path().join("cache.db");

    {
        let mut provider = SurveyDataProvider::new(CsvDirSource::new(dir.path()), &DataConfig::default())
            .with_store(SqliteCache::new(&db).unwrap());
        provider.load_all().await.unwrap();
    }

    // Sheets gone from disk: the persisted payloads still serve.
    for sheet in SheetKind::all() {
        std::fs::remove_file(dir.path().join(sheet.file_name())).unwrap();
    }

    let mut provider = SurveyDataProvider::new(CsvDirSource::new(dir.path()), &DataConfig::default())
        .with_store(SqliteCache::new(&db).unwrap());
    let summary = provider.summary_table().await.unwrap();
    assert_eq!(summary.height(), 6);

    provider.invalidate_all().unwrap();
    let err = provider.summary_table().await.unwrap_err();
    assert!(matches!(err, DataError::SheetNotConfigured(SheetKind::Summary)));
}

#[tokio::test]
async fn test_malformed_sheet_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_sheets(dir.path());
    std::fs::write(dir.path().join("feedback.csv"), "response_id,question\n1,Why?\n").unwrap();

    let mut provider = SurveyDataProvider::new(CsvDirSource::new(dir.path()), &DataConfig::default());
    let err = provider.load_all().await.unwrap_err();
    assert!(matches!(
        err,
        DataError::MissingColumn { sheet: SheetKind::Feedback, .. }
    ));
}

#[tokio::test]
async fn test_shared_cache_follows_data_directory() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    write_sheets(a.path());
    write_sheets(b.path());
    std::fs::write(a.path().join("summary.csv"), "Type,Description,Number\nall,Responses,10\n").unwrap();
    let db = tempfile::NamedTempFile::new().unwrap();

    {
        let mut provider = SurveyDataProvider::new(CsvDirSource::new(a.path()), &DataConfig::default())
            .with_store(SqliteCache::new(db.path()).unwrap());
        assert_eq!(provider.summary_table().await.unwrap().height(), 1);
    }

    let mut provider = SurveyDataProvider::new(CsvDirSource::new(b.path()), &DataConfig::default())
        .with_store(SqliteCache::new(db.path()).unwrap());
    assert_eq!(provider.summary_table().await.unwrap().height(), 6);
}
