//! Dashboard pages over an in-memory survey

use rigra::data::{
    DataConfig, MemorySource, Sentiment, SheetKind, SurveyDataProvider, SurveyTable,
};
use rigra::metrics::{ExplorerFilter, MetricKind, MetricValue, MetricsError};
use rigra::{Error, SurveyDashboard};
use rstest::rstest;

const SUMMARY: &str = "Type,Description,Number
all,Responses,4
all,Contactable,3
resident_type,Leaseholder,3
resident_type,Non-resident Leaseholder,0
resident_type,Tenant,1
";

const FEEDBACK: &str = "response_id,resident_type,building_name,building_floor,resident_length,question_category,question,feedback_score
1,Tenant,Alpha House,1,1-5 years,Repairs,How quickly are repairs done?,5
2,Leaseholder,Beta Court,3,5+ years,Repairs,How quickly are repairs done?,2
3,Leaseholder,Alpha House,2,<1 year,Repairs,How quickly are repairs done?,4
4,Leaseholder,Beta Court,1,<1 year,Repairs,How quickly are repairs done?,5
";

const SENTIMENT: &str = "response_id,resident_type,building_name,building_floor,resident_length,feedback_category,sentiment,polarity,subjectivity,free_text
1,Tenant,Alpha House,1,1-5 years,Repairs,positive,0.6,0.4,Fixed the same day
2,Leaseholder,Beta Court,3,5+ years,Repairs,negative,-0.7,0.9,Still waiting for the lift
3,Leaseholder,Alpha House,2,<1 year,Cleaning,neutral,0.0,0.1,Stairs are cleaned weekly
4,Leaseholder,Beta Court,1,<1 year,Cleaning,positive,0.3,0.5,Always tidy
";

const TOPICS: &str = "feedback_category,topic,word
Repairs,0,lift
All,0,repair
All,0,lift
";

fn source() -> MemorySource {
    MemorySource::new()
        .with_sheet(SheetKind::Summary, SUMMARY)
        .with_sheet(SheetKind::Feedback, FEEDBACK)
        .with_sheet(SheetKind::Sentiment, SENTIMENT)
        .with_sheet(SheetKind::Topics, TOPICS)
}

fn dashboard(source: MemorySource) -> SurveyDashboard<MemorySource> {
    SurveyDashboard::new(SurveyDataProvider::new(source, &DataConfig::default()))
}

#[tokio::test]
async fn test_summary_page() {
    let mut dashboard = dashboard(source());
    let page = dashboard.summary_page().await.unwrap();

    assert_eq!(page.residents.all, 4);
    assert_eq!(page.residents.leaseholder_pct, 75);
    assert_eq!(page.feedback.mean_score, 4.0);
    assert_eq!(page.feedback.positive_pct, 50);
    assert_eq!(page.sentiment.positive, 50);
    assert_eq!(page.topics[0].category, "All");
}

#[tokio::test]
async fn test_explorer_page() {
    let mut dashboard = dashboard(source());
    let filter = ExplorerFilter::new()
        .with_category("Cleaning")
        .with_sentiments([Sentiment::Positive]);
    let page = dashboard.explorer_page(&filter, None).await.unwrap();

    assert_eq!(page.matching, 1);
    assert_eq!(page.rows[0].feedback_response, "Always tidy");
    assert_eq!(page.breakdown.positive, 100);
    assert_eq!(page.delta.positive, 50);
}

#[tokio::test]
async fn test_explorer_empty_selection_is_error() {
    let mut dashboard = dashboard(source());
    let filter = ExplorerFilter::new().with_sentiments(Vec::<Sentiment>::new());
    let err = dashboard.explorer_page(&filter, None).await.unwrap_err();
    assert!(matches!(err, Error::Metrics(MetricsError::DivisionByZero(_))));
}

#[tokio::test]
async fn test_explorer_options() {
    let mut dashboard = dashboard(source());
    let (categories, buildings) = dashboard.explorer_options(Some("Repairs")).await.unwrap();
    assert_eq!(categories, ["Cleaning", "Repairs"]);
    assert_eq!(buildings, ["Alpha House", "Beta Court"]);
}

#[tokio::test]
async fn test_topics() {
    let mut dashboard = dashboard(source());
    let page = dashboard.topics().await.unwrap();
    assert_eq!(page.groups.len(), 2);

    let repairs = dashboard.topics_for("Repairs").await.unwrap();
    assert_eq!(repairs.topics[0].words, ["lift"]);
}

#[tokio::test]
async fn test_metric_and_refresh() {
    let mut dashboard = dashboard(source());
    assert_eq!(
        dashboard.metric(MetricKind::AllResponses).await.unwrap(),
        MetricValue::Count(4)
    );

    let data = dashboard.refresh().await.unwrap();
    assert_eq!(data.feedback.height(), 4);
}

#[rstest]
#[case(MetricKind::ContactableResponses, MetricValue::Count(3))]
#[case(MetricKind::LeaseholderPercent, MetricValue::Percent(75))]
#[case(MetricKind::TenantPercent, MetricValue::Percent(25))]
#[case(MetricKind::FeedbackResponses, MetricValue::Count(4))]
#[case(MetricKind::AverageFeedback, MetricValue::Score(4.0))]
#[case(MetricKind::PositiveFeedback, MetricValue::Percent(50))]
#[case(MetricKind::NeutralFeedback, MetricValue::Percent(25))]
#[case(MetricKind::NegativeFeedback, MetricValue::Percent(25))]
#[tokio::test]
async fn test_headline_metrics(#[case] kind: MetricKind, #[case] expected: MetricValue) {
    let mut dashboard = dashboard(source());
    assert_eq!(dashboard.metric(kind).await.unwrap(), expected);
}

#[tokio::test]
async fn test_missing_sheet_is_data_error() {
    let source = MemorySource::new().with_sheet(SheetKind::Summary, SUMMARY);
    let mut dashboard = dashboard(source);
    let err = dashboard.summary_page().await.unwrap_err();
    assert!(matches!(err, Error::Data(_)));
}
