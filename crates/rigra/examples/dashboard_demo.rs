//! Print the dashboard pages for a directory of survey CSV files.
//!
//! ```text
//! cargo run -p rigra --example dashboard_demo -- path/to/survey
//! ```
//!
//! The directory must hold `summary.csv`, `feedback.csv`, `sentiment.csv` and
//! `topics.csv`.

use rigra::SurveyDashboard;
use rigra::data::{CsvDirSource, DataConfig, Sentiment, SurveyDataProvider};
use rigra::metrics::ExplorerFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());

    let provider = SurveyDataProvider::new(CsvDirSource::new(&dir), &DataConfig::default());
    let mut dashboard = SurveyDashboard::new(provider);

    println!("{}", dashboard.summary_page().await?.to_ascii_table());

    let negative = ExplorerFilter::new().with_sentiments([Sentiment::Negative]);
    println!("{}", dashboard.explorer_page(&negative, Some(10)).await?.to_ascii_table());

    println!("{}", dashboard.topics().await?.to_ascii_table());

    Ok(())
}
