//! Whole dashboard pages computed from a survey data provider.

use crate::error::Result;
use rigra_data::{SheetSource, SurveyData, SurveyDataProvider};
use rigra_metrics::explorer::{building_options, category_options};
use rigra_metrics::topics::{topic_summary, topics_for_category};
use rigra_metrics::{ExplorerFilter, MetricKind, MetricValue, TopicGroup, explore};
use rigra_output::{ExplorerPage, SurveySummaryPage, TopicsPage};

/// The survey dashboard.
///
/// Each page call loads the tables it needs through the provider, so repeated
/// calls within the memo lifetime do not fetch again.
#[derive(Debug)]
pub struct SurveyDashboard<S> {
    provider: SurveyDataProvider<S>,
}

impl<S: SheetSource> SurveyDashboard<S> {
    /// Create a dashboard over a provider.
    pub const fn new(provider: SurveyDataProvider<S>) -> Self {
        Self { provider }
    }

    /// The underlying provider.
    pub const fn provider(&self) -> &SurveyDataProvider<S> {
        &self.provider
    }

    /// Mutable access to the underlying provider.
    pub const fn provider_mut(&mut self) -> &mut SurveyDataProvider<S> {
        &mut self.provider
    }

    /// Give back the provider.
    pub fn into_provider(self) -> SurveyDataProvider<S> {
        self.provider
    }

    /// All four tables.
    pub async fn data(&mut self) -> Result<SurveyData> {
        Ok(self.provider.load_all().await?)
    }

    /// The survey summary page.
    pub async fn summary_page(&mut self) -> Result<SurveySummaryPage> {
        let data = self.data().await?;
        Ok(SurveySummaryPage::compute(&data)?)
    }

    /// The explorer page for a filter, keeping at most `max_rows` answers.
    pub async fn explorer_page(
        &mut self,
        filter: &ExplorerFilter,
        max_rows: Option<usize>,
    ) -> Result<ExplorerPage> {
        let sentiment = self.provider.sentiment_table().await?;
        let view = explore(&sentiment, filter)?;
        Ok(ExplorerPage::from_view(&view, max_rows)?)
    }

    /// Selectable explorer categories, and the buildings within `category`.
    pub async fn explorer_options(
        &mut self,
        category: Option<&str>,
    ) -> Result<(Vec<String>, Vec<String>)> {
        let sentiment = self.provider.sentiment_table().await?;
        Ok((
            category_options(&sentiment)?,
            building_options(&sentiment, category)?,
        ))
    }

    /// The topics page.
    pub async fn topics(&mut self) -> Result<TopicsPage> {
        let topics = self.provider.topic_table().await?;
        Ok(TopicsPage::new(topic_summary(&topics)?))
    }

    /// Topics of one feedback category.
    pub async fn topics_for(&mut self, category: &str) -> Result<TopicGroup> {
        let topics = self.provider.topic_table().await?;
        Ok(topics_for_category(&topics, category)?)
    }

    /// Evaluate a single dashboard card.
    pub async fn metric(&mut self, kind: MetricKind) -> Result<MetricValue> {
        let data = self.data().await?;
        Ok(kind.evaluate(&data)?)
    }

    /// Drop every cached sheet and load all tables afresh.
    pub async fn refresh(&mut self) -> Result<SurveyData> {
        Ok(self.provider.refresh_all().await?)
    }
}
