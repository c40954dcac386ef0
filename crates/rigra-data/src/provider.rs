//! Cached access to the four survey tables.
//!
//! Lookup order for a sheet:
//! 1. the in-memory table memo (sheet TTL),
//! 2. the persisted payload cache (query TTL), if one is attached and the
//!    payload came from the same origin as the current source,
//! 3. the [`SheetSource`] itself.
//!
//! Payloads fetched from the source are written back to the persisted cache and
//! parsed tables to the memo.

use crate::cache::{SqliteCache, TtlCache};
use crate::config::DataConfig;
use crate::error::{DataError, Result};
use crate::schema::SheetKind;
use crate::sheets::SheetSource;
use crate::tables::{FeedbackTable, SentimentTable, SummaryTable, SurveyData, SurveyTable, TopicTable};
use futures::future::try_join_all;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Loads survey tables from a [`SheetSource`] through two cache layers.
///
/// # Example
/// ```no_run
/// use rigra_data::sheets::CsvDirSource;
/// use rigra_data::tables::SurveyTable;
/// use rigra_data::{DataConfig, SurveyDataProvider};
///
/// # async fn example() -> rigra_data::Result<()> {
/// let mut provider = SurveyDataProvider::new(CsvDirSource::new("data"), &DataConfig::default());
/// let feedback = provider.feedback_table().await?;
/// println!("{} feedback rows", feedback.frame().height());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SurveyDataProvider<S> {
    source: S,
    store: Option<SqliteCache>,
    query_ttl: Duration,
    memo: TtlCache<SheetKind, DataFrame>,
}

impl<S: SheetSource> SurveyDataProvider<S> {
    /// Create a provider with an in-memory memo only.
    pub fn new(source: S, config: &DataConfig) -> Self {
        Self {
            source,
            store: None,
            query_ttl: config.query_ttl(),
            memo: TtlCache::new(config.sheet_ttl()),
        }
    }

    /// Attach a persisted payload cache.
    pub fn with_store(mut self, store: SqliteCache) -> Self {
        self.store = Some(store);
        self
    }

    /// The underlying source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// The persisted payload cache, if attached.
    pub const fn store(&self) -> Option<&SqliteCache> {
        self.store.as_ref()
    }

    /// Summary counts table.
    pub async fn summary_table(&mut self) -> Result<SummaryTable> {
        self.load().await
    }

    /// Feedback scores table.
    pub async fn feedback_table(&mut self) -> Result<FeedbackTable> {
        self.load().await
    }

    /// Sentiment table.
    pub async fn sentiment_table(&mut self) -> Result<SentimentTable> {
        self.load().await
    }

    /// Topic words table.
    pub async fn topic_table(&mut self) -> Result<TopicTable> {
        self.load().await
    }

    /// Load any table type through the cache layers.
    pub async fn load<T: SurveyTable>(&mut self) -> Result<T> {
        let sheet = T::SHEET;
        if let Some(df) = self.memo.get(&sheet) {
            debug!(%sheet, "Table memo hit");
            return T::from_frame(df);
        }

        let text = self.fetch_text(sheet).await?;
        let table = T::from_csv_str(&text)?;
        self.memo.insert(sheet, table.frame().clone());
        info!(%sheet, rows = table.height(), "Loaded sheet");
        Ok(table)
    }

    /// Load all four tables, fetching the ones not memoised concurrently.
    pub async fn load_all(&mut self) -> Result<SurveyData> {
        let mut frames = HashMap::new();
        for sheet in SheetKind::all() {
            if let Some(df) = self.memo.get(&sheet) {
                frames.insert(sheet, df);
            }
        }

        let missing: Vec<SheetKind> = SheetKind::all()
            .into_iter()
            .filter(|sheet| !frames.contains_key(sheet))
            .collect();

        if !missing.is_empty() {
            debug!(?missing, "Fetching sheets");
            let texts = try_join_all(missing.iter().map(|&sheet| self.fetch_text(sheet))).await?;

            for (sheet, text) in missing.into_iter().zip(texts) {
                let df = parse_sheet(sheet, &text)?;
                info!(%sheet, rows = df.height(), "Loaded sheet");
                self.memo.insert(sheet, df.clone());
                frames.insert(sheet, df);
            }
        }

        Ok(SurveyData {
            summary: take_table(&mut frames)?,
            feedback: take_table(&mut frames)?,
            sentiment: take_table(&mut frames)?,
            topics: take_table(&mut frames)?,
        })
    }

    /// Drop one sheet from both cache layers.
    pub fn invalidate(&mut self, sheet: SheetKind) -> Result<()> {
        self.memo.invalidate(&sheet);
        if let Some(store) = &self.store {
            store.clear_sheet(sheet)?;
        }
        info!(%sheet, "Invalidated sheet");
        Ok(())
    }

    /// Drop every sheet from both cache layers.
    pub fn invalidate_all(&mut self) -> Result<()> {
        self.memo.clear();
        if let Some(store) = &self.store {
            store.clear_all()?;
        }
        info!("Invalidated all sheets");
        Ok(())
    }

    /// Invalidate everything and load all tables afresh.
    pub async fn refresh_all(&mut self) -> Result<SurveyData> {
        self.invalidate_all()?;
        self.load_all().await
    }

    /// Raw CSV text of a sheet, from the persisted cache or the source.
    async fn fetch_text(&self, sheet: SheetKind) -> Result<String> {
        if let Some(payload) = self.cached_payload(sheet)? {
            return Ok(payload);
        }

        let text = self.source.fetch(sheet).await?;

        if let Some(store) = &self.store
            && let Err(e) = store.put_sheet(sheet, &self.source.origin(sheet), &text)
        {
            warn!(%sheet, error = %e, "Failed to persist sheet payload");
        }

        Ok(text)
    }

    fn cached_payload(&self, sheet: SheetKind) -> Result<Option<String>> {
        let Some(store) = &self.store else {
            return Ok(None);
        };

        let origin = self.source.origin(sheet);
        match store.get_sheet(sheet, self.query_ttl)? {
            Some(cached) if cached.origin == origin => {
                debug!(%sheet, fetched_at = %cached.fetched_at, "Payload cache hit");
                Ok(Some(cached.payload))
            }
            Some(cached) => {
                debug!(%sheet, cached = %cached.origin, current = %origin, "Payload cached from another origin");
                Ok(None)
            }
            None => {
                debug!(%sheet, "Payload cache miss");
                Ok(None)
            }
        }
    }
}

fn parse_sheet(sheet: SheetKind, text: &str) -> Result<DataFrame> {
    Ok(match sheet {
        SheetKind::Summary => SummaryTable::from_csv_str(text)?.into_frame(),
        SheetKind::Feedback => FeedbackTable::from_csv_str(text)?.into_frame(),
        SheetKind::Sentiment => SentimentTable::from_csv_str(text)?.into_frame(),
        SheetKind::Topics => TopicTable::from_csv_str(text)?.into_frame(),
    })
}

fn take_table<T: SurveyTable>(frames: &mut HashMap<SheetKind, DataFrame>) -> Result<T> {
    let df = frames
        .remove(&T::SHEET)
        .ok_or(DataError::SheetNotConfigured(T::SHEET))?;
    T::from_frame(df)
}
