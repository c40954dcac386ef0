//! HTTP client for published spreadsheet sheets.

use crate::error::{DataError, Result};
use std::time::Duration;
use tracing::debug;

/// User agent sent with every sheet request
const USER_AGENT: &str = concat!("rigra/", env!("CARGO_PKG_VERSION"));

/// Host of Google spreadsheets
const SHEETS_PREFIX: &str = "https://docs.google.com/spreadsheets/d/";

/// Rewrite a spreadsheet "edit" URL into its CSV export URL.
///
/// `https://docs.google.com/spreadsheets/d/<id>/edit#gid=<gid>` becomes
/// `https://docs.google.com/spreadsheets/d/<id>/export?format=csv&gid=<gid>`.
/// URLs of any other shape (already an export link, a plain CSV file) are
/// returned unchanged.
///
/// # Example
/// ```
/// use rigra_data::sheets::csv_export_url;
///
/// let url = csv_export_url("https://docs.google.com/spreadsheets/d/abc/edit#gid=42");
/// assert_eq!(url, "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=42");
/// ```
pub fn csv_export_url(url: &str) -> String {
    let url = url.trim();
    let Some(rest) = url.strip_prefix(SHEETS_PREFIX) else {
        return url.to_string();
    };

    let Some((id, tail)) = rest.split_once('/') else {
        return url.to_string();
    };

    if !tail.starts_with("edit") || id.is_empty() {
        return url.to_string();
    }

    let gid = tail
        .split(['#', '?', '&'])
        .find_map(|part| part.strip_prefix("gid="))
        .filter(|gid| !gid.is_empty())
        .unwrap_or("0");

    format!("{}{}/export?format=csv&gid={}", SHEETS_PREFIX, id, gid)
}

/// HTTP client that downloads sheets as CSV text.
#[derive(Debug, Clone)]
pub struct GoogleSheetsClient {
    client: reqwest::Client,
}

impl GoogleSheetsClient {
    /// Create a client with the default 30 second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a client with a custom request timeout.
    ///
    /// # Example
    /// ```no_run
    /// use rigra_data::sheets::GoogleSheetsClient;
    /// use std::time::Duration;
    ///
    /// # async fn example() -> rigra_data::Result<()> {
    /// let client = GoogleSheetsClient::with_timeout(Duration::from_secs(10))?;
    /// let csv = client
    ///     .fetch_csv("https://docs.google.com/spreadsheets/d/abc/edit#gid=0")
    ///     .await?;
    /// println!("{} bytes", csv.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self { client })
    }

    /// Download a sheet as CSV text.
    ///
    /// # Errors
    /// Returns `DataError::Http` on a non-success status and
    /// `DataError::Network` when the request itself fails.
    pub async fn fetch_csv(&self, url: &str) -> Result<String> {
        let export_url = csv_export_url(url);
        debug!(url = %export_url, "Fetching sheet");

        let response = self
            .client
            .get(&export_url)
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "Failed to fetch sheet {}: HTTP {}",
                export_url,
                response.status()
            )));
        }

        let text = response.text().await.map_err(DataError::Network)?;
        debug!(url = %export_url, bytes = text.len(), "Fetched sheet");
        Ok(text)
    }
}
