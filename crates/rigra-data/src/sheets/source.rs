//! Sources of raw sheet payloads.

use crate::config::SheetUrls;
use crate::error::{DataError, Result};
use crate::schema::SheetKind;
use crate::sheets::client::{GoogleSheetsClient, csv_export_url};
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Something that can produce the CSV text of a sheet.
pub trait SheetSource {
    /// Fetch the CSV text of one sheet.
    fn fetch(&self, sheet: SheetKind) -> impl Future<Output = Result<String>> + Send;

    /// Human readable location of a sheet, recorded alongside cached payloads.
    fn origin(&self, sheet: SheetKind) -> String;
}

/// Sheets published in a Google spreadsheet.
#[derive(Debug, Clone)]
pub struct GoogleSheetsSource {
    client: GoogleSheetsClient,
    urls: SheetUrls,
}

impl GoogleSheetsSource {
    /// Create a source for the given sheet URLs.
    pub fn new(urls: SheetUrls, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: GoogleSheetsClient::with_timeout(timeout)?,
            urls,
        })
    }

    /// Create a source from an existing client.
    pub fn with_client(client: GoogleSheetsClient, urls: SheetUrls) -> Self {
        Self { client, urls }
    }
}

impl SheetSource for GoogleSheetsSource {
    async fn fetch(&self, sheet: SheetKind) -> Result<String> {
        let url = self
            .urls
            .get(sheet)
            .ok_or(DataError::SheetNotConfigured(sheet))?;
        self.client.fetch_csv(url).await
    }

    fn origin(&self, sheet: SheetKind) -> String {
        self.urls
            .get(sheet)
            .map(csv_export_url)
            .unwrap_or_default()
    }
}

/// Sheets stored as `<sheet>.csv` files in one directory.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    /// Create a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory sheets are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one sheet file.
    pub fn path_for(&self, sheet: SheetKind) -> PathBuf {
        self.dir.join(sheet.file_name())
    }
}

impl SheetSource for CsvDirSource {
    async fn fetch(&self, sheet: SheetKind) -> Result<String> {
        let path = self.path_for(sheet);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DataError::SheetNotConfigured(sheet))
            }
            Err(e) => Err(DataError::Io(e)),
        }
    }

    fn origin(&self, sheet: SheetKind) -> String {
        self.path_for(sheet).display().to_string()
    }
}

/// Sheets held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sheets: HashMap<SheetKind, String>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the CSV text of one sheet.
    pub fn with_sheet(mut self, sheet: SheetKind, csv: impl Into<String>) -> Self {
        self.sheets.insert(sheet, csv.into());
        self
    }

    /// Replace the CSV text of one sheet in place.
    pub fn set_sheet(&mut self, sheet: SheetKind, csv: impl Into<String>) {
        self.sheets.insert(sheet, csv.into());
    }
}

impl SheetSource for MemorySource {
    async fn fetch(&self, sheet: SheetKind) -> Result<String> {
        self.sheets
            .get(&sheet)
            .cloned()
            .ok_or(DataError::SheetNotConfigured(sheet))
    }

    fn origin(&self, sheet: SheetKind) -> String {
        format!("memory:{}", sheet)
    }
}
