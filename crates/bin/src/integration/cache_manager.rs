//! Location of the persisted sheet cache.
//!
//! Raw CSV payloads of the four survey sheets are kept in one SQLite file so
//! that repeated report runs within the query TTL skip the network. The file
//! lives at `cache_path` from the config when set, otherwise under the user's
//! cache directory.

use rigra_data::{DataConfig, DataError, SqliteCache};
use std::path::PathBuf;

/// Directory holding the sheet cache when no path is configured,
/// e.g. `~/.cache/rigra` on Linux.
pub(crate) fn survey_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rigra")
}

/// Sheet cache file used when the config names none.
pub(crate) fn default_sheet_cache() -> PathBuf {
    survey_cache_dir().join("rigra.db")
}

/// Sheet cache file for this run.
pub(crate) fn sheet_cache_path(config: &DataConfig) -> PathBuf {
    config.cache_path.clone().unwrap_or_else(default_sheet_cache)
}

/// Open the sheet cache, creating its directory on first use.
pub(crate) fn open_sheet_cache(config: &DataConfig) -> Result<SqliteCache, DataError> {
    let path = sheet_cache_path(config);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    SqliteCache::new(&path)
}
