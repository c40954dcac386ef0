//! SQLite cache for raw sheet payloads.

use crate::error::{DataError, Result};
use crate::schema::SheetKind;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// SQLite cache for sheet payloads.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

/// A cached sheet payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSheet {
    /// Sheet the payload belongs to
    pub sheet: SheetKind,
    /// Where the payload was fetched from
    pub origin: String,
    /// Raw CSV text
    pub payload: String,
    /// When the payload was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedSheet {
    /// Age of the payload relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.fetched_at
    }

    /// Whether the payload is younger than `max_age` at `now`.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(max_age).is_ok_and(|max_age| self.age(now) < max_age)
    }
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS sheets (
                sheet TEXT PRIMARY KEY,
                origin TEXT NOT NULL,
                payload TEXT NOT NULL,
                fetched_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Get the cached payload of a sheet if it is younger than `max_age`.
    pub fn get_sheet(&self, sheet: SheetKind, max_age: Duration) -> Result<Option<CachedSheet>> {
        let cached = self.get_sheet_any_age(sheet)?;
        let now = Utc::now();
        Ok(cached.filter(|c| c.is_fresh(max_age, now)))
    }

    /// Get the cached payload of a sheet regardless of age.
    pub fn get_sheet_any_age(&self, sheet: SheetKind) -> Result<Option<CachedSheet>> {
        let row = self
            .conn
            .query_row(
                "SELECT origin, payload, fetched_at FROM sheets WHERE sheet = ?1",
                params![sheet.key()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(origin, payload, fetched_at)| {
            let fetched_at = DateTime::parse_from_rfc3339(&fetched_at)
                .map_err(|e| DataError::Parse(format!("Invalid fetched_at timestamp: {}", e)))?
                .with_timezone(&Utc);
            Ok(CachedSheet {
                sheet,
                origin,
                payload,
                fetched_at,
            })
        })
        .transpose()
    }

    /// Store a sheet payload, stamped with the current time.
    pub fn put_sheet(&self, sheet: SheetKind, origin: &str, payload: &str) -> Result<()> {
        self.put_sheet_at(sheet, origin, payload, Utc::now())
    }

    /// Store a sheet payload with an explicit fetch time.
    pub fn put_sheet_at(
        &self,
        sheet: SheetKind,
        origin: &str,
        payload: &str,
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sheets (sheet, origin, payload, fetched_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![sheet.key(), origin, payload, fetched_at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove one sheet from the cache.
    pub fn clear_sheet(&self, sheet: SheetKind) -> Result<()> {
        self.conn
            .execute("DELETE FROM sheets WHERE sheet = ?1", params![sheet.key()])?;
        Ok(())
    }

    /// Clear all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM sheets", [])?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let sheets: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sheets", [], |row| row.get(0))?;

        let total_bytes: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(LENGTH(payload)), 0) FROM sheets",
            [],
            |row| row.get(0),
        )?;

        let oldest: Option<String> = self
            .conn
            .query_row("SELECT MIN(fetched_at) FROM sheets", [], |row| row.get(0))?;

        let newest: Option<String> = self
            .conn
            .query_row("SELECT MAX(fetched_at) FROM sheets", [], |row| row.get(0))?;

        Ok(CacheStats {
            sheets: sheets as usize,
            total_bytes: total_bytes as usize,
            oldest_fetch: oldest,
            newest_fetch: newest,
        })
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of cached sheets
    pub sheets: usize,
    /// Total payload size in bytes
    pub total_bytes: usize,
    /// Oldest fetch timestamp (RFC 3339)
    pub oldest_fetch: Option<String>,
    /// Newest fetch timestamp (RFC 3339)
    pub newest_fetch: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = "Type,Description,Number\nall,Responses,159\n";

    #[test]
    fn test_cache_creation() {
        let cache = SqliteCache::in_memory();
        assert!(cache.is_ok());
    }

    #[test]
    fn test_sheet_round_trip() {
        let cache = SqliteCache::in_memory().unwrap();
        cache
            .put_sheet(SheetKind::Summary, "https://example.com/summary", PAYLOAD)
            .unwrap();

        let cached = cache
            .get_sheet(SheetKind::Summary, Duration::from_secs(60))
            .unwrap()
            .unwrap();
        assert_eq!(cached.sheet, SheetKind::Summary);
        assert_eq!(cached.origin, "https://example.com/summary");
        assert_eq!(cached.payload, PAYLOAD);

        assert!(
            cache
                .get_sheet(SheetKind::Feedback, Duration::from_secs(60))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_stale_sheet_is_not_served() {
        let cache = SqliteCache::in_memory().unwrap();
        let two_days_ago = Utc::now() - chrono::Duration::days(2);
        cache
            .put_sheet_at(SheetKind::Topics, "file", PAYLOAD, two_days_ago)
            .unwrap();

        let ttl = Duration::from_secs(24 * 60 * 60);
        assert!(cache.get_sheet(SheetKind::Topics, ttl).unwrap().is_none());
        assert!(cache.get_sheet_any_age(SheetKind::Topics).unwrap().is_some());
    }

    #[test]
    fn test_put_replaces_existing() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put_sheet(SheetKind::Summary, "a", "old").unwrap();
        cache.put_sheet(SheetKind::Summary, "a", "new").unwrap();

        let cached = cache.get_sheet_any_age(SheetKind::Summary).unwrap().unwrap();
        assert_eq!(cached.payload, "new");
        assert_eq!(cache.get_stats().unwrap().sheets, 1);
    }

    #[test]
    fn test_clear_operations() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put_sheet(SheetKind::Summary, "a", PAYLOAD).unwrap();
        cache.put_sheet(SheetKind::Feedback, "b", PAYLOAD).unwrap();

        cache.clear_sheet(SheetKind::Summary).unwrap();
        assert!(cache.get_sheet_any_age(SheetKind::Summary).unwrap().is_none());
        assert_eq!(cache.get_stats().unwrap().sheets, 1);

        cache.clear_all().unwrap();
        let stats = cache.get_stats().unwrap();
        assert_eq!(stats.sheets, 0);
        assert_eq!(stats.total_bytes, 0);
        assert!(stats.oldest_fetch.is_none());
    }

    #[test]
    fn test_cache_stats() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put_sheet(SheetKind::Summary, "a", "abc").unwrap();
        cache.put_sheet(SheetKind::Topics, "b", "de").unwrap();

        let stats = cache.get_stats().unwrap();
        assert_eq!(stats.sheets, 2);
        assert_eq!(stats.total_bytes, 5);
        assert!(stats.newest_fetch.is_some());
    }
}
