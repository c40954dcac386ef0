//! Caching layers for sheet data.
//!
//! Two explicit caches replace process-wide memoisation:
//! - [`SqliteCache`] persists raw sheet payloads with their fetch time (query TTL).
//! - [`TtlCache`] memoises parsed tables in memory (sheet TTL).

pub mod memory;
pub mod sqlite;

pub use memory::TtlCache;
pub use sqlite::{CacheStats, CachedSheet, SqliteCache};
