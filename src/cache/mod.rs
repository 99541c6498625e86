//! Persistent result cache backed by SQLite.
//!
//! Caches whole operation payloads as JSON, keyed by (class, key). Each
//! class carries its own TTL: search results go stale within a day as
//! sources rotate their posts, while extracted link sets stay valid for
//! about a week. Expiry is enforced lazily at read time.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};

const SCHEMA_SQL: &str = r#"
-- Cached operation payloads, one row per (class, key)
CREATE TABLE IF NOT EXISTS results (
    class TEXT NOT NULL,
    key TEXT NOT NULL,
    payload TEXT NOT NULL,
    stored_at INTEGER NOT NULL,
    PRIMARY KEY (class, key)
);

-- Index for bulk expiry sweeps
CREATE INDEX IF NOT EXISTS idx_results_stored_at ON results(stored_at);
"#;

/// Staleness class of a cached payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheClass {
    /// Search result lists. Short-lived.
    Search,
    /// Extracted link sets for a page. Long-lived.
    Links,
}

impl CacheClass {
    fn as_str(self) -> &'static str {
        match self {
            CacheClass::Search => "search",
            CacheClass::Links => "links",
        }
    }
}

/// JSON payload cache with per-class TTLs.
#[derive(Clone)]
pub struct ResultCache {
    pool: SqlitePool,
    search_ttl: Duration,
    links_ttl: Duration,
}

impl ResultCache {
    /// Open (or create) the cache at `path` with the default TTLs of
    /// 24 hours for search and 7 days for links.
    pub async fn open(path: &Path) -> Result<Self> {
        Self::open_with_ttls(
            path,
            Duration::from_secs(24 * 60 * 60),
            Duration::from_secs(7 * 24 * 60 * 60),
        )
        .await
    }

    pub async fn open_with_ttls(
        path: &Path,
        search_ttl: Duration,
        links_ttl: Duration,
    ) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA_SQL).execute(&pool).await?;

        Ok(Self {
            pool,
            search_ttl,
            links_ttl,
        })
    }

    fn ttl_for(&self, class: CacheClass) -> Duration {
        match class {
            CacheClass::Search => self.search_ttl,
            CacheClass::Links => self.links_ttl,
        }
    }

    /// Fetch a cached payload, treating entries older than the class TTL as
    /// absent. Expired rows are deleted on the way out.
    pub async fn get<T: DeserializeOwned>(
        &self,
        class: CacheClass,
        key: &str,
    ) -> Result<Option<T>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT payload, stored_at FROM results WHERE class = ? AND key = ?")
                .bind(class.as_str())
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        let Some((payload, stored_at)) = row else {
            trace!(class = class.as_str(), %key, "Cache miss");
            return Ok(None);
        };

        let age_ms = chrono::Utc::now().timestamp_millis().saturating_sub(stored_at);
        if age_ms >= self.ttl_for(class).as_millis() as i64 {
            debug!(class = class.as_str(), %key, age_ms, "Cache entry expired");
            self.delete(class, key).await?;
            return Ok(None);
        }

        match serde_json::from_str(&payload) {
            Ok(value) => {
                trace!(class = class.as_str(), %key, "Cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                // A payload that no longer deserializes (shape change across
                // versions) is treated as a miss, not an error.
                debug!(class = class.as_str(), %key, "Discarding undecodable cache entry: {e}");
                self.delete(class, key).await?;
                Ok(None)
            }
        }
    }

    /// Store a payload, replacing any previous entry for the same key.
    pub async fn put<T: Serialize>(&self, class: CacheClass, key: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        sqlx::query(
            "INSERT OR REPLACE INTO results (class, key, payload, stored_at) VALUES (?, ?, ?, ?)",
        )
        .bind(class.as_str())
        .bind(key)
        .bind(payload)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, class: CacheClass, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM results WHERE class = ? AND key = ?")
            .bind(class.as_str())
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Sweep all rows past their class TTL. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<u64> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut removed = 0u64;
        for class in [CacheClass::Search, CacheClass::Links] {
            let cutoff = now - self.ttl_for(class).as_millis() as i64;
            let result = sqlx::query("DELETE FROM results WHERE class = ? AND stored_at < ?")
                .bind(class.as_str())
                .bind(cutoff)
                .execute(&self.pool)
                .await?;
            removed += result.rows_affected();
        }
        if removed > 0 {
            debug!(removed, "Purged expired cache entries");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn put_get_roundtrip_and_delete() {
        let dir = TempDir::new().unwrap();
        let cache = ResultCache::open(&dir.path().join("cache.sqlite"))
            .await
            .unwrap();

        cache
            .put(CacheClass::Search, "inception", &vec!["a", "b"])
            .await
            .unwrap();
        let hit: Option<Vec<String>> = cache.get(CacheClass::Search, "inception").await.unwrap();
        assert_eq!(hit, Some(vec!["a".to_string(), "b".to_string()]));

        // Classes are separate keyspaces.
        let other: Option<Vec<String>> = cache.get(CacheClass::Links, "inception").await.unwrap();
        assert!(other.is_none());

        cache.delete(CacheClass::Search, "inception").await.unwrap();
        let gone: Option<Vec<String>> = cache.get(CacheClass::Search, "inception").await.unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let dir = TempDir::new().unwrap();
        let cache = ResultCache::open_with_ttls(
            &dir.path().join("cache.sqlite"),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .await
        .unwrap();

        cache.put(CacheClass::Search, "k", &42u32).await.unwrap();
        let hit: Option<u32> = cache.get(CacheClass::Search, "k").await.unwrap();
        assert_eq!(hit, Some(42));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let stale: Option<u32> = cache.get(CacheClass::Search, "k").await.unwrap();
        assert!(stale.is_none());
    }

    #[tokio::test]
    async fn purge_removes_expired_rows() {
        let dir = TempDir::new().unwrap();
        let cache = ResultCache::open_with_ttls(
            &dir.path().join("cache.sqlite"),
            Duration::from_secs(1),
            Duration::from_secs(3600),
        )
        .await
        .unwrap();

        cache.put(CacheClass::Search, "old", &1u32).await.unwrap();
        cache.put(CacheClass::Links, "kept", &2u32).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let removed = cache.purge_expired().await.unwrap();
        assert_eq!(removed, 1);
        let kept: Option<u32> = cache.get(CacheClass::Links, "kept").await.unwrap();
        assert_eq!(kept, Some(2));
    }
}
