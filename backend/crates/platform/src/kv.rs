//! Key-Value Store Infrastructure
//!
//! Narrow key-scoped store shared by request handlers (rate-limit windows).
//! Only get / put-with-TTL / delete by key; no scans.
//!
//! `put` is last-writer-wins. Read-modify-write sequences built on top of it
//! (see [`crate::rate_limit`]) are not atomic across concurrent requests.

use kernel::error::app_error::AppError;
use kernel::error::kind::ErrorKind;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Errors from a key-value backend
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("Key-value store unavailable: {0}")]
    Unavailable(String),

    #[cfg(feature = "postgres")]
    #[error("Key-value database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<KvError> for AppError {
    fn from(err: KvError) -> Self {
        AppError::internal(ErrorKind::InternalServerError.as_str()).with_source(err)
    }
}

/// Trait for key-value storage backends
#[trait_variant::make(KvStore: Send)]
pub trait LocalKvStore {
    /// Read a live (non-expired) value
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Write a value; `ttl` bounds how long it stays readable
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError>;

    /// Remove a value if present
    async fn delete(&self, key: &str) -> Result<(), KvError>;
}

// ============================================================================
// In-memory implementation
// ============================================================================

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Map size that triggers the first sweep of expired entries on `put`
const SWEEP_THRESHOLD: usize = 256;

#[derive(Debug)]
struct MemoryEntries {
    map: HashMap<String, MemoryEntry>,
    sweep_at: usize,
}

impl Default for MemoryEntries {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
            sweep_at: SWEEP_THRESHOLD,
        }
    }
}

impl MemoryEntries {
    fn purge(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.is_live(now));
        self.sweep_at = (self.map.len() * 2).max(SWEEP_THRESHOLD);
        before - self.map.len()
    }
}

/// Process-local store for tests and single-instance development
///
/// Expired entries are dropped when read, and swept on `put` whenever the map
/// has doubled since the last sweep.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<MemoryEntries>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryEntries>, KvError> {
        self.entries
            .lock()
            .map_err(|_| KvError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> Result<usize, KvError> {
        Ok(self.lock()?.purge(Instant::now()))
    }

    /// Entries held, expired ones included
    pub fn entry_count(&self) -> Result<usize, KvError> {
        Ok(self.lock()?.map.len())
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        let value = entries
            .map
            .get(key)
            .map(|entry| entry.is_live(now).then(|| entry.value.clone()));
        match value {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                entries.map.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
        let now = Instant::now();
        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| now + ttl),
        };
        let mut entries = self.lock()?;
        if entries.map.len() >= entries.sweep_at {
            let purged = entries.purge(now);
            tracing::debug!(purged, remaining = entries.map.len(), "Swept expired memory KV entries");
        }
        entries.map.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        self.lock()?.map.remove(key);
        Ok(())
    }
}

// ============================================================================
// PostgreSQL implementation
// ============================================================================

#[cfg(feature = "postgres")]
pub use postgres::PgKvStore;

#[cfg(feature = "postgres")]
mod postgres {
    use super::{KvError, KvStore};
    use chrono::Utc;
    use sqlx::PgPool;
    use std::time::Duration;

    /// Postgres-backed store shared by every API instance
    #[derive(Clone)]
    pub struct PgKvStore {
        pool: PgPool,
    }

    impl PgKvStore {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }

        /// Delete expired rows
        pub async fn cleanup_expired(&self) -> Result<u64, KvError> {
            let now_ms = Utc::now().timestamp_millis();

            let deleted = sqlx::query("DELETE FROM kv_entries WHERE expires_at_ms < $1")
                .bind(now_ms)
                .execute(&self.pool)
                .await?
                .rows_affected();

            tracing::info!(entries_deleted = deleted, "Cleaned up expired kv entries");

            Ok(deleted)
        }
    }

    impl KvStore for PgKvStore {
        async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
            let now_ms = Utc::now().timestamp_millis();

            let value = sqlx::query_scalar::<_, String>(
                r#"
                SELECT kv_value
                FROM kv_entries
                WHERE kv_key = $1
                  AND (expires_at_ms IS NULL OR expires_at_ms > $2)
                "#,
            )
            .bind(key)
            .bind(now_ms)
            .fetch_optional(&self.pool)
            .await?;

            Ok(value)
        }

        async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), KvError> {
            let expires_at_ms =
                ttl.map(|ttl| Utc::now().timestamp_millis() + ttl.as_millis() as i64);

            sqlx::query(
                r#"
                INSERT INTO kv_entries (kv_key, kv_value, expires_at_ms)
                VALUES ($1, $2, $3)
                ON CONFLICT (kv_key)
                DO UPDATE SET kv_value = EXCLUDED.kv_value, expires_at_ms = EXCLUDED.expires_at_ms
                "#,
            )
            .bind(key)
            .bind(value)
            .bind(expires_at_ms)
            .execute(&self.pool)
            .await?;

            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), KvError> {
            sqlx::query("DELETE FROM kv_entries WHERE kv_key = $1")
                .bind(key)
                .execute(&self.pool)
                .await?;

            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, Duration, KvError, KvStore, MemoryKvStore, SWEEP_THRESHOLD};

    #[tokio::test]
    async fn test_memory_put_get_delete() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.put("k", "v1", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));

        store.put("k", "v2", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_ttl_expiry() {
        let store = MemoryKvStore::new();
        store
            .put("short", "v", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        store.put("long", "v", Some(Duration::from_secs(60))).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.get("long").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.purge_expired().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_put_sweeps_expired_entries() {
        let store = MemoryKvStore::new();
        for i in 0..SWEEP_THRESHOLD - 1 {
            store
                .put(&format!("stale:{i}"), "v", Some(Duration::from_millis(10)))
                .await
                .unwrap();
        }
        store.put("kept", "v", None).await.unwrap();
        assert_eq!(store.entry_count().unwrap(), SWEEP_THRESHOLD);

        tokio::time::sleep(Duration::from_millis(30)).await;
        store.put("fresh", "v", None).await.unwrap();

        assert_eq!(store.entry_count().unwrap(), 2);
        assert_eq!(store.get("kept").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_memory_clones_share_state() {
        let store = MemoryKvStore::new();
        let other = store.clone();
        store.put("shared", "1", None).await.unwrap();
        assert_eq!(other.get("shared").await.unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_kv_error_maps_to_generic_server_error() {
        let err: AppError = KvError::Unavailable("down".into()).into();
        assert_eq!(err.status_code(), 500);
        assert!(!err.to_body().to_string().contains("down"));
    }
}
