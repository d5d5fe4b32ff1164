//! SQLite preference store.
//!
//! Features:
//! - WAL mode for concurrent readers
//! - Many namespaces in one file, keyed by `(namespace, key)`
//! - Namespaces opened from the same store share one connection pool

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

use crate::error::{CodePushError, Result};
use crate::store::PreferenceStore;

/// SQLite implementation of PreferenceStore.
#[derive(Clone)]
pub struct SqlitePreferences {
    pool: SqlitePool,
    namespace: String,
}

impl SqlitePreferences {
    /// Open or create a SQLite file at `path` and bind to `namespace`.
    pub async fn open(path: impl AsRef<Path>, namespace: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let namespace = namespace.into();
        info!(namespace = %namespace, "Opening SQLite preferences at {:?}", path);

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| CodePushError::ConnectionError(e.to_string()))?;

        let store = Self { pool, namespace };
        store.init_schema().await?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub async fn in_memory(namespace: impl Into<String>) -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| CodePushError::ConnectionError(e.to_string()))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        // A second connection would see a different in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| CodePushError::ConnectionError(e.to_string()))?;

        let store = Self {
            pool,
            namespace: namespace.into(),
        };
        store.init_schema().await?;
        Ok(store)
    }

    /// Open another namespace backed by the same database.
    pub fn namespaced(&self, namespace: impl Into<String>) -> Self {
        Self {
            pool: self.pool.clone(),
            namespace: namespace.into(),
        }
    }

    /// Initialize the database schema.
    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (namespace, key)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("SQLite preferences schema initialized");
        Ok(())
    }

    /// All keys in this namespace, in lexicographic order.
    pub async fn keys(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT key FROM preferences WHERE namespace = ? ORDER BY key")
                .bind(&self.namespace)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(k,)| k).collect())
    }

    /// Remove every entry in this namespace. Other namespaces are untouched.
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM preferences WHERE namespace = ?")
            .bind(&self.namespace)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Close the underlying pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Get current Unix timestamp.
    fn now_unix() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

#[async_trait]
impl PreferenceStore for SqlitePreferences {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM preferences WHERE namespace = ? AND key = ?")
                .bind(&self.namespace)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO preferences (namespace, key, value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(namespace, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.namespace)
        .bind(key)
        .bind(value)
        .bind(Self::now_unix())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM preferences WHERE namespace = ? AND key = ?")
            .bind(&self.namespace)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_set_and_get() {
        let prefs = SqlitePreferences::in_memory("CodePushPrefs").await.unwrap();

        prefs.set("rollout", "50").await.unwrap();
        assert_eq!(prefs.get("rollout").await.unwrap().as_deref(), Some("50"));
    }

    #[tokio::test]
    async fn test_sqlite_get_nonexistent() {
        let prefs = SqlitePreferences::in_memory("CodePushPrefs").await.unwrap();
        assert!(prefs.get("rollout").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_overwrite() {
        let prefs = SqlitePreferences::in_memory("CodePushPrefs").await.unwrap();

        prefs.set("rollout", "10").await.unwrap();
        prefs.set("rollout", "90").await.unwrap();

        assert_eq!(prefs.get("rollout").await.unwrap().as_deref(), Some("90"));
        assert_eq!(prefs.keys().await.unwrap(), vec!["rollout".to_string()]);
    }

    #[tokio::test]
    async fn test_sqlite_remove() {
        let prefs = SqlitePreferences::in_memory("CodePushPrefs").await.unwrap();

        prefs.set("a", "1").await.unwrap();
        prefs.set("b", "2").await.unwrap();
        prefs.remove("a").await.unwrap();
        prefs.remove("missing").await.unwrap();

        assert!(prefs.get("a").await.unwrap().is_none());
        assert_eq!(prefs.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_sqlite_namespaces_are_isolated() {
        let prefs = SqlitePreferences::in_memory("CodePushPrefs").await.unwrap();
        let other = prefs.namespaced("OtherPrefs");

        prefs.set("rollout", "50").await.unwrap();
        other.set("rollout", "75").await.unwrap();

        assert_eq!(prefs.get("rollout").await.unwrap().as_deref(), Some("50"));
        assert_eq!(other.get("rollout").await.unwrap().as_deref(), Some("75"));

        other.clear().await.unwrap();
        assert!(other.get("rollout").await.unwrap().is_none());
        assert_eq!(prefs.get("rollout").await.unwrap().as_deref(), Some("50"));
    }

    #[tokio::test]
    async fn test_sqlite_path_with_query_characters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs?mode=ro.db");

        let prefs = SqlitePreferences::open(&path, "CodePushPrefs").await.unwrap();
        prefs.set("rollout", "50").await.unwrap();
        assert_eq!(prefs.get("rollout").await.unwrap().as_deref(), Some("50"));
        prefs.close().await;

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.db");

        {
            let prefs = SqlitePreferences::open(&path, "CodePushPrefs").await.unwrap();
            prefs.set("rollout", "50").await.unwrap();
            prefs.close().await;
        }

        let prefs = SqlitePreferences::open(&path, "CodePushPrefs").await.unwrap();
        assert_eq!(prefs.get("rollout").await.unwrap().as_deref(), Some("50"));
        prefs.close().await;
    }
}
