//! Session storage in an in-memory SQLite database.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use super::SessionStorage;
use crate::error::{Error, Result, StorageError};

/// Session storage backed by a private `sqlite::memory:` database
///
/// The pool is pinned to a single connection that never expires: every
/// connection to `:memory:` opens its own database, so recycling it would lose
/// the session's data.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Open a new, empty in-memory database and create the schema
    pub async fn open() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            Error::Storage(StorageError::ConnectionFailed(format!(
                "Failed to parse connection string: {}",
                e
            )))
        })?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await
            .map_err(|e| {
                Error::Storage(StorageError::ConnectionFailed(format!(
                    "Failed to open in-memory database: {}",
                    e
                )))
            })?;

        let storage = Self { pool };
        storage.create_schema().await?;
        Ok(storage)
    }

    async fn create_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_items (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Storage(StorageError::MigrationFailed(format!(
                "Failed to create session_items table: {}",
                e
            )))
        })?;

        Ok(())
    }

    /// Close the pool, discarding all stored items
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SessionStorage for SqliteStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            r#"
            SELECT value FROM session_items WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            Error::Storage(StorageError::QueryFailed(format!(
                "Failed to read session item: {}",
                e
            )))
        })?;

        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        sqlx::query(
            r#"
            INSERT INTO session_items (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Storage(StorageError::QueryFailed(format!(
                "Failed to write session item: {}",
                e
            )))
        })?;

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM session_items WHERE key = ?
            "#,
        )
        .bind(key)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Storage(StorageError::QueryFailed(format!(
                "Failed to remove session item: {}",
                e
            )))
        })?;

        Ok(())
    }

    fn name(&self) -> &'static str {
        "sqlite-memory"
    }
}
