//! Session-scoped cache of assembled question sets
//!
//! Results are keyed by the requested total and stored as JSON text in a
//! [`SessionStorage`] backend. The cache is best-effort: read failures look like
//! a miss, write failures are logged and dropped, and a value that no longer
//! deserializes is deleted so the next run starts clean.
//!
//! ## Backends
//!
//! - [`MemoryStorage`]: in-process map, the default
//! - [`SqliteStorage`]: in-memory SQLite database via sqlx

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::types::QuestionRecord;

mod memory;
mod sqlite;


pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Text key/value store that lives as long as the current session
///
/// Implementations must not persist data beyond the process that created them.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read the value stored under `key`
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the value stored under `key` (no-op if absent)
    async fn remove_item(&self, key: &str) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Question-set cache on top of a [`SessionStorage`]
#[derive(Clone)]
pub struct QuestionCache {
    storage: Arc<dyn SessionStorage>,
    key_prefix: String,
    enabled: bool,
}

impl QuestionCache {
    /// Cache over `storage` using the configured key prefix
    pub fn new(storage: Arc<dyn SessionStorage>, config: &CacheConfig) -> Self {
        Self {
            storage,
            key_prefix: config.key_prefix.clone(),
            enabled: config.enabled,
        }
    }

    /// Cache backed by a fresh [`MemoryStorage`]
    pub fn in_memory(config: &CacheConfig) -> Self {
        Self::new(Arc::new(MemoryStorage::new()), config)
    }

    /// Storage key for a requested total
    pub fn key(&self, total_amount: u32) -> String {
        format!("{}{}", self.key_prefix, total_amount)
    }

    /// Previously stored set for `total_amount`
    ///
    /// Returns `None` when the cache is disabled, nothing is stored, the stored
    /// set is empty, the backend fails, or the value is corrupt. Corrupt values
    /// are removed before returning.
    pub async fn get(&self, total_amount: u32) -> Option<Vec<QuestionRecord>> {
        if !self.enabled {
            return None;
        }

        let key = self.key(total_amount);
        match self.load(&key).await {
            Ok(Some(records)) if !records.is_empty() => {
                tracing::debug!(key = %key, records = records.len(), "Cache hit");
                Some(records)
            }
            Ok(_) => None,
            Err(e @ Error::CacheCorrupt { .. }) => {
                tracing::warn!(error = %e, "Discarding corrupt cache entry");
                if let Err(remove_err) = self.storage.remove_item(&key).await {
                    tracing::warn!(
                        key = %key,
                        storage = self.storage.name(),
                        error = %remove_err,
                        "Failed to remove corrupt cache entry"
                    );
                }
                None
            }
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    storage = self.storage.name(),
                    error = %e,
                    "Cache read failed, treating as miss"
                );
                None
            }
        }
    }

    /// Store `records` for `total_amount`, overwriting any previous set
    ///
    /// Failures are logged and swallowed.
    pub async fn put(&self, total_amount: u32, records: &[QuestionRecord]) {
        if !self.enabled {
            return;
        }

        let key = self.key(total_amount);
        let result = match serde_json::to_string(records) {
            Ok(value) => self.storage.set_item(&key, &value).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(()) => {
                tracing::debug!(key = %key, records = records.len(), "Cached question set");
            }
            Err(e) => {
                tracing::warn!(
                    key = %key,
                    storage = self.storage.name(),
                    error = %e,
                    "Failed to write cache entry"
                );
            }
        }
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<QuestionRecord>>> {
        let Some(raw) = self.storage.get_item(key).await? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::CacheCorrupt {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }
}

impl std::fmt::Debug for QuestionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestionCache")
            .field("storage", &self.storage.name())
            .field("key_prefix", &self.key_prefix)
            .field("enabled", &self.enabled)
            .finish()
    }
}
