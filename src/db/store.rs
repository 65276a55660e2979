//! Key-value store abstraction.
//!
//! Every persisted value lives under one of the well-known keys below, stored as a
//! string. Readers decode at the boundary; the store itself knows nothing about shapes.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;

use crate::errors::AppError;

/// Stored keys. Names are fixed for compatibility with existing persisted data.
pub mod keys {
    pub const FAILED_ATTEMPT_COUNT: &str = "failedAttemptCount";
    pub const LOCKOUT_EXPIRY: &str = "lockoutExpiryEpochMillis";
    pub const MEMBER_RECORDS: &str = "memberRecords";
    pub const EXPERIENCE_RECORDS: &str = "experienceRecords";
}

/// Trait for key-value storage backends.
#[trait_variant::make(KeyValueStore: Send)]
pub trait LocalKeyValueStore {
    /// Fetch the raw value for `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Insert or replace the value for `key`.
    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    /// Delete `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// SQLite-backed store using the `kv` table.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// In-process store. Contents are lost when dropped.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
