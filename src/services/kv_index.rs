//! KvIndex — string key→value lookups over SQLite.
//!
//! A write is a last-writer-wins overwrite; there is no expiry, no
//! transaction spanning multiple keys, and no compare-and-set. The gateway
//! and the worker both write here with no coordination between them.

use sqlx::SqlitePool;
use std::sync::Arc;

/// Simple key-value index shared by the gateway and the worker.
#[derive(Clone)]
pub struct KvIndex {
    db: Arc<SqlitePool>,
}

impl KvIndex {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Set `key` to `value`, overwriting any previous value.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO index_entries (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    /// Get the value stored under `key`, or None if absent.
    pub async fn get(&self, key: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT value FROM index_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&*self.db)
            .await
    }
}
