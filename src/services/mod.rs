//! Service layer: storage adapters and the background worker.

pub mod kv_index;
pub mod object_store;
pub mod worker;

use sqlx::SqlitePool;

/// Apply the embedded schema to `db`.
///
/// Statements all use `IF NOT EXISTS`, so this is safe to run on every
/// startup as well as from `--migrate`.
pub async fn apply_migrations(db: &SqlitePool) -> Result<(), sqlx::Error> {
    let sql = include_str!("../../migrations/0001_init.sql");
    let statements = sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::debug!("Running {} migration statements...", statements.len());

    for stmt in statements {
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}
