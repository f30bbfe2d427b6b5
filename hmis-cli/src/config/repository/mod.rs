//! Repository layer for tracker persistence

pub mod files;

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Open (and create if missing) the tracker database at the given path.
///
/// Failure here is fatal for the whole run: no file may be committed
/// without durable tracking, or reprocessing guarantees are lost.
pub async fn open_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open tracker database: {}", db_path.display()))?;

    init_schema(&pool).await?;
    Ok(pool)
}

async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS file_records (
            name TEXT PRIMARY KEY,
            size INTEGER NOT NULL,
            modified TEXT NOT NULL,
            last_processed_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to initialize tracker schema")?;

    Ok(())
}

/// In-memory pool for unit tests; single connection so the database
/// outlives individual acquires
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    init_schema(&pool).await.expect("schema");
    pool
}
