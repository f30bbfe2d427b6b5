//! File-record store backing the change tracker

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use sqlx::{Row, SqlitePool};

use crate::reconcile::types::{FileInfo, FileRecord};

/// Load every known file record, keyed by file name
pub async fn all_file_records(pool: &SqlitePool) -> Result<HashMap<String, FileRecord>> {
    let rows = sqlx::query(
        "SELECT name, size, modified, last_processed_at FROM file_records ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .context("Failed to load file records")?;

    let mut records = HashMap::new();
    for row in rows {
        let record = FileRecord {
            name: row.try_get("name")?,
            size: row.try_get("size")?,
            modified: row.try_get("modified")?,
            last_processed_at: row.try_get("last_processed_at")?,
        };
        records.insert(record.name.clone(), record);
    }

    Ok(records)
}

/// Record a file as processed: upsert its size/mtime and stamp the
/// processing time. Called only after the file's pipeline has fully
/// succeeded; never called on failure, so failed files stay classified
/// as new/changed and are retried on the next run.
pub async fn commit_file_record(
    pool: &SqlitePool,
    info: &FileInfo,
    processed_at: DateTime<Utc>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO file_records (name, size, modified, last_processed_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            size = excluded.size,
            modified = excluded.modified,
            last_processed_at = excluded.last_processed_at
        "#,
    )
    .bind(&info.name)
    .bind(info.size)
    .bind(info.modified)
    .bind(processed_at)
    .execute(pool)
    .await
    .with_context(|| format!("Failed to commit file record: {}", info.name))?;

    Ok(())
}

/// Retention sweep: delete records whose last processing predates the
/// horizon. Runs only from the `prune` command, never inline in a run,
/// so a failing sweep can never block ingestion.
pub async fn prune_file_records(
    pool: &SqlitePool,
    now: DateTime<Utc>,
    retention_days: i64,
) -> Result<u64> {
    let cutoff = now - Duration::days(retention_days);

    let result = sqlx::query(
        "DELETE FROM file_records WHERE last_processed_at IS NOT NULL AND last_processed_at < ?",
    )
    .bind(cutoff)
    .execute(pool)
    .await
    .context("Failed to prune file records")?;

    Ok(result.rows_affected())
}
