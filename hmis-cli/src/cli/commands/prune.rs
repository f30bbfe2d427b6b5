//! Prune command: retention sweep over the tracker store
//!
//! Deliberately a separate command rather than part of `run`, so a failing
//! sweep can never block ingestion.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use crate::cli::PruneArgs;
use crate::config::Config;
use crate::config::repository::{self, files};

pub async fn handle_prune_command(config_path: Option<PathBuf>, args: PruneArgs) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;

    let retention_days = args.older_than_days.unwrap_or(config.tracker.retention_days);
    if retention_days <= 0 {
        anyhow::bail!("Retention horizon must be positive, got {}", retention_days);
    }

    let pool = repository::open_pool(&config.tracker_db_path()?).await?;
    let removed = files::prune_file_records(&pool, Utc::now(), retention_days).await?;

    println!(
        "Pruned {} file record(s) not processed in the last {} day(s)",
        removed, retention_days
    );

    Ok(())
}
