//! Status command: show the tracker's known source files

use std::path::PathBuf;

use anyhow::Result;

use crate::config::Config;
use crate::config::repository::{self, files};

pub async fn handle_status_command(config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let pool = repository::open_pool(&config.tracker_db_path()?).await?;
    let records = files::all_file_records(&pool).await?;

    if records.is_empty() {
        println!("No tracked source files.");
        return Ok(());
    }

    let mut rows: Vec<_> = records.into_values().collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    println!(
        "{:<44} {:>12}  {:<20} {:<20}",
        "name", "size", "modified", "last processed"
    );
    for record in rows {
        println!(
            "{:<44} {:>12}  {:<20} {:<20}",
            record.name,
            record.size,
            record.modified.format("%Y-%m-%d %H:%M:%S"),
            record
                .last_processed_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".into())
        );
    }

    Ok(())
}
