//! Run command: classify source files, reconcile each new/changed one,
//! submit the payload, and commit tracker state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::*;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::api::{HttpValueSetApi, ValueSetApi};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::config::repository::{self, files};
use crate::reconcile::excel::is_supported_source;
use crate::reconcile::pipeline::{self, FileOutcome, FileReport, RunSummary};
use crate::reconcile::tracker::classify;
use crate::reconcile::types::FileInfo;

pub async fn handle_run_command(config_path: Option<PathBuf>, args: RunArgs) -> Result<()> {
    let config = Arc::new(Config::load(config_path.as_deref())?);

    let source_dir = args
        .source_dir
        .clone()
        .or_else(|| config.source.dir.clone())
        .context("No source directory: pass --source-dir or set [source] dir in the config")?;

    // A tracker store failure aborts the run here, before any file is
    // touched: committing without durable tracking would risk silent
    // duplicate submission.
    let pool = repository::open_pool(&config.tracker_db_path()?).await?;
    let known = files::all_file_records(&pool).await?;

    let listing = list_source_files(&source_dir)?;
    let classification = classify(&listing, &known);

    log::info!(
        "{} source file(s): {} new/changed, {} unchanged",
        listing.len(),
        classification.new_or_changed.len(),
        classification.unchanged.len()
    );

    let api: Option<Arc<dyn ValueSetApi>> = if args.dry_run {
        None
    } else {
        let options = config.api.as_ref().context(
            "No [api] section in the config; use --dry-run to reconcile without uploading",
        )?;
        Some(Arc::new(HttpValueSetApi::from_env(&options.base_url)?))
    };

    let run_id = Uuid::new_v4();
    let mut summary = RunSummary::new(run_id);

    for info in &classification.unchanged {
        summary.reports.push(FileReport {
            name: info.name.clone(),
            outcome: FileOutcome::SkippedUnchanged,
        });
    }

    if args.sequential {
        for info in classification.new_or_changed {
            let path = source_dir.join(&info.name);
            let report = process_one(
                path,
                info,
                Arc::clone(&config),
                api.clone(),
                pool.clone(),
                run_id,
                args.dry_run,
            )
            .await;
            summary.reports.push(report);
        }
    } else {
        let tasks: Vec<_> = classification
            .new_or_changed
            .into_iter()
            .map(|info| {
                let path = source_dir.join(&info.name);
                process_one(
                    path,
                    info,
                    Arc::clone(&config),
                    api.clone(),
                    pool.clone(),
                    run_id,
                    args.dry_run,
                )
            })
            .collect();
        summary.reports.extend(futures::future::join_all(tasks).await);
    }

    print_summary(&summary, args.dry_run);

    if summary.failed_count() > 0 {
        anyhow::bail!(
            "{} file(s) failed; they remain queued for the next run",
            summary.failed_count()
        );
    }

    Ok(())
}

/// One file's pipeline plus upload and tracker commit; failures are
/// isolated here and never abort sibling files
async fn process_one(
    path: PathBuf,
    info: FileInfo,
    config: Arc<Config>,
    api: Option<Arc<dyn ValueSetApi>>,
    pool: SqlitePool,
    run_id: Uuid,
    dry_run: bool,
) -> FileReport {
    let name = info.name.clone();
    let outcome = run_file(path, info, config, api, pool, run_id, dry_run).await;
    if let FileOutcome::Failed { error } = &outcome {
        log::error!("{}: {}", name, error);
    }
    FileReport { name, outcome }
}

async fn run_file(
    path: PathBuf,
    info: FileInfo,
    config: Arc<Config>,
    api: Option<Arc<dyn ValueSetApi>>,
    pool: SqlitePool,
    run_id: Uuid,
    dry_run: bool,
) -> FileOutcome {
    // normalization and matching are CPU-bound; keep them off the async workers
    let processed = {
        let config = Arc::clone(&config);
        let task =
            tokio::task::spawn_blocking(move || pipeline::process_file(&path, &config, run_id));
        match task.await {
            Ok(Ok(processed)) => processed,
            Ok(Err(error)) => {
                return FileOutcome::Failed {
                    error: format!("{:#}", error),
                };
            }
            Err(error) => {
                return FileOutcome::Failed {
                    error: format!("pipeline task panicked: {}", error),
                };
            }
        }
    };

    for warning in &processed.warnings {
        log::warn!("{}: {}", info.name, warning);
    }

    let import = match &api {
        Some(api) => match api.post_value_set(&processed.payload).await {
            Ok(summary) => {
                log::info!("{}: backend import: {}", info.name, summary);
                Some(summary)
            }
            Err(error) => {
                return FileOutcome::Failed {
                    error: format!("{:#}", error),
                };
            }
        },
        None => None,
    };

    if !dry_run {
        // Commit only now, after the full pipeline and upload succeeded;
        // a failed file stays new/changed and is retried next run.
        if let Err(error) = files::commit_file_record(&pool, &info, Utc::now()).await {
            return FileOutcome::Failed {
                error: format!("{:#}", error),
            };
        }
    }

    FileOutcome::Processed {
        stats: processed.stats,
        record_count: processed.record_count,
        warning_count: processed.warnings.len(),
        import,
    }
}

/// List supported source files with the metadata the tracker keys on
fn list_source_files(dir: &Path) -> Result<Vec<FileInfo>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list source directory: {}", dir.display()))?;

    let mut listing = Vec::new();
    for entry in entries {
        let entry = entry
            .with_context(|| format!("Failed to read directory entry in {}", dir.display()))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !is_supported_source(&name) {
            continue;
        }
        let metadata = entry
            .metadata()
            .with_context(|| format!("Failed to stat source file: {}", name))?;
        if !metadata.is_file() {
            continue;
        }
        let modified: DateTime<Utc> = metadata
            .modified()
            .with_context(|| format!("Failed to read mtime of source file: {}", name))?
            .into();
        listing.push(FileInfo {
            name,
            size: metadata.len() as i64,
            modified,
        });
    }

    // deterministic processing order regardless of directory iteration
    listing.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}

fn print_summary(summary: &RunSummary, dry_run: bool) {
    println!();
    if dry_run {
        println!("{}", "Dry run: no uploads, no tracker commits".yellow());
    }

    for report in &summary.reports {
        match &report.outcome {
            FileOutcome::Processed {
                stats,
                record_count,
                warning_count,
                import,
            } => {
                print!(
                    "{} {}  {} record(s), matched {}/{}",
                    "processed".green(),
                    report.name.bold(),
                    record_count,
                    stats.matched(),
                    stats.total()
                );
                if *warning_count > 0 {
                    print!("  {}", format!("{} warning(s)", warning_count).yellow());
                }
                if let Some(import) = import {
                    print!("  [{}]", import);
                }
                println!();
            }
            FileOutcome::SkippedUnchanged => {
                println!("{} {}", "unchanged".dimmed(), report.name);
            }
            FileOutcome::Failed { error } => {
                println!("{} {}  {}", "failed".red(), report.name.bold(), error);
            }
        }
    }

    println!(
        "\n{} processed, {} unchanged, {} failed  (run {})",
        summary.processed_count(),
        summary.skipped_count(),
        summary.failed_count(),
        summary.run_id
    );
}
