//! Command-line interface definitions

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "hmis-cli",
    about = "Reconcile health facility spreadsheet reports against an HMIS backend",
    version
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile new or changed source files and submit value sets
    Run(RunArgs),
    /// Show tracked source files
    Status,
    /// Remove file records not processed within the retention horizon
    Prune(PruneArgs),
    /// Normalize and match one file, without tracking or upload
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Source directory to scan (overrides the configured one)
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Reconcile without uploading or committing tracker state
    #[arg(long)]
    pub dry_run: bool,

    /// Process files one at a time instead of in parallel
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Debug, Args)]
pub struct PruneArgs {
    /// Retention horizon in days (overrides the configured one)
    #[arg(long)]
    pub older_than_days: Option<i64>,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Source file to inspect
    pub file: PathBuf,

    /// Write a review workbook with the match table and warnings
    #[arg(long)]
    pub export: Option<PathBuf>,
}
