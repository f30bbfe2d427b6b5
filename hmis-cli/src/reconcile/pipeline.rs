//! One file's reconciliation pipeline and run reporting types
//!
//! read -> normalize -> match -> assemble, CPU-bound and synchronous.
//! Pipelines share nothing mutable, so sibling files can run in parallel
//! and a failure is always isolated to its own file.

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::api::models::{ImportSummary, ValueSetPayload};
use crate::config::Config;
use crate::reconcile::assemble::assemble;
use crate::reconcile::excel::{normalize, open_source_workbook};
use crate::reconcile::types::ValidationWarning;
use crate::services::matching::{MatchStats, match_vocabulary};

/// Everything one successful pipeline produced
pub struct ProcessedFile {
    pub payload: ValueSetPayload,
    pub stats: MatchStats,
    pub record_count: usize,
    pub warnings: Vec<ValidationWarning>,
}

/// Run the full pipeline for a single source file.
///
/// Fails only when the container cannot be read; malformed content comes
/// back as warnings inside an otherwise successful result.
pub fn process_file(path: &Path, config: &Config, run_id: Uuid) -> Result<ProcessedFile> {
    let workbook = open_source_workbook(path)?;
    let normalized = normalize(&workbook, &config.normalize_options());
    let outcome = match_vocabulary(
        &config.vocabulary,
        &normalized.records,
        config.matching.fuzzy_threshold,
    );
    let payload = assemble(&outcome.results, &config.coordinates, run_id, Utc::now());

    Ok(ProcessedFile {
        payload,
        stats: outcome.stats,
        record_count: normalized.records.len(),
        warnings: normalized.warnings,
    })
}

/// Terminal state of one file within a run
#[derive(Debug)]
pub enum FileOutcome {
    Processed {
        stats: MatchStats,
        record_count: usize,
        warning_count: usize,
        import: Option<ImportSummary>,
    },
    SkippedUnchanged,
    Failed {
        error: String,
    },
}

/// Per-file outcome paired with the file name
#[derive(Debug)]
pub struct FileReport {
    pub name: String,
    pub outcome: FileOutcome,
}

/// Aggregate outcome of one run, reported even on partial failure
#[derive(Debug)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            reports: Vec::new(),
        }
    }

    pub fn processed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Processed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::SkippedUnchanged))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Failed { .. }))
            .count()
    }
}
