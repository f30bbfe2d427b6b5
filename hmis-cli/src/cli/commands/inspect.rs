//! Inspect command: reconcile one file and show the full match table
//!
//! Touches neither the tracker nor the backend; meant for checking a new
//! facility export before it enters the regular run cycle.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;

use crate::cli::InspectArgs;
use crate::config::Config;
use crate::reconcile::excel::{normalize, open_source_workbook, write_review_excel};
use crate::services::matching::{MatchType, match_vocabulary, suggestions};

pub fn handle_inspect_command(config_path: Option<PathBuf>, args: InspectArgs) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;

    if !args.file.exists() {
        anyhow::bail!("Source file does not exist: {}", args.file.display());
    }

    let workbook = open_source_workbook(&args.file)?;
    let normalized = normalize(&workbook, &config.normalize_options());
    let outcome = match_vocabulary(
        &config.vocabulary,
        &normalized.records,
        config.matching.fuzzy_threshold,
    );

    println!(
        "{}: {} sheet(s), {} record(s), {} warning(s)",
        args.file.display().to_string().bold(),
        workbook.sheets.len(),
        normalized.records.len(),
        normalized.warnings.len()
    );
    for warning in &normalized.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }

    println!();
    for result in &outcome.results {
        let label = match result.match_type {
            MatchType::Exact | MatchType::ExactCi => result.match_type.label().green(),
            MatchType::Partial | MatchType::Fuzzy => result.match_type.label().yellow(),
            MatchType::Default => result.match_type.label().red(),
        };
        println!(
            "{:<28} {:>10} {} {}",
            result.indicator_key,
            result.value,
            label,
            result.source_indicator.as_deref().unwrap_or("").dimmed()
        );
        if result.match_type == MatchType::Default {
            let hints = suggestions(&result.indicator_key, outcome.observed.names(), 3);
            if !hints.is_empty() {
                println!("  {} {}", "near misses:".dimmed(), hints.join(", "));
            }
        }
    }

    let stats = &outcome.stats;
    println!(
        "\nmatched {}/{} (exact {}, exact-ci {}, partial {}, fuzzy {}, none {})",
        stats.matched(),
        stats.total(),
        stats.exact,
        stats.exact_ci,
        stats.partial,
        stats.fuzzy,
        stats.default
    );

    if let Some(export) = &args.export {
        let path = export
            .to_str()
            .with_context(|| format!("Invalid export path: {}", export.display()))?;
        write_review_excel(path, &outcome, &normalized.warnings)?;
        println!("\nReview workbook written to {}", export.display());
    }

    Ok(())
}
