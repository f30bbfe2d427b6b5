//! Payload assembly: match results plus report coordinates into the
//! backend's value-set shape

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::models::{DataValue, MatchStatsSummary, ValueSetPayload};
use crate::config::ReportCoordinates;
use crate::services::matching::{MatchResult, MatchStats, MatchType};

/// Assemble a value-set payload from one file's match results.
///
/// Pure and total. Match stats are recomputed from the results rather than
/// reusing the matcher's tally, so drift between the two layers surfaces
/// as a test failure instead of a silent mismatch. Unmatched entries are
/// submitted as explicit zeros.
pub fn assemble(
    results: &[MatchResult],
    coordinates: &ReportCoordinates,
    run_id: Uuid,
    generated_at: DateTime<Utc>,
) -> ValueSetPayload {
    let data_values = results
        .iter()
        .map(|result| DataValue {
            data_element: result.backend_code.clone(),
            period: coordinates.period.clone(),
            org_unit: coordinates.org_unit.clone(),
            value: result.value,
            comment: provenance_comment(result),
        })
        .collect();

    let stats = MatchStats::from_results(results);

    ValueSetPayload {
        data_set: coordinates.data_set.clone(),
        period: coordinates.period.clone(),
        org_unit: coordinates.org_unit.clone(),
        attribute_option_combo: coordinates.attribute_option_combo.clone(),
        data_values,
        match_stats: MatchStatsSummary::from(&stats),
        generated_at,
        run_id,
    }
}

/// Reviewer-facing note on how a value was resolved; exact matches need none
fn provenance_comment(result: &MatchResult) -> Option<String> {
    match result.match_type {
        MatchType::Exact => None,
        MatchType::Default => Some("no matching source indicator".into()),
        _ => result
            .source_indicator
            .as_ref()
            .map(|name| format!("matched from '{}' {}", name, result.match_type.label())),
    }
}
