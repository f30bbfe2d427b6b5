//! Matching service: resolve a target vocabulary against observed indicators
//!
//! Pure business logic, decoupled from the CLI and the pipeline. Given the
//! same vocabulary and record set this always produces the same output:
//! candidates are visited in insertion order and every tie-break is
//! documented in `core`.

pub mod core;
pub mod models;

pub use self::core::ObservedIndex;
pub use models::{MatchResult, MatchType, suggestions};

use serde::Deserialize;

use crate::reconcile::types::CanonicalRecord;

/// Fixed mapping from canonical indicator key to backend data-element code.
///
/// Loaded once per run from configuration; entry order is the matcher's
/// documented tie-break order and is never reordered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct IndicatorVocabulary {
    entries: Vec<VocabularyEntry>,
}

/// One vocabulary entry
#[derive(Debug, Clone, Deserialize)]
pub struct VocabularyEntry {
    pub key: String,
    pub data_element: String,
}

impl IndicatorVocabulary {
    pub fn new(entries: Vec<VocabularyEntry>) -> Self {
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &VocabularyEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tally of match types across one result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub exact: usize,
    pub exact_ci: usize,
    pub partial: usize,
    pub fuzzy: usize,
    pub default: usize,
}

impl MatchStats {
    pub fn record(&mut self, match_type: MatchType) {
        match match_type {
            MatchType::Exact => self.exact += 1,
            MatchType::ExactCi => self.exact_ci += 1,
            MatchType::Partial => self.partial += 1,
            MatchType::Fuzzy => self.fuzzy += 1,
            MatchType::Default => self.default += 1,
        }
    }

    /// Tally a whole result set
    pub fn from_results(results: &[MatchResult]) -> Self {
        let mut stats = MatchStats::default();
        for result in results {
            stats.record(result.match_type);
        }
        stats
    }

    /// Entries resolved by any strategy
    pub fn matched(&self) -> usize {
        self.exact + self.exact_ci + self.partial + self.fuzzy
    }

    pub fn total(&self) -> usize {
        self.matched() + self.default
    }
}

/// Complete matching output for one source file
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub results: Vec<MatchResult>,
    pub stats: MatchStats,
    /// Observed index the cascade ran against, kept for diagnostics
    pub observed: ObservedIndex,
}

/// Resolve every vocabulary entry against the observed records.
///
/// Strategies run in a fixed cascade per entry, stopping at the first hit:
/// exact, exact case-insensitive, substring, fuzzy token-overlap. Entries
/// with no match are reported as `Default` with value 0 — the output always
/// has exactly one result per vocabulary entry.
pub fn match_vocabulary(
    vocabulary: &IndicatorVocabulary,
    records: &[CanonicalRecord],
    fuzzy_threshold: f64,
) -> MatchOutcome {
    let observed = ObservedIndex::from_records(records);
    let mut results = Vec::with_capacity(vocabulary.len());
    let mut stats = MatchStats::default();

    for entry in vocabulary.iter() {
        let (match_type, value, source) = resolve_entry(&entry.key, &observed, fuzzy_threshold);
        stats.record(match_type);
        results.push(MatchResult {
            indicator_key: entry.key.clone(),
            backend_code: entry.data_element.clone(),
            value,
            match_type,
            source_indicator: source,
        });
    }

    MatchOutcome {
        results,
        stats,
        observed,
    }
}

fn resolve_entry(
    key: &str,
    observed: &ObservedIndex,
    fuzzy_threshold: f64,
) -> (MatchType, f64, Option<String>) {
    if let Some(value) = core::match_exact(key, observed) {
        return (MatchType::Exact, value, Some(key.to_string()));
    }
    if let Some((name, value)) = core::match_exact_ci(key, observed) {
        return (MatchType::ExactCi, value, Some(name));
    }
    if let Some((name, value)) = core::match_partial(key, observed) {
        return (MatchType::Partial, value, Some(name));
    }
    if let Some((name, value)) = core::match_fuzzy(key, observed, fuzzy_threshold) {
        return (MatchType::Fuzzy, value, Some(name));
    }
    (MatchType::Default, 0.0, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary(entries: &[(&str, &str)]) -> IndicatorVocabulary {
        IndicatorVocabulary::new(
            entries
                .iter()
                .map(|(key, code)| VocabularyEntry {
                    key: key.to_string(),
                    data_element: code.to_string(),
                })
                .collect(),
        )
    }

    fn record(indicator: &str, value: f64) -> CanonicalRecord {
        CanonicalRecord {
            site: Some("Kigali Clinic".into()),
            indicator: indicator.into(),
            value,
            period: "202601".into(),
            org_unit: "OU_KIGALI_CLINIC".into(),
            sheet_name: "Sheet1".into(),
            row_index: 2,
        }
    }

    #[test]
    fn test_output_cardinality_equals_vocabulary() {
        let vocab = vocabulary(&[("TX_NEW", "a"), ("TX_CURR", "b"), ("HTS_TST", "c")]);
        let records = vec![record("TX_NEW", 1.0)];
        let outcome = match_vocabulary(&vocab, &records, 0.5);
        assert_eq!(outcome.results.len(), 3);

        // cardinality holds with no records at all
        let outcome = match_vocabulary(&vocab, &[], 0.5);
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.stats.default, 3);
    }

    #[test]
    fn test_exact_match_scenario() {
        let vocab = vocabulary(&[("TX_NEW", "code123")]);
        let records = vec![record("TX_NEW", 85.0)];
        let outcome = match_vocabulary(&vocab, &records, 0.5);

        let result = &outcome.results[0];
        assert_eq!(result.indicator_key, "TX_NEW");
        assert_eq!(result.backend_code, "code123");
        assert_eq!(result.value, 85.0);
        assert_eq!(result.match_type, MatchType::Exact);
        assert_eq!(result.source_indicator.as_deref(), Some("TX_NEW"));
    }

    #[test]
    fn test_fuzzy_match_scenario() {
        let vocab = vocabulary(&[("TX_NEW", "code123")]);
        let records = vec![record("Tx New Patients", 40.0)];
        let outcome = match_vocabulary(&vocab, &records, 0.5);

        let result = &outcome.results[0];
        assert_eq!(result.match_type, MatchType::Fuzzy);
        assert_eq!(result.value, 40.0);
        assert_eq!(result.source_indicator.as_deref(), Some("Tx New Patients"));
    }

    #[test]
    fn test_unmatched_entry_defaults_to_zero() {
        let vocab = vocabulary(&[("PMTCT_STAT", "code9")]);
        let records = vec![record("TX_NEW", 85.0)];
        let outcome = match_vocabulary(&vocab, &records, 0.5);

        let result = &outcome.results[0];
        assert_eq!(result.match_type, MatchType::Default);
        assert_eq!(result.value, 0.0);
        assert_eq!(result.source_indicator, None);
    }

    #[test]
    fn test_exact_beats_later_strategies() {
        // an exact record later in the file must win over a fuzzy candidate
        let vocab = vocabulary(&[("TX_NEW", "code123")]);
        let records = vec![record("Tx New Patients", 40.0), record("TX_NEW", 85.0)];
        let outcome = match_vocabulary(&vocab, &records, 0.5);

        assert_eq!(outcome.results[0].match_type, MatchType::Exact);
        assert_eq!(outcome.results[0].value, 85.0);
    }

    #[test]
    fn test_duplicate_indicator_last_wins() {
        let vocab = vocabulary(&[("TX_NEW", "code123")]);
        let records = vec![record("TX_NEW", 5.0), record("TX_NEW", 9.0)];
        let outcome = match_vocabulary(&vocab, &records, 0.5);
        assert_eq!(outcome.results[0].value, 9.0);
    }

    #[test]
    fn test_matching_is_deterministic() {
        let vocab = vocabulary(&[("TX_NEW", "a"), ("TX_CURR", "b")]);
        let records = vec![
            record("tx new adults", 1.0),
            record("tx new children", 2.0),
            record("TX_CURR", 3.0),
        ];
        let first = match_vocabulary(&vocab, &records, 0.5);
        let second = match_vocabulary(&vocab, &records, 0.5);
        assert_eq!(first.results, second.results);
    }

    #[test]
    fn test_stats_tally() {
        let vocab = vocabulary(&[("TX_NEW", "a"), ("TX_CURR", "b"), ("HTS_TST", "c")]);
        let records = vec![record("TX_NEW", 1.0), record("tx_curr", 2.0)];
        let outcome = match_vocabulary(&vocab, &records, 0.5);

        assert_eq!(outcome.stats.exact, 1);
        assert_eq!(outcome.stats.exact_ci, 1);
        assert_eq!(outcome.stats.default, 1);
        assert_eq!(outcome.stats.matched(), 2);
        assert_eq!(outcome.stats.total(), 3);
    }
}
