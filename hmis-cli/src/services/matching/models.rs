//! Match result types and diagnostic suggestions

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Serialize;

/// Strategy that resolved a vocabulary key to an observed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    ExactCi,
    Partial,
    Fuzzy,
    /// No strategy matched; the entry is reported with value 0
    Default,
}

impl MatchType {
    /// Display label for match type
    pub fn label(&self) -> &'static str {
        match self {
            MatchType::Exact => "[Exact]",
            MatchType::ExactCi => "[Exact CI]",
            MatchType::Partial => "[Partial]",
            MatchType::Fuzzy => "[Fuzzy]",
            MatchType::Default => "[None]",
        }
    }
}

/// Resolution of one vocabulary entry against the observed indicators.
///
/// Exactly one of these exists per vocabulary entry, matched or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub indicator_key: String,
    pub backend_code: String,
    pub value: f64,
    pub match_type: MatchType,
    /// Observed indicator name that supplied the value, when one matched
    pub source_indicator: Option<String>,
}

/// Near-miss suggestions for an unmatched vocabulary key.
///
/// Diagnostics only: scored with SkimMatcherV2, never consulted by the
/// deterministic matching cascade.
pub fn suggestions(key: &str, observed_names: &[String], limit: usize) -> Vec<String> {
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &String)> = observed_names
        .iter()
        .filter_map(|name| matcher.fuzzy_match(name, key).map(|score| (score, name)))
        .collect();
    // Stable sort keeps first-observed order on score ties
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, n)| n.clone()).collect()
}
