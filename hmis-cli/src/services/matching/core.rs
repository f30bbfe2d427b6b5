//! Core matching strategies for indicator reconciliation
//!
//! Each strategy is a pure function over the observed-indicator index.
//! Determinism contract: candidates are always visited in the index's
//! insertion order, and the first best candidate wins on ties.

use std::collections::HashMap;

use crate::reconcile::types::CanonicalRecord;

/// Insertion-ordered index of observed indicator names to values.
///
/// A later record with the same name overwrites the value but keeps the
/// name's original position (last value wins, first position wins).
#[derive(Debug, Clone, Default)]
pub struct ObservedIndex {
    names: Vec<String>,
    values: HashMap<String, f64>,
}

impl ObservedIndex {
    /// Build the index from normalized records, in record order
    pub fn from_records(records: &[CanonicalRecord]) -> Self {
        let mut index = ObservedIndex::default();
        for record in records {
            index.insert(&record.indicator, record.value);
        }
        index
    }

    pub fn insert(&mut self, name: &str, value: f64) {
        if !self.values.contains_key(name) {
            self.names.push(name.to_string());
        }
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Iterate (name, value) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names.iter().map(|n| (n.as_str(), self.values[n]))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Strategy 1: exact, case-sensitive
pub fn match_exact(key: &str, observed: &ObservedIndex) -> Option<f64> {
    observed.get(key)
}

/// Strategy 2: exact after lowercasing both sides
pub fn match_exact_ci(key: &str, observed: &ObservedIndex) -> Option<(String, f64)> {
    let key_lower = key.to_lowercase();
    observed
        .iter()
        .find(|(name, _)| name.to_lowercase() == key_lower)
        .map(|(name, value)| (name.to_string(), value))
}

/// Strategy 3: substring containment in either direction
pub fn match_partial(key: &str, observed: &ObservedIndex) -> Option<(String, f64)> {
    let key_lower = key.to_lowercase();
    observed
        .iter()
        .find(|(name, _)| {
            let name_lower = name.to_lowercase();
            name_lower.contains(&key_lower) || key_lower.contains(&name_lower)
        })
        .map(|(name, value)| (name.to_string(), value))
}

/// Strategy 4: token-overlap scoring, best candidate above the threshold
pub fn match_fuzzy(key: &str, observed: &ObservedIndex, threshold: f64) -> Option<(String, f64)> {
    let target_tokens = tokenize(key);
    let mut best: Option<(String, f64)> = None;
    let mut best_score = threshold;

    for (name, value) in observed.iter() {
        let score = token_overlap_score(&target_tokens, &tokenize(name));
        // Strictly greater: the first candidate keeps a tied score
        if score > best_score {
            best_score = score;
            best = Some((name.to_string(), value));
        }
    }

    best
}

/// Split an indicator name into lowercase tokens on whitespace, hyphens,
/// and underscores
pub fn tokenize(name: &str) -> Vec<String> {
    name.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Token-overlap score between two token lists.
///
/// Fixed formula: every token pair contributes +2 on an exact match and +1
/// when one token contains the other; the sum is normalized by the larger
/// token count.
pub fn token_overlap_score(target: &[String], candidate: &[String]) -> f64 {
    if target.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let mut score = 0.0;
    for t in target {
        for c in candidate {
            if t == c {
                score += 2.0;
            } else if t.contains(c.as_str()) || c.contains(t.as_str()) {
                score += 1.0;
            }
        }
    }

    score / target.len().max(candidate.len()) as f64
}
