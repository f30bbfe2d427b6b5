//! Wire shapes for the reporting backend's value-set endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::matching::MatchStats;

/// One submitted value, keyed by backend data-element code
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValue {
    pub data_element: String,
    pub period: String,
    pub org_unit: String,
    pub value: f64,
    /// Match provenance, carried for reviewers on the backend side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Three-bucket match summary embedded in the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStatsSummary {
    pub exact: usize,
    pub partial: usize,
    pub none: usize,
}

impl From<&MatchStats> for MatchStatsSummary {
    fn from(stats: &MatchStats) -> Self {
        Self {
            exact: stats.exact + stats.exact_ci,
            partial: stats.partial + stats.fuzzy,
            none: stats.default,
        }
    }
}

/// The backend's expected submission shape plus provenance metadata.
/// Assembled fresh each run; immutable once produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetPayload {
    pub data_set: String,
    pub period: String,
    pub org_unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_option_combo: Option<String>,
    pub data_values: Vec<DataValue>,
    pub match_stats: MatchStatsSummary,
    pub generated_at: DateTime<Utc>,
    pub run_id: Uuid,
}

/// Import summary returned by the backend; logged, never acted upon
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportSummary {
    pub imported: u64,
    pub updated: u64,
    pub ignored: u64,
    pub deleted: u64,
}

impl std::fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "imported {}, updated {}, ignored {}, deleted {}",
            self.imported, self.updated, self.ignored, self.deleted
        )
    }
}
