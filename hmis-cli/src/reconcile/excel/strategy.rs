//! File-name signatures for selecting a sheet-parsing strategy
//!
//! Facilities export the same registers under wildly different names; the
//! file name is the only reliable signal for which layout to expect.

use once_cell::sync::Lazy;
use regex::Regex;

/// Parsing requirements for one known source layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetStrategy {
    pub name: &'static str,
    /// Whether rows without a site name are invalid for this layout
    pub requires_site: bool,
}

/// Fallback for files matching no known signature
pub const GENERIC: SheetStrategy = SheetStrategy {
    name: "generic",
    requires_site: false,
};

static SIGNATURES: Lazy<Vec<(Regex, SheetStrategy)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)art[\s_-]?register").unwrap(),
            SheetStrategy {
                name: "art_register",
                requires_site: true,
            },
        ),
        (
            Regex::new(r"(?i)\bhts\b|hiv[\s_-]?testing").unwrap(),
            SheetStrategy {
                name: "hts",
                requires_site: true,
            },
        ),
        (
            Regex::new(r"(?i)facility.*(monthly|report)").unwrap(),
            SheetStrategy {
                name: "facility_monthly",
                requires_site: false,
            },
        ),
    ]
});

/// Pick a strategy from the source file name; first signature wins
pub fn select_strategy(file_name: &str) -> SheetStrategy {
    for (pattern, strategy) in SIGNATURES.iter() {
        if pattern.is_match(file_name) {
            return *strategy;
        }
    }
    GENERIC
}
