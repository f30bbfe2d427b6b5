//! File change classification
//!
//! Pure function over a directory listing and the persisted file records;
//! committing updated records is a separate, explicit repository step that
//! runs only after a file's pipeline succeeds. A crash between
//! classification and commit therefore causes reprocessing, never loss.

use std::collections::HashMap;

use crate::reconcile::types::{FileInfo, FileRecord};

/// Listing split into files needing processing and files already seen
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub new_or_changed: Vec<FileInfo>,
    pub unchanged: Vec<FileInfo>,
}

/// Classify a directory listing against the known-file records.
///
/// A file is new/changed when its name is unknown, or when its size or
/// modification time differs from the stored record.
pub fn classify(listing: &[FileInfo], known: &HashMap<String, FileRecord>) -> Classification {
    let mut classification = Classification::default();

    for info in listing {
        let changed = match known.get(&info.name) {
            Some(record) => record.size != info.size || record.modified != info.modified,
            None => true,
        };
        if changed {
            classification.new_or_changed.push(info.clone());
        } else {
            classification.unchanged.push(info.clone());
        }
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn info(name: &str, size: i64, ts: i64) -> FileInfo {
        FileInfo {
            name: name.into(),
            size,
            modified: Utc.timestamp_opt(ts, 0).unwrap(),
        }
    }

    fn known(records: &[(&str, i64, i64)]) -> HashMap<String, FileRecord> {
        records
            .iter()
            .map(|(name, size, ts)| {
                (
                    name.to_string(),
                    FileRecord {
                        name: name.to_string(),
                        size: *size,
                        modified: Utc.timestamp_opt(*ts, 0).unwrap(),
                        last_processed_at: Some(Utc.timestamp_opt(*ts + 60, 0).unwrap()),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_unknown_file_is_new() {
        let listing = vec![info("a.xlsx", 100, 1000)];
        let result = classify(&listing, &HashMap::new());
        assert_eq!(result.new_or_changed.len(), 1);
        assert!(result.unchanged.is_empty());
    }

    #[test]
    fn test_unchanged_file() {
        let listing = vec![info("a.xlsx", 100, 1000)];
        let result = classify(&listing, &known(&[("a.xlsx", 100, 1000)]));
        assert!(result.new_or_changed.is_empty());
        assert_eq!(result.unchanged.len(), 1);
    }

    #[test]
    fn test_size_change_reclassifies() {
        let listing = vec![info("a.xlsx", 150, 1000)];
        let result = classify(&listing, &known(&[("a.xlsx", 100, 1000)]));
        assert_eq!(result.new_or_changed.len(), 1);
    }

    #[test]
    fn test_mtime_change_reclassifies() {
        let listing = vec![info("a.xlsx", 100, 2000)];
        let result = classify(&listing, &known(&[("a.xlsx", 100, 1000)]));
        assert_eq!(result.new_or_changed.len(), 1);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let listing = vec![
            info("a.xlsx", 100, 1000),
            info("b.xlsx", 200, 2000),
            info("c.csv", 300, 3000),
        ];
        let records = known(&[("a.xlsx", 100, 1000), ("b.xlsx", 999, 2000)]);

        let first = classify(&listing, &records);
        let second = classify(&listing, &records);
        assert_eq!(first.new_or_changed, second.new_or_changed);
        assert_eq!(first.unchanged, second.unchanged);

        let names: Vec<&str> = first.new_or_changed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.xlsx", "c.csv"]);
    }
}
