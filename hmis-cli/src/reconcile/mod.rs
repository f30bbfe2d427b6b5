//! Reconciliation core: file tracking, spreadsheet normalization, and
//! payload assembly
//!
//! Control flow per run: tracker classification picks the files worth
//! reading, each file's pipeline runs independently, and a tracker commit
//! happens only after a file's full pipeline has succeeded.

pub mod assemble;
pub mod excel;
pub mod pipeline;
pub mod tracker;
pub mod types;

pub use assemble::assemble;
pub use pipeline::{FileOutcome, FileReport, ProcessedFile, RunSummary, process_file};
pub use tracker::{Classification, classify};
pub use types::{
    CanonicalRecord, Cell, FileInfo, FileRecord, RawSheet, RawWorkbook, ValidationWarning,
};
