//! Reporting backend interface: wire models and the upload seam

pub mod client;
pub mod models;

pub use client::{HttpValueSetApi, ValueSetApi};
pub use models::{DataValue, ImportSummary, MatchStatsSummary, ValueSetPayload};
