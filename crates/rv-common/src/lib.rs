//! rdbviz common types and errors.
//!
//! This crate provides foundational types shared across the rdbviz crates:
//! - Decoded record types consumed by the aggregation engine
//! - The report schema produced for downstream consumers
//! - Common error types
//! - Output formats for CLI payloads

pub mod error;
pub mod output;
pub mod record;
pub mod report;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use output::OutputFormat;
pub use record::{AuxEntry, KeyType, RecordEvent, SourceEntry};
pub use report::{
    format_timestamp, BigKeyRecord, Bucket, PrefixStat, PrefixTypeGroup, Report, ReportMeta,
    Summary, TypeStat,
};

/// Version of the report document layout.
///
/// Bumped whenever a field is renamed or removed; additive optional fields
/// do not require a bump.
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";
