//! rdbviz core library
//!
//! This library provides the streaming side of rdbviz:
//! - Record sources over decoded snapshot output
//! - The single-pass aggregation engine and report assembler
//! - Progress events and structured logging
//! - Report persistence, rendering, and JSON schemas
//! - Exit codes for CLI operations
//!
//! The binary entry point is in `main.rs`.

pub mod aggregate;
pub mod analyze;
pub mod events;
pub mod exit_codes;
pub mod logging;
pub mod render;
pub mod schema;
pub mod source;
pub mod writer;

pub use analyze::{analyze, AnalyzeOptions, AnalyzeOutcome, ScanStats};
pub use exit_codes::ExitCode;
pub use writer::write_report;
