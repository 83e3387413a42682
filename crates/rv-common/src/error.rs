//! Error types for rdbviz.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Input Decode Error
//!   Reason: malformed record on line 42: missing field `size`
//!   Fix: Regenerate the record stream with the decoder, or pass --limit to stop before the damaged region.
//! ```
//!
//! # Agent-Facing Output
//!
//! ```json
//! {
//!   "code": 21,
//!   "category": "input",
//!   "message": "malformed record on line 42: missing field `size`",
//!   "recoverable": false,
//!   "context": { "line": 42 }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rdbviz operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Settings file and argument errors.
    Config,
    /// Record stream errors (missing file, corrupt or truncated input).
    Input,
    /// Report persistence and report parsing errors.
    Output,
    /// Generic file I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Output => write!(f, "output"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for rdbviz.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid value for {field}: {message}")]
    InvalidSetting { field: String, message: String },

    // Input errors (20-29)
    #[error("cannot open input {path}: {source}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record on line {line}: {message}")]
    Decode { line: u64, message: String },

    // Output errors (30-39)
    #[error("cannot write report to {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid report document: {0}")]
    InvalidReport(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 30-39: Output errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidSetting { .. } => 11,
            Error::InputOpen { .. } => 20,
            Error::Decode { .. } => 21,
            Error::OutputWrite { .. } => 30,
            Error::InvalidReport(_) => 31,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_) | Error::InvalidSetting { .. } => ErrorCategory::Config,
            Error::InputOpen { .. } | Error::Decode { .. } => ErrorCategory::Input,
            Error::OutputWrite { .. } | Error::InvalidReport(_) => ErrorCategory::Output,
            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether retrying the same command could succeed.
    ///
    /// A corrupt input stays corrupt; a full disk or a missing directory can
    /// be fixed and the run repeated.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) | Error::InvalidSetting { .. } => true,
            Error::InputOpen { .. } => true,
            Error::Decode { .. } => false,
            Error::OutputWrite { .. } => true,
            Error::InvalidReport(_) => false,
            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'rdbviz config validate' to check the settings file, or remove it to use defaults."
            }
            Error::InvalidSetting { .. } => {
                "Adjust the flag or settings field to a value within the documented range."
            }
            Error::InputOpen { .. } => "Check that the input path exists and is readable.",
            Error::Decode { .. } => {
                "Regenerate the record stream with the decoder, or pass --limit to stop before the damaged region."
            }
            Error::OutputWrite { .. } => {
                "Check disk space and that the output directory is writable. No partial report was left behind."
            }
            Error::InvalidReport(_) => {
                "The file is not an rdbviz report. Re-run 'rdbviz analyze' to produce one."
            }
            Error::Io(_) => "Check disk space and permissions, then retry the operation.",
            Error::Json(_) => "Internal serialization failure. Please report it with the input that triggered it.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidSetting { .. } => "Invalid Setting",
            Error::InputOpen { .. } => "Input Not Readable",
            Error::Decode { .. } => "Input Decode Error",
            Error::OutputWrite { .. } => "Report Write Failed",
            Error::InvalidReport(_) => "Invalid Report",
            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., line number, file path).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::InvalidSetting { field, .. } => {
                context.insert("field".to_string(), serde_json::json!(field));
            }
            Error::InputOpen { path, .. } | Error::OutputWrite { path, .. } => {
                context.insert("path".to_string(), serde_json::json!(path));
            }
            Error::Decode { line, .. } => {
                context.insert("line".to_string(), serde_json::json!(line));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl StructuredError {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
