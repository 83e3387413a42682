//! Stable event names and pipeline stages for structured logs.
//!
//! Every log line emitted through [`log_event!`](crate::log_event) carries
//! the run ID and stage so a JSONL log can be filtered per run and phase.

use serde::{Deserialize, Serialize};

/// Processing stages in the analysis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and settings resolution.
    Init,
    /// Streaming the record source through the accumulator.
    Scan,
    /// Building the report from frozen state.
    Assemble,
    /// Persisting the report.
    Write,
    /// Rendering an existing report.
    Summarize,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Scan => "scan",
            Stage::Assemble => "assemble",
            Stage::Write => "write",
            Stage::Summarize => "summarize",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Settings
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";
    pub const CONFIG_WARNING: &str = "config.warning";

    // Scan stage
    pub const SCAN_STARTED: &str = "scan.started";
    pub const SCAN_AUX: &str = "scan.aux";
    pub const SCAN_LIMIT_REACHED: &str = "scan.limit_reached";
    pub const SCAN_FINISHED: &str = "scan.finished";

    // Report stages
    pub const REPORT_ASSEMBLED: &str = "report.assembled";
    pub const REPORT_WRITTEN: &str = "report.written";

    // Error events
    pub const RUN_FAILED: &str = "run.failed";
}

/// Correlation context shared by every event of one invocation.
#[derive(Debug, Clone)]
pub struct LogContext {
    /// Unique ID for this invocation.
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }
}
