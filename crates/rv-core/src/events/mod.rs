//! Progress event emission.
//!
//! Progress is a side channel: events describe how far a scan has got and
//! never influence the report. Human runs get a throttled stderr line via
//! tracing; agent runs get one JSON object per line.

use chrono::{DateTime, Utc};
use humansize::{format_size, BINARY};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Mutex;

/// Standard progress event names.
pub mod event_names {
    pub const SCAN_STARTED: &str = "scan_started";
    pub const SCAN_PROGRESS: &str = "scan_progress";
    pub const SCAN_COMPLETE: &str = "scan_complete";

    pub const REPORT_WRITTEN: &str = "report_written";
}

/// Pipeline phase for a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Scan,
    Write,
}

/// Structured progress event for CLI consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProgressEvent {
    pub event: String,
    pub timestamp: DateTime<Utc>,
    pub phase: Phase,
    pub keys: u64,
    pub bytes_read: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes_total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

impl ProgressEvent {
    pub fn new(event: impl Into<String>, phase: Phase) -> Self {
        Self {
            event: event.into(),
            timestamp: Utc::now(),
            phase,
            keys: 0,
            bytes_read: 0,
            bytes_total: None,
            percent: None,
            elapsed_ms: None,
        }
    }

    pub fn with_position(mut self, keys: u64, bytes_read: u64, bytes_total: Option<u64>) -> Self {
        self.keys = keys;
        self.bytes_read = bytes_read;
        self.bytes_total = bytes_total;
        self
    }

    pub fn with_percent(mut self, percent: Option<f64>) -> Self {
        self.percent = percent;
        self
    }

    pub fn with_elapsed_ms(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = Some(elapsed_ms);
        self
    }

    pub fn to_jsonl(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(
                r#"{{"error":"serialization_failed","event":"{}"}}"#,
                self.event
            )
        })
    }

    /// One-line human rendering: `[progress] keys=N read=X/Y (P%)`.
    pub fn human_line(&self) -> String {
        let read = format_size(self.bytes_read, BINARY);
        match (self.bytes_total, self.percent) {
            (Some(total), Some(percent)) => format!(
                "[progress] keys={} read={}/{} ({:.1}%)",
                self.keys,
                read,
                format_size(total, BINARY),
                percent
            ),
            (Some(total), None) => format!(
                "[progress] keys={} read={}/{}",
                self.keys,
                read,
                format_size(total, BINARY)
            ),
            (None, _) => format!("[progress] keys={} read={}", self.keys, read),
        }
    }
}

/// Trait for emitting progress events.
pub trait ProgressEmitter: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Emits progress as human lines through `tracing` (stderr).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEmitter;

impl ProgressEmitter for TracingEmitter {
    fn emit(&self, event: ProgressEvent) {
        tracing::info!(target: "rv_core::progress", "{}", event.human_line());
    }
}

/// JSONL writer for progress events (agent-friendly).
pub struct JsonlWriter<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> ProgressEmitter for JsonlWriter<W> {
    fn emit(&self, event: ProgressEvent) {
        let line = event.to_jsonl();
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct CollectingEmitter {
    events: Mutex<Vec<ProgressEvent>>,
}

impl CollectingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl ProgressEmitter for CollectingEmitter {
    fn emit(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_event_jsonl() {
        let event = ProgressEvent::new(event_names::SCAN_PROGRESS, Phase::Scan)
            .with_position(1_000, 512, Some(2_048))
            .with_percent(Some(25.0))
            .with_elapsed_ms(5);
        let json = event.to_jsonl();
        assert!(json.contains(r#""event":"scan_progress""#));
        assert!(json.contains(r#""phase":"scan""#));
        assert!(json.contains(r#""keys":1000"#));
        assert!(json.contains(r#""percent":25.0"#));
    }

    #[test]
    fn test_unknown_total_omits_fields() {
        let event =
            ProgressEvent::new(event_names::SCAN_PROGRESS, Phase::Scan).with_position(3, 10, None);
        let json = event.to_jsonl();
        assert!(!json.contains("bytes_total"));
        assert!(!json.contains("percent"));
        let line = event.human_line();
        assert!(line.starts_with("[progress] keys=3 read="));
        assert!(!line.contains('%'));
    }

    #[test]
    fn test_human_line_with_percent() {
        let event = ProgressEvent::new(event_names::SCAN_PROGRESS, Phase::Scan)
            .with_position(42, 1024, Some(4096))
            .with_percent(Some(25.0));
        let line = event.human_line();
        assert!(line.starts_with("[progress] keys=42 read="));
        assert!(line.contains("KiB/"));
        assert!(line.ends_with("(25.0%)"));
    }

    #[test]
    fn test_jsonl_writer_one_line_per_event() {
        let writer = JsonlWriter::new(Vec::new());
        writer.emit(ProgressEvent::new(event_names::SCAN_STARTED, Phase::Scan));
        writer.emit(ProgressEvent::new(event_names::SCAN_COMPLETE, Phase::Scan));

        let out = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: ProgressEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.event, event_names::SCAN_COMPLETE);
    }

    #[test]
    fn test_collecting_emitter() {
        let collector = CollectingEmitter::new();
        collector.emit(ProgressEvent::new(event_names::REPORT_WRITTEN, Phase::Write));
        assert_eq!(collector.events().len(), 1);
    }
}
