//! Run driver: pulls a record source through the accumulator and assembles
//! the report.
//!
//! The driver owns the only loop. Key entries go to the accumulator, aux
//! entries go to the report metadata, and database size hints are counted
//! but never aggregated. Cancelling is stopping the loop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rv_common::{Report, ReportMeta, Result, SourceEntry};
use rv_config::AnalyzeSettings;

use crate::aggregate::{assemble, Accumulator, ProgressReporter};
use crate::events::ProgressEmitter;
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::source::RecordSource;

/// Inputs for one analysis run.
#[derive(Clone)]
pub struct AnalyzeOptions {
    /// Recorded as `meta.source`.
    pub source_label: String,
    pub settings: AnalyzeSettings,
    /// Reference time for TTL classification and `generated_at`.
    pub now: DateTime<Utc>,
    /// Stop after this many keys have been ingested.
    pub limit: Option<u64>,
    pub progress: Option<Arc<dyn ProgressEmitter>>,
}

impl AnalyzeOptions {
    pub fn new(source_label: impl Into<String>, settings: AnalyzeSettings, now: DateTime<Utc>) -> Self {
        Self {
            source_label: source_label.into(),
            settings,
            now,
            limit: None,
            progress: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_progress(mut self, emitter: Option<Arc<dyn ProgressEmitter>>) -> Self {
        self.progress = emitter;
        self
    }
}

impl std::fmt::Debug for AnalyzeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyzeOptions")
            .field("source_label", &self.source_label)
            .field("settings", &self.settings)
            .field("now", &self.now)
            .field("limit", &self.limit)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Counters about the scan itself, outside the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub keys: u64,
    /// Key records dropped for having an empty key.
    pub skipped: u64,
    pub aux_fields: u64,
    pub db_size_hints: u64,
    pub bytes_consumed: u64,
    /// The scan stopped at `limit` before the end of the input.
    pub partial: bool,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub report: Report,
    pub stats: ScanStats,
}

/// Stream every entry of `source` and build the report.
///
/// A decode error aborts the run; nothing is assembled from a failed scan.
pub fn analyze<S: RecordSource>(
    mut source: S,
    options: &AnalyzeOptions,
    ctx: &LogContext,
) -> Result<AnalyzeOutcome> {
    let settings = &options.settings;
    let mut meta = ReportMeta::new(options.source_label.clone(), options.now);
    let mut stats = ScanStats::default();

    let mut accumulator = Accumulator::new(settings, options.now);
    if let Some(emitter) = &options.progress {
        let reporter = ProgressReporter::new(
            Arc::clone(emitter),
            source.total_bytes(),
            settings.progress_interval(),
        );
        reporter.start();
        accumulator = accumulator.with_progress(reporter);
    }

    log_event!(
        ctx,
        INFO,
        event_names::SCAN_STARTED,
        Stage::Scan,
        "scan started",
        source = options.source_label.as_str(),
        total_bytes = source.total_bytes().unwrap_or(0),
        top_n = settings.top_n as u64,
        prefix_depth = settings.prefix.max_depth as u64
    );

    while let Some(entry) = source.next() {
        match entry? {
            SourceEntry::Key(record) => {
                // Empty keys never count toward the limit.
                if let Some(limit) = options.limit.filter(|_| !record.key.is_empty()) {
                    if accumulator.total_keys() >= limit {
                        stats.partial = true;
                        log_event!(
                            ctx,
                            WARN,
                            event_names::SCAN_LIMIT_REACHED,
                            Stage::Scan,
                            "key limit reached; report will be partial",
                            limit = limit
                        );
                        break;
                    }
                }
                accumulator.ingest(&record);
            }
            SourceEntry::Aux(aux) => {
                log_event!(
                    ctx,
                    DEBUG,
                    event_names::SCAN_AUX,
                    Stage::Scan,
                    "aux field",
                    key = aux.key.as_str(),
                    value = aux.value.as_str()
                );
                meta.record_aux(&aux.key, &aux.value);
                stats.aux_fields += 1;
            }
            SourceEntry::DbSize { .. } => stats.db_size_hints += 1,
        }
        accumulator.observe_progress(source.bytes_consumed());
    }

    stats.bytes_consumed = source.bytes_consumed();
    let state = accumulator.finish(stats.bytes_consumed);
    stats.keys = state.total_keys;
    stats.skipped = state.skipped;

    log_event!(
        ctx,
        INFO,
        event_names::SCAN_FINISHED,
        Stage::Scan,
        "scan finished",
        keys = stats.keys,
        skipped = stats.skipped,
        bytes = stats.bytes_consumed,
        partial = stats.partial
    );

    meta.partial = stats.partial;
    let report = assemble(&state, meta, settings.top_n);

    log_event!(
        ctx,
        DEBUG,
        event_names::REPORT_ASSEMBLED,
        Stage::Assemble,
        "report assembled",
        types = report.types.len() as u64,
        prefixes = report.prefixes.len() as u64,
        bigkeys = report.bigkeys.len() as u64
    );

    Ok(AnalyzeOutcome { report, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{event_names as progress_events, CollectingEmitter};
    use crate::source::{JsonlSource, MemorySource};
    use chrono::TimeZone;
    use rv_common::{AuxEntry, Error, KeyType, RecordEvent};
    use std::io::Cursor;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
    }

    fn ctx() -> LogContext {
        LogContext::new("run-test")
    }

    fn options() -> AnalyzeOptions {
        AnalyzeOptions::new("/data/dump.rdb", AnalyzeSettings::default(), now())
    }

    fn key(name: &str, size: u64) -> SourceEntry {
        SourceEntry::Key(RecordEvent::new(0, name, KeyType::String, size))
    }

    #[test]
    fn test_mixed_entries() {
        let source = MemorySource::new(vec![
            SourceEntry::Aux(AuxEntry {
                key: "redis-ver".into(),
                value: "7.2.4".into(),
            }),
            SourceEntry::DbSize {
                db: 0,
                keys: 2,
                expires: 0,
            },
            key("user:1", 10),
            key("user:2", 30),
        ]);

        let outcome = analyze(source, &options(), &ctx()).unwrap();

        assert_eq!(outcome.report.summary.total_keys, 2);
        assert_eq!(outcome.report.summary.total_size, 40);
        assert_eq!(outcome.report.meta.redis_version.as_deref(), Some("7.2.4"));
        assert_eq!(outcome.report.meta.source, "/data/dump.rdb");
        assert_eq!(outcome.report.meta.generated_at, "2026-03-01T00:00:00Z");
        assert!(!outcome.report.meta.partial);
        assert_eq!(outcome.stats.aux_fields, 1);
        assert_eq!(outcome.stats.db_size_hints, 1);
        assert_eq!(outcome.stats.bytes_consumed, 4);
    }

    #[test]
    fn test_empty_source() {
        let outcome = analyze(MemorySource::default(), &options(), &ctx()).unwrap();
        let report = outcome.report;
        assert_eq!(report.summary.total_keys, 0);
        assert!(report.types.is_empty());
        assert!(report.prefixes.is_empty());
        assert!(report.bigkeys.is_empty());
        assert!(report.ttl_buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_limit_marks_partial() {
        let source = MemorySource::new(vec![key("a", 1), key("b", 2), key("c", 3)]);
        let outcome = analyze(source, &options().with_limit(Some(2)), &ctx()).unwrap();

        assert!(outcome.stats.partial);
        assert!(outcome.report.meta.partial);
        assert_eq!(outcome.report.summary.total_keys, 2);
    }

    #[test]
    fn test_limit_equal_to_input_is_not_partial() {
        let source = MemorySource::new(vec![key("a", 1), key("b", 2)]);
        let outcome = analyze(source, &options().with_limit(Some(2)), &ctx()).unwrap();

        assert!(!outcome.stats.partial);
        assert_eq!(outcome.report.summary.total_keys, 2);
    }

    #[test]
    fn test_trailing_empty_key_does_not_hit_limit() {
        let source = MemorySource::new(vec![key("a", 1), key("b", 2), key("", 3)]);
        let outcome = analyze(source, &options().with_limit(Some(2)), &ctx()).unwrap();

        assert!(!outcome.stats.partial);
        assert!(!outcome.report.meta.partial);
        assert_eq!(outcome.stats.keys, 2);
        assert_eq!(outcome.stats.skipped, 1);
    }

    #[test]
    fn test_empty_keys_counted_as_skipped() {
        let source = MemorySource::new(vec![key("", 5), key("a", 1)]);
        let outcome = analyze(source, &options(), &ctx()).unwrap();
        assert_eq!(outcome.stats.keys, 1);
        assert_eq!(outcome.stats.skipped, 1);
    }

    #[test]
    fn test_decode_error_aborts() {
        let text = concat!(
            r#"{"kind":"key","db":0,"key":"a","type":"string","size":3}"#,
            "\n",
            "not json\n",
        );
        let source = JsonlSource::from_reader(Cursor::new(text.as_bytes().to_vec()));
        let err = analyze(source, &options(), &ctx()).unwrap_err();
        assert!(matches!(err, Error::Decode { line: 2, .. }));
    }

    #[test]
    fn test_progress_start_and_complete() {
        let collector = Arc::new(CollectingEmitter::new());
        let emitter: Arc<dyn ProgressEmitter> = collector.clone();
        let source = MemorySource::new(vec![key("a", 1)]);

        analyze(source, &options().with_progress(Some(emitter)), &ctx()).unwrap();

        let events = collector.events();
        assert_eq!(events.first().map(|e| e.event.as_str()), Some(progress_events::SCAN_STARTED));
        let last = events.last().unwrap();
        assert_eq!(last.event, progress_events::SCAN_COMPLETE);
        assert_eq!(last.keys, 1);
    }
}
