//! Fuzz target for the JSON-lines record source.
//!
//! Arbitrary bytes are streamed through a full analysis. Decoding may fail,
//! but nothing may panic, and a successful run must keep its counts aligned.

#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use rv_config::AnalyzeSettings;
use rv_core::logging::LogContext;
use rv_core::source::JsonlSource;
use rv_core::{analyze, AnalyzeOptions};

fuzz_target!(|data: &[u8]| {
    let Some(now) = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single() else {
        return;
    };
    let options = AnalyzeOptions::new("fuzz", AnalyzeSettings::default(), now);
    let source = JsonlSource::from_reader(std::io::Cursor::new(data));
    let ctx = LogContext::new("run-fuzz");

    if let Ok(outcome) = analyze(source, &options, &ctx) {
        let summary = &outcome.report.summary;
        let by_type: u64 = summary.type_counts.values().sum();
        assert_eq!(by_type, summary.total_keys);
        assert_eq!(summary.with_ttl + summary.no_ttl, summary.total_keys);
    }
});
