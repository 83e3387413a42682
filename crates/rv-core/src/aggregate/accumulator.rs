//! Per-record accumulation into bounded running state.

use chrono::{DateTime, Utc};
use rv_common::{BigKeyRecord, RecordEvent};
use rv_config::AnalyzeSettings;
use std::collections::BTreeMap;

use super::buckets::{classify_size, classify_ttl, size_labels, ttl_labels, NO_EXPIRE, EXPIRED};
use super::prefix::PrefixAggregator;
use super::progress::ProgressReporter;
use super::topk::{TopK, Weighted};
use super::Totals;

impl Weighted for BigKeyRecord {
    fn weight(&self) -> u64 {
        self.size
    }
}

/// Everything the report is built from.
///
/// Mutated once per valid record and never after the stream ends.
#[derive(Debug, Clone)]
pub struct AggregateState {
    /// Reference time for expiration classification.
    pub now: DateTime<Utc>,
    pub total_keys: u64,
    pub total_size: u64,
    pub db_keys: BTreeMap<u32, u64>,
    pub types: BTreeMap<String, Totals>,
    /// Seeded with every TTL label at zero.
    pub ttl_counts: BTreeMap<&'static str, u64>,
    /// Seeded with every size label at zero.
    pub size_counts: BTreeMap<&'static str, u64>,
    pub with_ttl: u64,
    pub no_ttl: u64,
    pub expired: u64,
    pub prefixes: PrefixAggregator,
    pub bigkeys: TopK<BigKeyRecord>,
    /// Records dropped for having an empty key. Diagnostic only.
    pub skipped: u64,
}

impl AggregateState {
    pub fn new(settings: &AnalyzeSettings, now: DateTime<Utc>) -> Self {
        Self {
            now,
            total_keys: 0,
            total_size: 0,
            db_keys: BTreeMap::new(),
            types: BTreeMap::new(),
            ttl_counts: ttl_labels().map(|label| (label, 0)).collect(),
            size_counts: size_labels().map(|label| (label, 0)).collect(),
            with_ttl: 0,
            no_ttl: 0,
            expired: 0,
            prefixes: PrefixAggregator::new(
                settings.prefix.separator.clone(),
                settings.prefix.max_depth,
            ),
            bigkeys: TopK::new(settings.top_n),
            skipped: 0,
        }
    }
}

/// Single-pass accumulator. One per run, driven by the record loop.
pub struct Accumulator {
    state: AggregateState,
    progress: Option<ProgressReporter>,
}

impl Accumulator {
    pub fn new(settings: &AnalyzeSettings, now: DateTime<Utc>) -> Self {
        Self {
            state: AggregateState::new(settings, now),
            progress: None,
        }
    }

    /// Attach a throttled progress reporter.
    pub fn with_progress(mut self, reporter: ProgressReporter) -> Self {
        self.progress = Some(reporter);
        self
    }

    /// Fold one record into the state. Records with an empty key are dropped.
    pub fn ingest(&mut self, event: &RecordEvent) {
        if event.key.is_empty() {
            self.state.skipped += 1;
            tracing::debug!(db = event.db, "dropping record with empty key");
            return;
        }

        let state = &mut self.state;
        let key_type = event.key_type.as_str();

        state.total_keys += 1;
        state.total_size = state.total_size.saturating_add(event.size);
        *state.db_keys.entry(event.db).or_insert(0) += 1;

        match state.types.get_mut(key_type) {
            Some(totals) => totals.add(event.size),
            None => {
                state
                    .types
                    .insert(key_type.to_owned(), Totals::single(event.size));
            }
        }

        let ttl_label = classify_ttl(event.expiration, state.now);
        *state.ttl_counts.entry(ttl_label).or_insert(0) += 1;
        match ttl_label {
            NO_EXPIRE => state.no_ttl += 1,
            EXPIRED => {
                state.with_ttl += 1;
                state.expired += 1;
            }
            _ => state.with_ttl += 1,
        }

        *state.size_counts.entry(classify_size(event.size)).or_insert(0) += 1;

        state.prefixes.observe(key_type, &event.key, event.size);

        if state.bigkeys.admits(event.size) {
            state.bigkeys.offer(BigKeyRecord::from(event));
        }
    }

    /// Forward the current position to the progress reporter, if any.
    pub fn observe_progress(&mut self, bytes_consumed: u64) {
        if let Some(reporter) = self.progress.as_mut() {
            reporter.maybe_report(self.state.total_keys, bytes_consumed);
        }
    }

    pub fn total_keys(&self) -> u64 {
        self.state.total_keys
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    /// End the stream: emit the final progress event and hand over the state.
    pub fn finish(self, bytes_consumed: u64) -> AggregateState {
        if let Some(reporter) = &self.progress {
            reporter.complete(self.state.total_keys, bytes_consumed);
        }
        self.state
    }
}
