//! Throttled progress reporting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::events::{event_names, Phase, ProgressEmitter, ProgressEvent};

/// Emits at most one progress event per `min_interval`.
///
/// The only mutable state is the time of the last emission, which starts at
/// construction so the first line appears one interval into the scan.
pub struct ProgressReporter {
    emitter: Arc<dyn ProgressEmitter>,
    total_bytes: Option<u64>,
    min_interval: Duration,
    started: Instant,
    last_emit: Instant,
}

impl ProgressReporter {
    /// A zero `min_interval` disables reporting entirely.
    pub fn new(
        emitter: Arc<dyn ProgressEmitter>,
        total_bytes: Option<u64>,
        min_interval: Duration,
    ) -> Self {
        let now = Instant::now();
        Self {
            emitter,
            total_bytes,
            min_interval,
            started: now,
            last_emit: now,
        }
    }

    pub fn enabled(&self) -> bool {
        !self.min_interval.is_zero()
    }

    /// Percent of input consumed, when the total is known and non-zero.
    pub fn percent(&self, bytes_consumed: u64) -> Option<f64> {
        match self.total_bytes {
            Some(total) if total > 0 => Some(bytes_consumed as f64 / total as f64 * 100.0),
            _ => None,
        }
    }

    /// Emit if at least one interval has passed since the last emission.
    pub fn maybe_report(&mut self, keys_processed: u64, bytes_consumed: u64) -> bool {
        self.maybe_report_at(Instant::now(), keys_processed, bytes_consumed)
    }

    /// [`maybe_report`](Self::maybe_report) with an explicit clock reading.
    pub fn maybe_report_at(
        &mut self,
        now: Instant,
        keys_processed: u64,
        bytes_consumed: u64,
    ) -> bool {
        if !self.enabled() {
            return false;
        }
        if now.saturating_duration_since(self.last_emit) < self.min_interval {
            return false;
        }
        self.emitter.emit(self.event(
            event_names::SCAN_PROGRESS,
            now,
            keys_processed,
            bytes_consumed,
        ));
        self.last_emit = now;
        true
    }

    /// Announce the start of the scan.
    pub fn start(&self) {
        if !self.enabled() {
            return;
        }
        self.emitter
            .emit(self.event(event_names::SCAN_STARTED, self.started, 0, 0));
    }

    /// Final event at end of stream, ignoring the throttle.
    pub fn complete(&self, keys_processed: u64, bytes_consumed: u64) {
        if !self.enabled() {
            return;
        }
        self.emitter.emit(self.event(
            event_names::SCAN_COMPLETE,
            Instant::now(),
            keys_processed,
            bytes_consumed,
        ));
    }

    fn event(&self, name: &str, now: Instant, keys: u64, bytes: u64) -> ProgressEvent {
        let elapsed = now.saturating_duration_since(self.started);
        ProgressEvent::new(name, Phase::Scan)
            .with_position(keys, bytes, self.total_bytes)
            .with_percent(self.percent(bytes))
            .with_elapsed_ms(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEmitter;

    fn reporter(
        total: Option<u64>,
        interval: Duration,
    ) -> (ProgressReporter, Arc<CollectingEmitter>) {
        let collector = Arc::new(CollectingEmitter::new());
        let reporter = ProgressReporter::new(collector.clone(), total, interval);
        (reporter, collector)
    }

    #[test]
    fn test_throttles_to_interval() {
        let (mut reporter, collector) = reporter(Some(1_000), Duration::from_secs(5));
        let t0 = reporter.last_emit;

        assert!(!reporter.maybe_report_at(t0 + Duration::from_secs(1), 10, 100));
        assert!(reporter.maybe_report_at(t0 + Duration::from_secs(5), 20, 200));
        assert!(!reporter.maybe_report_at(t0 + Duration::from_secs(9), 30, 300));
        assert!(reporter.maybe_report_at(t0 + Duration::from_secs(10), 40, 400));

        let events = collector.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].keys, 20);
        assert_eq!(events[0].percent, Some(20.0));
        assert_eq!(events[1].bytes_read, 400);
    }

    #[test]
    fn test_zero_interval_never_emits() {
        let (mut reporter, collector) = reporter(Some(1_000), Duration::ZERO);
        let t0 = reporter.last_emit;
        assert!(!reporter.maybe_report_at(t0 + Duration::from_secs(60), 1, 1));
        reporter.complete(1, 1);
        assert!(collector.events().is_empty());
    }

    #[test]
    fn test_percent_omitted_without_total() {
        let (unknown, _) = reporter(None, Duration::from_secs(1));
        assert_eq!(unknown.percent(500), None);

        let (empty, _) = reporter(Some(0), Duration::from_secs(1));
        assert_eq!(empty.percent(500), None);
    }

    #[test]
    fn test_start_event_carries_total() {
        let (reporter, collector) = reporter(Some(2_048), Duration::from_secs(1));
        reporter.start();

        let events = collector.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, event_names::SCAN_STARTED);
        assert_eq!(events[0].bytes_total, Some(2_048));
        assert_eq!(events[0].elapsed_ms, Some(0));
    }

    #[test]
    fn test_complete_ignores_throttle() {
        let (mut reporter, collector) = reporter(Some(10), Duration::from_secs(3_600));
        assert!(!reporter.maybe_report(1, 1));
        reporter.complete(5, 10);

        let events = collector.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, event_names::SCAN_COMPLETE);
        assert_eq!(events[0].percent, Some(100.0));
    }
}
