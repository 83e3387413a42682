//! In-memory record source for library callers and tests.

use rv_common::{RecordEvent, Result, SourceEntry};

use super::RecordSource;

/// Yields a prepared list of entries. Never fails.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: std::vec::IntoIter<SourceEntry>,
    yielded: u64,
}

impl MemorySource {
    pub fn new(entries: Vec<SourceEntry>) -> Self {
        Self {
            entries: entries.into_iter(),
            yielded: 0,
        }
    }

    /// A source of key records only.
    pub fn from_records(records: impl IntoIterator<Item = RecordEvent>) -> Self {
        Self::new(records.into_iter().map(SourceEntry::Key).collect())
    }
}

impl Iterator for MemorySource {
    type Item = Result<SourceEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.entries.next()?;
        self.yielded += 1;
        Some(Ok(entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl RecordSource for MemorySource {
    /// Entries stand in for bytes; there is no encoded form.
    fn bytes_consumed(&self) -> u64 {
        self.yielded
    }

    fn total_bytes(&self) -> Option<u64> {
        None
    }
}
