//! Record sources.
//!
//! A source is a pull iterator over decoded [`SourceEntry`] values. The
//! binary snapshot format is decoded upstream; sources here read the
//! decoder's line-oriented output or an in-memory list.

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlSource;
pub use memory::MemorySource;

use rv_common::{Result, SourceEntry};

/// A stream of decoded entries with byte-level position information.
///
/// Stop iterating to cancel. After the first `Err` a source yields `None`.
pub trait RecordSource: Iterator<Item = Result<SourceEntry>> {
    /// Raw input bytes consumed so far.
    fn bytes_consumed(&self) -> u64;

    /// Total input size, when known up front.
    fn total_bytes(&self) -> Option<u64>;
}
