//! Streaming aggregation engine.
//!
//! Records flow through the [`Accumulator`] one at a time; it updates the
//! running totals and feeds the bucket classifiers, the [`PrefixAggregator`]
//! and the big-key [`TopK`] tracker. Once the stream ends the frozen
//! [`AggregateState`] is turned into a [`Report`](rv_common::Report) by
//! [`assemble`].

pub mod accumulator;
pub mod assemble;
pub mod buckets;
pub mod prefix;
pub mod progress;
pub mod topk;

pub use accumulator::{Accumulator, AggregateState};
pub use assemble::assemble;
pub use buckets::{classify_size, classify_ttl};
pub use prefix::{PrefixAggregate, PrefixAggregator};
pub use progress::ProgressReporter;
pub use topk::{TopK, Weighted};

/// Running count and byte total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub count: u64,
    pub size: u64,
}

impl Totals {
    pub fn single(size: u64) -> Self {
        Self { count: 1, size }
    }

    pub fn add(&mut self, size: u64) {
        self.count += 1;
        self.size = self.size.saturating_add(size);
    }
}
