//! Hierarchical key-namespace statistics.
//!
//! A key `user:1001:profile` with separator `:` and depth 3 contributes to
//! `user:`, `user:1001:` and `user:1001:profile`. Namespace prefixes keep
//! their trailing separator; a prefix that is the whole key does not.

use std::collections::BTreeMap;

use super::Totals;

/// Prefix string to running totals.
pub type PrefixAggregate = BTreeMap<String, Totals>;

/// Record one key into `map` at every level from 1 to
/// `min(max_depth, segment_count)`.
///
/// Empty segments are kept, so `a::b` yields `a:`, `a::`, `a::b`, and a key
/// ending in the separator counts its last level twice. An empty separator
/// or a zero depth records nothing.
pub fn record(map: &mut PrefixAggregate, key: &str, size: u64, separator: &str, max_depth: usize) {
    if separator.is_empty() || max_depth == 0 {
        return;
    }

    let mut recorded = 0;
    for (idx, _) in key.match_indices(separator) {
        if recorded == max_depth {
            return;
        }
        bump(map, &key[..idx + separator.len()], size);
        recorded += 1;
    }
    // Every separator consumed: the last level is the whole key.
    if recorded < max_depth {
        bump(map, key, size);
    }
}

fn bump(map: &mut PrefixAggregate, prefix: &str, size: u64) {
    match map.get_mut(prefix) {
        Some(totals) => totals.add(size),
        None => {
            map.insert(prefix.to_owned(), Totals::single(size));
        }
    }
}

/// Global and per-type prefix aggregates sharing one configuration.
#[derive(Debug, Clone, Default)]
pub struct PrefixAggregator {
    separator: String,
    max_depth: usize,
    global: PrefixAggregate,
    by_type: BTreeMap<String, PrefixAggregate>,
}

impl PrefixAggregator {
    pub fn new(separator: impl Into<String>, max_depth: usize) -> Self {
        Self {
            separator: separator.into(),
            max_depth,
            global: PrefixAggregate::new(),
            by_type: BTreeMap::new(),
        }
    }

    /// Whether this aggregator records anything at all.
    pub fn enabled(&self) -> bool {
        !self.separator.is_empty() && self.max_depth > 0
    }

    /// Record a key into the global aggregate and its type's aggregate.
    pub fn observe(&mut self, key_type: &str, key: &str, size: u64) {
        if !self.enabled() {
            return;
        }
        record(&mut self.global, key, size, &self.separator, self.max_depth);

        if !self.by_type.contains_key(key_type) {
            self.by_type
                .insert(key_type.to_owned(), PrefixAggregate::new());
        }
        if let Some(per_type) = self.by_type.get_mut(key_type) {
            record(per_type, key, size, &self.separator, self.max_depth);
        }
    }

    pub fn global(&self) -> &PrefixAggregate {
        &self.global
    }

    pub fn by_type(&self) -> &BTreeMap<String, PrefixAggregate> {
        &self.by_type
    }
}
