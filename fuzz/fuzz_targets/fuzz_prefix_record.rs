//! Fuzz target for key prefix extraction.
//!
//! Any key, separator and depth must record one level per segment up to
//! `depth`, each a leading slice of the key.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rv_core::aggregate::prefix::{record, PrefixAggregate};

#[derive(Debug, Arbitrary)]
struct Input {
    key: String,
    separator: String,
    depth: u8,
    size: u64,
}

fuzz_target!(|input: Input| {
    let depth = usize::from(input.depth % 16);
    let mut map = PrefixAggregate::new();
    record(&mut map, &input.key, input.size, &input.separator, depth);

    let levels = if input.separator.is_empty() {
        0
    } else {
        depth.min(input.key.split(input.separator.as_str()).count())
    };
    // A key ending in the separator records its last level twice.
    let recorded: u64 = map.values().map(|t| t.count).sum();
    assert_eq!(recorded, levels as u64);
    for prefix in map.keys() {
        assert!(input.key.starts_with(prefix.as_str()));
    }
});
