//! Fuzz target for progress interval parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rv_config::{format_duration, parse_duration};

fuzz_target!(|data: &str| {
    if let Some(d) = parse_duration(data) {
        // Formatting picks an exact unit, so it must parse back to the same value.
        assert_eq!(parse_duration(&format_duration(d)), Some(d));
    }
});
