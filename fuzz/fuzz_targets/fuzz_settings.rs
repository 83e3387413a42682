//! Fuzz target for rdbviz.json settings parsing.
//!
//! Tests that settings parsing and validation handle arbitrary input
//! without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rv_config::{lint_settings, validate_settings, AnalyzeSettings};

fuzz_target!(|data: &[u8]| {
    if let Ok(settings) = serde_json::from_slice::<AnalyzeSettings>(data) {
        let _ = validate_settings(&settings);
        let _ = lint_settings(&settings);
    }
});
