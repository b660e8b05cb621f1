#![no_main]

use irspec_core::{ingest, IngestOptions, Target};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes as generator output. Goal: no panics on any input.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = ingest(text, &Target::function("F"), &IngestOptions::default());
    }
});
