#![no_main]

use fuzzstat::series::{align, parse_run};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Parsing and aligning arbitrary logs must never panic
        if let Ok(run) = parse_run("fuzz.txt", input, 600) {
            if let Ok(aligned) = align(&run, 600) {
                assert_eq!(aligned.len(), 600);
            }
        }
    }
});
