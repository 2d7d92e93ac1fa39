//! Fuzz target for run configuration parsing and validation.

#![no_main]

use gb_config::{validate_run_config, RunConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = RunConfig::from_json(json) {
        let _ = validate_run_config(&config);
    }
});
