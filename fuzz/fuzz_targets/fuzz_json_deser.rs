#![no_main]

use cantus_spec::{ParameterOverrides, PipelineBudget, StyleRegistry};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = StyleRegistry::from_json(text);
        let _ = PipelineBudget::from_json(text).map(|b| b.validate());
        let _ = serde_json::from_str::<ParameterOverrides>(text);
    }
});
