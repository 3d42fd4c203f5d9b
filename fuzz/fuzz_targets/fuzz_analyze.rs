#![no_main]

use cantus_compose::analyze;
use cantus_spec::ErrorKind;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        match analyze(text) {
            Ok(intent) => assert_eq!(intent.text, text),
            Err(err) => assert_eq!(err.kind(), ErrorKind::InvalidInput),
        }
    }
});
