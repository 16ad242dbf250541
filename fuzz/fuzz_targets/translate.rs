// fuzz_targets/translate.rs
#![no_main]

use gocolon::{translate, TranslateError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match translate("fuzz.colon", data) {
        Ok(out) => {
            // Translated output never carries markers and always parses.
            let text = std::str::from_utf8(&out.translated).expect("output is UTF-8");
            assert!(gocolon_parser::parse_file(text).is_ok(), "unparsable output:\n{text}");
            if !out.formatted.iter().any(|&b| b == b':') {
                assert_eq!(out.formatted, out.translated);
            }
        }
        Err(TranslateError::Encoding { .. }) => assert!(std::str::from_utf8(data).is_err()),
        Err(e) => assert!(!e.diagnostics().is_empty()),
    }
});
