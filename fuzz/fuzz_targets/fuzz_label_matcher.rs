//! Fuzz target: `LabelMatcher::find_match`
//!
//! Feeds arbitrary OCR output (any UTF-8, any whitespace) through the
//! matcher and asserts that it never panics, that a match is always one
//! of the configured labels, and that `ratio` stays within 0..=1.
//!
//! cargo fuzz run fuzz_label_matcher

#![no_main]

use libfuzzer_sys::fuzz_target;
use pilldispenser::classify::similarity::ratio;
use pilldispenser::classify::text::LabelMatcher;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let labels: Vec<String> = ["rosulip", "ultrafen", "clovix", "naproxan"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let matcher = LabelMatcher::new(&labels, 60.0);

    if let Some(found) = matcher.find_match(text) {
        assert!(labels.iter().any(|l| l == found), "match outside label set");
    }

    for word in text.split_whitespace().take(16) {
        let r = ratio(&word.to_lowercase(), "rosulip");
        assert!((0.0..=1.0).contains(&r), "ratio {r} out of range");
    }
});
