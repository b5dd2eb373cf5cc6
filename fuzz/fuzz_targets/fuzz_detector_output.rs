//! Fuzz target: `parse_detections` + `DetectionPolicy::evaluate`
//!
//! Treats arbitrary bytes as detector stdout.  Parsing must either yield
//! boxes or `Malformed`, and evaluating any parsed boxes must never panic.
//!
//! cargo fuzz run fuzz_detector_output

#![no_main]

use libfuzzer_sys::fuzz_target;
use pilldispenser::adapters::detector::parse_detections;
use pilldispenser::classify::Classification;
use pilldispenser::classify::detection::DetectionPolicy;
use pilldispenser::error::ClassifyError;

fuzz_target!(|data: &[u8]| {
    let stdout = String::from_utf8_lossy(data);
    match parse_detections(&stdout) {
        Ok(boxes) => {
            let policy = DetectionPolicy::default();
            if let Classification::Ok(confidence) = policy.evaluate(&boxes) {
                assert!(confidence >= policy.ok_floor);
            }
        }
        Err(e) => assert_eq!(e, ClassifyError::Malformed),
    }
});
