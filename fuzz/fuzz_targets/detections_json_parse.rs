//! Fuzz target for detections JSON parsing.
//!
//! Parsed detections are also resolved against a fixed image size, so
//! unit inference and box conversion see arbitrary coordinates too.

#![no_main]

use composure::geometry::io_json::from_detections_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(detections) = from_detections_slice(data) {
        for det in &detections {
            let _ = det.resolve(640, 480);
        }
    }
});
