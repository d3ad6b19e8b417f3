//! Fuzz target for ORB extraction on arbitrary small images.
//!
//! The first two bytes pick the dimensions; the rest are pixel data.

#![no_main]

use composure::features::fuzz_extract;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let [w, h, pixels @ ..] = data else {
        return;
    };
    let (width, height) = (*w as u32, *h as u32);
    if pixels.len() < (width * height) as usize {
        return;
    }

    let _ = fuzz_extract(width, height, &pixels[..(width * height) as usize]);
});
