//! Fuzz target: `parse_reading`
//!
//! Arbitrary bytes must always yield a non-negative magnitude (infinity only
//! for an overflowing exponent), and a malformed payload must read as
//! exactly zero.
//!
//! cargo fuzz run fuzz_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use schmitt_bridge::payload::parse_reading;

fuzz_target!(|data: &[u8]| {
    let r = parse_reading(data);
    assert!(!r.magnitude.is_nan(), "magnitude must not be NaN");
    assert!(r.magnitude >= 0.0, "magnitude must not be negative");
    if r.malformed {
        assert!(r.magnitude == 0.0, "malformed payload must read as zero");
    }
});
