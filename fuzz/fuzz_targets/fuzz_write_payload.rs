//! Fuzz target: text written to a relay board handle.
//!
//! The parser must accept any byte string without panicking, and the mask
//! it yields must survive a format/parse cycle.
//!
//! Run: cargo +nightly fuzz run fuzz_write_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use relayboard::device::text::{format_mask, parse_mask};
use relayboard::protocol::{COMMIT_FRAMES, payloads};

fuzz_target!(|data: &[u8]| {
    let mask = parse_mask(data);
    assert_eq!(parse_mask(format_mask(mask).as_bytes()), mask);
    assert_eq!(payloads(mask).len(), COMMIT_FRAMES);
});
