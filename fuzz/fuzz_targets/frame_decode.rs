//! Fuzz target for frame parsing and authenticated decoding
//!
//! Arbitrary bytes go through `Frame::decode`; whatever parses is then run
//! through the codec against a fixed region. Neither step may panic, and a
//! frame nobody encoded must never authenticate.

#![no_main]

use libfuzzer_sys::fuzz_target;
use padlock_proto::{Frame, decode};

const REGION: [u8; 4096] = {
    let mut region = [0u8; 4096];
    let mut i = 0;
    while i < region.len() {
        region[i] = (i as u8).wrapping_mul(31).wrapping_add(7);
        i += 1;
    }
    region
};

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = Frame::decode(data) else {
        return;
    };

    assert_eq!(frame.encoded_len(), data.len());
    assert_eq!(frame.to_bytes().as_slice(), data);

    if decode(&REGION, &frame).is_ok() {
        panic!("forged frame at offset {} authenticated", frame.offset());
    }
});
