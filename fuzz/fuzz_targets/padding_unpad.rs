//! Fuzz target for padding removal
//!
//! `unpad` sees attacker-influenced bytes after decryption. It must reject
//! garbage without panicking, and anything it accepts must pad back to the
//! same length.

#![no_main]

use libfuzzer_sys::fuzz_target;
use padlock_crypto::{pad, padded_len, unpad};

fuzz_target!(|data: &[u8]| {
    let Ok(message) = unpad(data) else {
        return;
    };

    assert!(message.len() <= data.len());
    if data.len() == padded_len(message.len()) {
        let repadded = pad(&message).unwrap_or_default();
        assert_eq!(repadded.len(), data.len());
    }
});
