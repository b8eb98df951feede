//! One-time pad encryption (XOR)
//!
//! Information-theoretic secrecy holds only when the key is uniformly random,
//! exactly as long as the data, and never reused. This module provides the
//! XOR; the ledger enforces single use.

use crate::error::CryptoError;

/// Encrypt plaintext by XOR with pad bytes.
///
/// # Errors
///
/// - `LengthMismatch`: key and plaintext lengths differ
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    xor(key, plaintext)
}

/// Decrypt ciphertext by XOR with pad bytes.
///
/// Identical to [`encrypt`] since XOR is its own inverse.
pub fn decrypt(key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    xor(key, ciphertext)
}

/// XOR `key` into `data` without allocating.
///
/// Lets callers keep plaintext in a single zeroizing buffer.
pub fn xor_in_place(key: &[u8], data: &mut [u8]) -> Result<(), CryptoError> {
    check_lengths(key, data)?;
    for (d, k) in data.iter_mut().zip(key) {
        *d ^= k;
    }
    Ok(())
}

fn xor(key: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_lengths(key, data)?;
    Ok(key.iter().zip(data).map(|(k, d)| k ^ d).collect())
}

fn check_lengths(key: &[u8], data: &[u8]) -> Result<(), CryptoError> {
    if key.len() == data.len() {
        Ok(())
    } else {
        Err(CryptoError::LengthMismatch { key_len: key.len(), data_len: data.len() })
    }
}
