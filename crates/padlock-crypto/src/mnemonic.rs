//! Mnemonic pad checksum for ceremony verification
//!
//! Both devices read their words aloud (or show them side by side). Any
//! mismatch means the pad transfer was corrupted or tampered with. The words
//! are a checksum, not a secret.

use sha2::{Digest, Sha256};

use crate::{error::CryptoError, wordlist::WORDLIST};

/// Words spoken during a standard ceremony
pub const DEFAULT_WORD_COUNT: usize = 6;

/// One word per digest byte
const MAX_WORD_COUNT: usize = 32;

const MNEMONIC_LABEL: &[u8] = b"padlock:mnemonic:v1";

/// Derive `word_count` words from the full pad.
///
/// # Errors
///
/// - `InvalidWordCount`: `word_count` is zero or above 32
pub fn generate_mnemonic(pad: &[u8], word_count: usize) -> Result<Vec<&'static str>, CryptoError> {
    if word_count == 0 || word_count > MAX_WORD_COUNT {
        return Err(CryptoError::InvalidWordCount { count: word_count, max: MAX_WORD_COUNT });
    }

    Ok(words(&pad_digest(pad), word_count))
}

/// Six-word mnemonic, the ceremony default.
pub fn generate_default(pad: &[u8]) -> Vec<&'static str> {
    words(&pad_digest(pad), DEFAULT_WORD_COUNT)
}

fn pad_digest(pad: &[u8]) -> [u8; 32] {
    Sha256::new()
        .chain_update(MNEMONIC_LABEL)
        .chain_update((pad.len() as u64).to_be_bytes())
        .chain_update(pad)
        .finalize()
        .into()
}

fn words(digest: &[u8; 32], count: usize) -> Vec<&'static str> {
    digest.iter().take(count).map(|&b| WORDLIST[b as usize]).collect()
}

/// Compare words entered by the user against the pad, ignoring case and
/// surrounding whitespace.
pub fn verify_mnemonic<S: AsRef<str>>(pad: &[u8], spoken: &[S]) -> bool {
    let Ok(expected) = generate_mnemonic(pad, spoken.len()) else {
        return false;
    };

    expected.iter().zip(spoken).all(|(e, w)| e.eq_ignore_ascii_case(w.as_ref().trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_six_words() {
        assert_eq!(generate_default(&[0xAB; 1024]).len(), DEFAULT_WORD_COUNT);
    }

    #[test]
    fn default_matches_explicit_count() {
        let pad: Vec<u8> = (0..=255).collect();
        assert_eq!(generate_default(&pad), generate_mnemonic(&pad, 6).unwrap());
    }

    #[test]
    fn deterministic() {
        let pad = [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE, 0xBA, 0xBE];
        assert_eq!(generate_default(&pad), generate_default(&pad));
    }

    #[test]
    fn longer_mnemonic_extends_shorter() {
        let pad = vec![0x42u8; 300];
        let short = generate_mnemonic(&pad, 4).unwrap();
        let long = generate_mnemonic(&pad, 12).unwrap();
        assert_eq!(short[..], long[..4]);
    }

    #[test]
    fn single_bit_flip_changes_words() {
        let pad = vec![0u8; 4096];
        let mut flipped = pad.clone();
        flipped[2048] ^= 0x01;
        assert_ne!(generate_mnemonic(&pad, 12).unwrap(), generate_mnemonic(&flipped, 12).unwrap());
    }

    #[test]
    fn appended_zero_changes_words() {
        let short = generate_mnemonic(&[0u8; 10], 12).unwrap();
        let long = generate_mnemonic(&[0u8; 11], 12).unwrap();
        assert_ne!(short, long);
    }

    #[test]
    fn word_count_bounds() {
        assert!(matches!(generate_mnemonic(&[], 0), Err(CryptoError::InvalidWordCount { .. })));
        assert!(generate_mnemonic(&[], 32).is_ok());
        assert!(matches!(generate_mnemonic(&[], 33), Err(CryptoError::InvalidWordCount { .. })));
    }

    #[test]
    fn verify_accepts_case_and_whitespace() {
        let pad = vec![7u8; 200];
        let spoken: Vec<String> =
            generate_default(&pad).iter().map(|w| format!(" {} ", w.to_uppercase())).collect();
        assert!(verify_mnemonic(&pad, &spoken));
    }

    #[test]
    fn verify_rejects_wrong_word() {
        let pad = vec![7u8; 200];
        let mut words = generate_default(&pad);
        words[3] = if words[3] == "acid" { "acorn" } else { "acid" };
        assert!(!verify_mnemonic(&pad, &words));
    }

    #[test]
    fn verify_rejects_empty() {
        assert!(!verify_mnemonic::<&str>(&[1, 2, 3], &[]));
    }
}
