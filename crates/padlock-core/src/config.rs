//! Ledger configuration

use padlock_crypto::{AUTH_KEY_SIZE, MIN_PADDED_SIZE, TOKEN_PREFIX_SIZE};

use crate::error::LedgerError;

/// Largest mnemonic the digest supports
const MAX_MNEMONIC_WORDS: usize = 32;

/// Per-conversation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Bytes at the start of the pad reserved for token derivation
    pub reserved_prefix: usize,

    /// Remaining capacity below which the conversation is exhausted
    pub min_frame_consumption: u64,

    /// Words produced by [`crate::Conversation::mnemonic`]
    pub mnemonic_words: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            reserved_prefix: TOKEN_PREFIX_SIZE,
            min_frame_consumption: (MIN_PADDED_SIZE + AUTH_KEY_SIZE) as u64,
            mnemonic_words: 6,
        }
    }
}

impl LedgerConfig {
    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if the prefix cannot hold the token material, the
    ///   exhaustion threshold is below the smallest possible frame, or the
    ///   mnemonic length is outside `1..=32`
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.reserved_prefix < TOKEN_PREFIX_SIZE {
            return Err(LedgerError::InvalidConfig {
                reason: "reserved prefix smaller than token prefix",
            });
        }
        if self.min_frame_consumption < (MIN_PADDED_SIZE + AUTH_KEY_SIZE) as u64 {
            return Err(LedgerError::InvalidConfig {
                reason: "min frame consumption below smallest frame",
            });
        }
        if self.mnemonic_words == 0 || self.mnemonic_words > MAX_MNEMONIC_WORDS {
            return Err(LedgerError::InvalidConfig { reason: "mnemonic words outside 1..=32" });
        }
        Ok(())
    }
}
