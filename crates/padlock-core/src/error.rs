//! Error types for the ledger and conversation layer.

use padlock_crypto::CryptoError;
use padlock_proto::ProtocolError;
use thiserror::Error;

/// Errors from pad consumption, conversation and registry operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Not enough unused pad remains for the request
    ///
    /// Terminal for the conversation. The host must run a new ceremony.
    #[error("pad exhausted: requested {requested} bytes, {remaining} remaining")]
    PadExhausted {
        /// Bytes the reservation needed (ciphertext + auth key)
        requested: u64,
        /// Unused bytes left
        remaining: u64,
    },

    /// Conversation was burned; its pad is gone
    #[error("conversation burned")]
    Burned,

    /// Peer frame or stored counters contradict the ledger
    #[error("invalid format: {reason}")]
    InvalidFormat {
        /// What was inconsistent
        reason: &'static str,
    },

    /// Pad too small to hold the token prefix
    #[error("insufficient pad size: need {required} bytes, got {actual}")]
    InsufficientPadSize {
        /// Minimum pad length
        required: usize,
        /// Actual pad length
        actual: usize,
    },

    /// Configuration values out of range
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// Which value was rejected
        reason: &'static str,
    },

    /// A thread panicked while holding a conversation lock
    #[error("lock poisoned")]
    LockPoisoned,

    /// Frame failed to parse or authenticate
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Primitive misuse (e.g. mnemonic word count)
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Stored snapshot could not be encoded or decoded
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// No conversation registered under this id
    #[error("unknown conversation: {0}")]
    UnknownConversation(String),

    /// A conversation with this id is already registered
    #[error("duplicate conversation: {0}")]
    DuplicateConversation(String),
}

impl LedgerError {
    /// Returns true if the host should drop the offending frame and continue.
    ///
    /// Frame-local failures (bad format, failed authentication) are
    /// recoverable. Exhaustion, burn, pad size and lock poisoning are surfaced
    /// to the user.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidFormat { .. } => true,
            Self::Protocol(err) => err.is_droppable(),

            Self::PadExhausted { .. }
            | Self::Burned
            | Self::InsufficientPadSize { .. }
            | Self::InvalidConfig { .. }
            | Self::LockPoisoned
            | Self::Crypto(_)
            | Self::Snapshot(_)
            | Self::UnknownConversation(_)
            | Self::DuplicateConversation(_) => false,
        }
    }

    /// Returns true if the conversation can never send again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PadExhausted { .. } | Self::Burned)
    }
}
