//! Error types for pad primitives

use thiserror::Error;

/// Errors from cipher, padding, derivation and mnemonic operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Key and data lengths differ
    ///
    /// Always a caller bug. Never silently truncated or padded.
    #[error("length mismatch: key is {key_len} bytes, data is {data_len} bytes")]
    LengthMismatch {
        /// Key length
        key_len: usize,
        /// Data length
        data_len: usize,
    },

    /// Malformed padded buffer (bad marker or declared length)
    #[error("invalid format: {reason}")]
    InvalidFormat {
        /// What was wrong with the buffer
        reason: &'static str,
    },

    /// Message does not fit the 16-bit length prefix
    #[error("message too large: {size} bytes, max {max}")]
    MessageTooLarge {
        /// Message length
        size: usize,
        /// Largest accepted message
        max: usize,
    },

    /// Pad too small to derive identity tokens
    #[error("insufficient pad size: need {required} bytes, got {actual}")]
    InsufficientPadSize {
        /// Minimum pad length
        required: usize,
        /// Actual pad length
        actual: usize,
    },

    /// Mnemonic word count outside the supported range
    #[error("invalid word count: {count} (supported 1..={max})")]
    InvalidWordCount {
        /// Requested words
        count: usize,
        /// Largest supported count
        max: usize,
    },
}

impl CryptoError {
    /// Returns true if this error is a caller bug rather than bad input.
    ///
    /// `InvalidFormat` comes from untrusted bytes and is recoverable by
    /// dropping the frame. Everything else indicates a misuse of the API.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::InvalidFormat { .. } => false,

            Self::LengthMismatch { .. }
            | Self::MessageTooLarge { .. }
            | Self::InsufficientPadSize { .. }
            | Self::InvalidWordCount { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_format_is_not_fatal() {
        let err = CryptoError::InvalidFormat { reason: "bad marker" };
        assert!(!err.is_fatal());
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let err = CryptoError::LengthMismatch { key_len: 3, data_len: 4 };
        assert!(err.is_fatal());
    }

    #[test]
    fn error_display() {
        let err = CryptoError::InsufficientPadSize { required: 160, actual: 10 };
        assert_eq!(err.to_string(), "insufficient pad size: need 160 bytes, got 10");
    }
}
