//! Error types for frame parsing and the frame codec.

use padlock_crypto::CryptoError;
use thiserror::Error;

/// Result alias for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors from frame encoding, decoding and authentication
///
/// Every variant produced while decoding is frame-local: the receiver drops
/// the frame and the conversation continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Buffer too short to contain the fixed-size part of a frame
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Minimum bytes required
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// Buffer longer than the header says the frame is
    #[error("trailing bytes: frame is {expected} bytes, buffer is {actual}")]
    TrailingBytes {
        /// Frame size declared by the header
        expected: usize,
        /// Buffer size
        actual: usize,
    },

    /// Declared ciphertext length below the padded minimum
    #[error("ciphertext too short: {length} bytes, minimum {min}")]
    CiphertextTooShort {
        /// Declared length
        length: usize,
        /// Minimum padded size
        min: usize,
    },

    /// Ciphertext does not fit the 16-bit length field
    #[error("payload too large: {size} bytes, max {max}")]
    PayloadTooLarge {
        /// Ciphertext size
        size: usize,
        /// Largest encodable ciphertext
        max: usize,
    },

    /// Declared offset and length reach outside the pad's message region
    #[error("offset out of range: {offset}+{len} exceeds region of {region} bytes")]
    OffsetOutOfRange {
        /// Declared offset
        offset: u64,
        /// Bytes the frame consumes (ciphertext + auth key)
        len: usize,
        /// Size of the message region
        region: usize,
    },

    /// Malformed content after authentication (e.g. corrupted padding)
    #[error("invalid format: {0}")]
    InvalidFormat(&'static str),

    /// Tag verification failed
    ///
    /// Deliberately carries no detail.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Relay envelope could not be turned into frame bytes
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Primitive failure while encoding
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl ProtocolError {
    /// Returns true if the receiver should drop the frame and carry on.
    ///
    /// Only encode-side misuse (oversized payloads, API misuse in the
    /// primitives) is not droppable.
    pub fn is_droppable(&self) -> bool {
        match self {
            Self::FrameTooShort { .. }
            | Self::TrailingBytes { .. }
            | Self::CiphertextTooShort { .. }
            | Self::OffsetOutOfRange { .. }
            | Self::InvalidFormat(_)
            | Self::AuthenticationFailed
            | Self::InvalidEnvelope(_) => true,

            Self::PayloadTooLarge { .. } => false,
            Self::Crypto(err) => !err.is_fatal(),
        }
    }

    /// Short stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::InvalidEnvelope(_) => "invalid_envelope",
            Self::Crypto(err) if err.is_fatal() => "crypto",
            _ => "invalid_format",
        }
    }
}
