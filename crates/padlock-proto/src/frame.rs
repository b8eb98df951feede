//! Frame type combining header, ciphertext and tag.
//!
//! A `Frame` is the unit exchanged through the relay:
//! - 10-byte raw binary header (Big Endian)
//! - Variable-length ciphertext
//! - 32-byte authentication tag
//!
//! This is a pure data holder. Encryption and tag checks live in
//! [`crate::codec`].

use bytes::{BufMut, Bytes};
use padlock_crypto::{MIN_PADDED_SIZE, TAG_SIZE};

use crate::{
    FrameHeader,
    errors::{ProtocolError, Result},
};

/// Complete authenticated frame
///
/// Layout on the wire:
/// `[FrameHeader: 10 bytes] + [ciphertext: length bytes] + [tag: 32 bytes]`
///
/// # Invariants
///
/// - Size Consistency: `ciphertext.len()` MUST match `header.length()`.
///   Enforced by [`Frame::new`] and verified by [`Frame::decode`].
///
/// - Minimum Size: decoded frames carry at least 32 ciphertext bytes, the
///   padded floor.
///
/// # Security
///
/// Provides structural validity only. A decoded frame is untrusted until its
/// tag verifies against the pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame header (10 bytes)
    pub header: FrameHeader,

    /// Encrypted, padded message
    pub ciphertext: Bytes,

    /// Wegman-Carter tag over header and ciphertext
    pub tag: [u8; TAG_SIZE],
}

impl Frame {
    /// Smallest valid encoded frame
    pub const MIN_SIZE: usize = FrameHeader::SIZE + MIN_PADDED_SIZE + TAG_SIZE;

    /// Bytes around the ciphertext
    pub const OVERHEAD: usize = FrameHeader::SIZE + TAG_SIZE;

    /// Create a frame, setting the header length from the ciphertext.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::PayloadTooLarge` if the ciphertext does not fit the
    ///   16-bit length field
    pub fn new(offset: u64, ciphertext: impl Into<Bytes>, tag: [u8; TAG_SIZE]) -> Result<Self> {
        let ciphertext = ciphertext.into();
        let length = u16::try_from(ciphertext.len()).map_err(|_| {
            ProtocolError::PayloadTooLarge {
                size: ciphertext.len(),
                max: u16::MAX as usize,
            }
        })?;

        Ok(Self { header: FrameHeader::new(offset, length), ciphertext, tag })
    }

    /// Start of the consumed range in the message region
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.header.offset()
    }

    /// Total encoded size
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        Self::OVERHEAD + self.ciphertext.len()
    }

    /// Encode frame into buffer
    ///
    /// Writes: `[header (10 bytes)] + [ciphertext] + [tag (32 bytes)]`
    pub fn encode(&self, dst: &mut impl BufMut) {
        debug_assert_eq!(self.ciphertext.len(), self.header.length() as usize);

        dst.put_slice(&self.header.to_bytes());
        dst.put_slice(&self.ciphertext);
        dst.put_slice(&self.tag);
    }

    /// Encode into a fresh buffer
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf
    }

    /// Decode frame from wire format
    ///
    /// The buffer must hold exactly one frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FrameTooShort` if the buffer cannot hold a header, or
    ///   holds fewer bytes than the header declares
    /// - `ProtocolError::TrailingBytes` if the buffer is longer than declared
    /// - `ProtocolError::CiphertextTooShort` if the declared length is below
    ///   the padded minimum
    ///
    /// # Security
    ///
    /// All structural checks happen before the ciphertext is copied.
    pub fn decode(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        let header = *FrameHeader::from_bytes(bytes)?;

        let length = header.length() as usize;
        if length < MIN_PADDED_SIZE {
            return Err(ProtocolError::CiphertextTooShort { length, min: MIN_PADDED_SIZE });
        }

        let expected = Self::OVERHEAD + length;
        if bytes.len() < expected {
            return Err(ProtocolError::FrameTooShort { expected, actual: bytes.len() });
        }
        if bytes.len() > expected {
            return Err(ProtocolError::TrailingBytes { expected, actual: bytes.len() });
        }

        let body = &bytes[FrameHeader::SIZE..];
        let (ciphertext, tag_bytes) = body.split_at(length);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(tag_bytes);

        Ok(Self { header, ciphertext: Bytes::copy_from_slice(ciphertext), tag })
    }
}
