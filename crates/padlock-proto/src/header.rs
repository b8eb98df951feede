//! The 10-byte frame header, parsed in place.
//!
//! The `FrameHeader` is a fixed 10-byte structure serialized as raw binary
//! (Big Endian). The header is authenticated together with the ciphertext, so
//! a tampered offset or length fails tag verification.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::errors::{ProtocolError, Result};

/// Fixed 10-byte frame header (Big Endian network byte order)
///
/// ```text
/// bytes 0-7   offset  u64  start of the consumed range in the message region
/// bytes 8-9   length  u16  ciphertext length
/// ```
///
/// # Security
///
/// Every 10-byte pattern is a valid header, so it is cast straight from
/// relay bytes without validation. Structural checks here are cheap; authenticity comes from the tag.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct FrameHeader {
    offset: [u8; 8],
    length: [u8; 2],
}

impl FrameHeader {
    /// Size of the serialized header (10 bytes)
    pub const SIZE: usize = 10;

    /// Create a header for a frame at `offset` carrying `length` ciphertext
    /// bytes.
    #[must_use]
    pub fn new(offset: u64, length: u16) -> Self {
        Self { offset: offset.to_be_bytes(), length: length.to_be_bytes() }
    }

    /// Parse header from network bytes (zero-copy)
    ///
    /// # Errors
    ///
    /// - `ProtocolError::FrameTooShort` if buffer is shorter than 10 bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        let header = Self::ref_from_prefix(bytes)
            .map_err(|_| ProtocolError::FrameTooShort { expected: Self::SIZE, actual: bytes.len() })?
            .0;

        Ok(header)
    }

    /// Serialize header to bytes
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(IntoBytes::as_bytes(self));
        arr
    }

    /// Start of the frame's consumed range, relative to the message region.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from_be_bytes(self.offset)
    }

    /// Ciphertext length in bytes.
    #[must_use]
    pub fn length(&self) -> u16 {
        u16::from_be_bytes(self.length)
    }
}

impl std::fmt::Debug for FrameHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHeader")
            .field("offset", &self.offset())
            .field("length", &self.length())
            .finish()
    }
}

// Packed fields cannot be borrowed, so compare the encoded form.
impl PartialEq for FrameHeader {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for FrameHeader {}
