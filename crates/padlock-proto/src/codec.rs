//! Authenticated frame codec
//!
//! Turns plaintext into frames and back, given the pad's message region and
//! an offset already reserved by the ledger. The codec never decides where a
//! frame goes; it only checks that the slices it is told to use exist.
//!
//! # Key slices
//!
//! A frame at `offset` with `len` ciphertext bytes consumes one contiguous
//! range of the message region:
//!
//! ```text
//! offset            offset+len          offset+len+64
//!   │   cipher key      │    auth key        │
//!   └───────────────────┴────────────────────┘
//! ```
//!
//! # Security
//!
//! - Tags are verified before any byte is decrypted
//! - Decrypted buffers and copied auth keys are zeroized on drop

use std::ops::Range;

use padlock_crypto::{
    AUTH_KEY_SIZE, MIN_PADDED_SIZE, compute_tag, otp, pad, padded_len, unpad, verify_tag,
};
use zeroize::Zeroizing;

use crate::{
    Frame,
    errors::{ProtocolError, Result},
};

/// Pad ranges used by one frame, relative to the message region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySlices {
    offset: u64,
    cipher_len: usize,
}

impl KeySlices {
    /// Slices for a frame starting at `offset` with `cipher_len` ciphertext
    /// bytes.
    #[must_use]
    pub fn for_frame(offset: u64, cipher_len: usize) -> Self {
        Self { offset, cipher_len }
    }

    /// Total bytes consumed: ciphertext length plus the auth key.
    #[must_use]
    pub fn consumed_len(&self) -> usize {
        self.cipher_len + AUTH_KEY_SIZE
    }

    /// `[offset, offset + len + 64)` as absolute region indices.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::OffsetOutOfRange` if any part lies past
    ///   `region_len`
    pub fn consumed_range(&self, region_len: usize) -> Result<Range<usize>> {
        let out_of_range = || ProtocolError::OffsetOutOfRange {
            offset: self.offset,
            len: self.consumed_len(),
            region: region_len,
        };

        let start = usize::try_from(self.offset).map_err(|_| out_of_range())?;
        let end = start.checked_add(self.consumed_len()).ok_or_else(out_of_range)?;
        if end > region_len {
            return Err(out_of_range());
        }

        Ok(start..end)
    }

    /// Split the consumed range into cipher key and auth key.
    fn split<'a>(&self, region: &'a [u8]) -> Result<(&'a [u8], &'a [u8])> {
        let range = self.consumed_range(region.len())?;
        Ok(region[range].split_at(self.cipher_len))
    }
}

/// Encrypt `plaintext` into a frame at `offset`.
///
/// `region` is the pad's message region. The caller must have reserved
/// `padded_len(plaintext.len()) + 64` bytes at `offset` through the ledger.
///
/// # Errors
///
/// - `ProtocolError::Crypto(MessageTooLarge)` if the message cannot be padded
/// - `ProtocolError::PayloadTooLarge` if the padded message exceeds the
///   16-bit length field
/// - `ProtocolError::OffsetOutOfRange` if the slices do not fit the region
pub fn encode(region: &[u8], offset: u64, plaintext: &[u8]) -> Result<Frame> {
    let mut padded = Zeroizing::new(pad(plaintext)?);
    if padded.len() > u16::MAX as usize {
        return Err(ProtocolError::PayloadTooLarge { size: padded.len(), max: u16::MAX as usize });
    }
    debug_assert_eq!(padded.len(), padded_len(plaintext.len()));

    let slices = KeySlices::for_frame(offset, padded.len());
    let (cipher_key, auth_key) = slices.split(region)?;

    // encrypted in place, so the only plaintext copy is the zeroizing one
    otp::xor_in_place(cipher_key, &mut padded)?;
    let ciphertext = std::mem::take(&mut *padded);
    let auth_key = copy_auth_key(auth_key);

    let mut frame = Frame::new(offset, ciphertext, [0u8; padlock_crypto::TAG_SIZE])?;
    frame.tag = compute_tag(&auth_key, &frame.header.to_bytes(), &frame.ciphertext);

    Ok(frame)
}

/// Authenticate and decrypt a frame against the message region.
///
/// Returns the original plaintext. The caller checks the offset against its
/// ledger first; this function only validates that the declared slices exist.
///
/// # Errors
///
/// - `ProtocolError::CiphertextTooShort` for ciphertext below the padded
///   floor
/// - `ProtocolError::OffsetOutOfRange` if the slices do not fit the region
/// - `ProtocolError::AuthenticationFailed` if the tag does not verify
/// - `ProtocolError::InvalidFormat` if the authenticated plaintext carries
///   malformed padding
pub fn decode(region: &[u8], frame: &Frame) -> Result<Zeroizing<Vec<u8>>> {
    let cipher_len = frame.ciphertext.len();
    if cipher_len < MIN_PADDED_SIZE {
        return Err(ProtocolError::CiphertextTooShort { length: cipher_len, min: MIN_PADDED_SIZE });
    }
    debug_assert_eq!(cipher_len, frame.header.length() as usize);

    let slices = KeySlices::for_frame(frame.offset(), cipher_len);
    let (cipher_key, auth_key) = slices.split(region)?;

    if !verify_tag(auth_key, &frame.header.to_bytes(), &frame.ciphertext, &frame.tag) {
        return Err(ProtocolError::AuthenticationFailed);
    }

    let mut padded = Zeroizing::new(frame.ciphertext.to_vec());
    otp::xor_in_place(cipher_key, &mut padded)?;
    let message = unpad(&padded).map_err(|_| ProtocolError::InvalidFormat("malformed padding"))?;

    Ok(Zeroizing::new(message))
}

fn copy_auth_key(slice: &[u8]) -> Zeroizing<[u8; AUTH_KEY_SIZE]> {
    let mut key = Zeroizing::new([0u8; AUTH_KEY_SIZE]);
    key.copy_from_slice(slice);
    key
}
