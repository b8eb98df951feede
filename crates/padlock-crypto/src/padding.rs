//! Fixed-format message padding
//!
//! Layout:
//!
//! ```text
//! [0x00 marker][u16 BE length][message][zero fill up to MIN_PADDED_SIZE]
//! ```
//!
//! Short messages all encrypt to the same 32-byte ciphertext length.

use crate::error::CryptoError;

/// Smallest padded buffer (and therefore smallest ciphertext)
pub const MIN_PADDED_SIZE: usize = 32;

/// Marker byte + 2-byte length prefix
pub const PADDING_OVERHEAD: usize = 3;

/// Largest message the 16-bit length prefix can describe
pub const MAX_MESSAGE_SIZE: usize = u16::MAX as usize;

const MARKER: u8 = 0x00;

/// Padded length for a message of `message_len` bytes.
pub const fn padded_len(message_len: usize) -> usize {
    let needed = PADDING_OVERHEAD + message_len;
    if needed > MIN_PADDED_SIZE { needed } else { MIN_PADDED_SIZE }
}

/// Pad a message to at least [`MIN_PADDED_SIZE`] bytes.
///
/// # Errors
///
/// - `MessageTooLarge`: message exceeds [`MAX_MESSAGE_SIZE`]
pub fn pad(message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if message.len() > MAX_MESSAGE_SIZE {
        return Err(CryptoError::MessageTooLarge { size: message.len(), max: MAX_MESSAGE_SIZE });
    }

    let mut padded = vec![0u8; padded_len(message.len())];
    padded[0] = MARKER;
    padded[1..3].copy_from_slice(&(message.len() as u16).to_be_bytes());
    padded[PADDING_OVERHEAD..PADDING_OVERHEAD + message.len()].copy_from_slice(message);

    debug_assert!(padded.len() >= MIN_PADDED_SIZE);
    Ok(padded)
}

/// Strip padding and return the original message.
///
/// Trailing fill is ignored, not validated.
///
/// # Errors
///
/// - `InvalidFormat`: buffer shorter than the prefix, wrong marker, or a
///   declared length that runs past the buffer
pub fn unpad(padded: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let (&marker, rest) =
        padded.split_first().ok_or(CryptoError::InvalidFormat { reason: "empty buffer" })?;

    if marker != MARKER {
        return Err(CryptoError::InvalidFormat { reason: "unexpected marker" });
    }

    let Some((len_bytes, content)) = rest.split_first_chunk::<2>() else {
        return Err(CryptoError::InvalidFormat { reason: "missing length prefix" });
    };

    let declared = u16::from_be_bytes(*len_bytes) as usize;
    content
        .get(..declared)
        .map(<[u8]>::to_vec)
        .ok_or(CryptoError::InvalidFormat { reason: "declared length exceeds buffer" })
}
