//! Subcommand implementations.
//!
//! Each command reads its inputs, does the work and returns the text to print.
//! Nothing here writes to stdout, so commands are testable without a process.

use std::{fs, path::Path};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use padlock_core::{Ledger, LedgerConfig, LedgerError, LedgerSnapshot};
use padlock_crypto::{CryptoError, PadChecksum, derive_all, generate_mnemonic};
use padlock_proto::{Frame, FrameHeader, ProtocolError};
use thiserror::Error;

/// Errors surfaced to the command line
#[derive(Debug, Error)]
pub enum CliError {
    /// Input file could not be read
    #[error("cannot read {path}: {source}")]
    Read {
        /// File that failed
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Input was not valid base64 or hex
    #[error("invalid encoding: {0}")]
    Encoding(String),

    /// Primitive failure
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Frame failed to parse
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Snapshot failed to decode or validate
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Checksum did not match the expected value
    #[error("checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch {
        /// Expected checksum (hex)
        expected: String,
        /// Computed checksum (hex)
        actual: String,
    },
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    fs::read(path).map_err(|source| CliError::Read { path: path.display().to_string(), source })
}

/// Mnemonic words for a pad file.
pub fn mnemonic(pad_path: &Path, config: &LedgerConfig) -> Result<String, CliError> {
    config.validate()?;
    let pad = read(pad_path)?;
    Ok(generate_mnemonic(&pad, config.mnemonic_words)?.join(" "))
}

/// Conversation id, and optionally the secret tokens.
pub fn tokens(pad_path: &Path, reveal: bool) -> Result<String, CliError> {
    let pad = read(pad_path)?;
    let tokens = derive_all(&pad)?;

    let id = format!("conversation_id {}", tokens.conversation_id);
    if !reveal {
        return Ok(id);
    }
    Ok(format!(
        "{id}\nauth_token      {}\nburn_token      {}",
        tokens.auth_token, tokens.burn_token
    ))
}

/// Transfer checksum of a file, optionally compared against `expect` (hex).
pub fn crc(path: &Path, expect: Option<&str>) -> Result<String, CliError> {
    let data = read(path)?;
    let checksum = PadChecksum::of(&data);
    let actual = hex::encode(checksum.to_bytes());

    if let Some(expected) = expect {
        let bytes = hex::decode(expected).map_err(|e| CliError::Encoding(e.to_string()))?;
        let parsed = <[u8; PadChecksum::SIZE]>::try_from(bytes.as_slice())
            .map_err(|_| CliError::Encoding(format!("checksum must be {} bytes", PadChecksum::SIZE)))?;

        if PadChecksum::from_bytes(&parsed) != checksum {
            return Err(CliError::ChecksumMismatch { expected: expected.to_owned(), actual });
        }
    }

    Ok(format!("{actual}  len={} crc32={:08x}", checksum.len, checksum.crc32))
}

/// Header summary of a frame file (raw bytes, or base64 text).
pub fn inspect(frame_path: &Path, base64: bool) -> Result<String, CliError> {
    let raw = read(frame_path)?;
    let bytes = if base64 {
        let text = String::from_utf8_lossy(&raw);
        STANDARD.decode(text.trim()).map_err(|e| CliError::Encoding(e.to_string()))?
    } else {
        raw
    };

    let frame = Frame::decode(&bytes)?;
    Ok(format!(
        "offset     {}\nciphertext {} bytes\nconsumes   {} pad bytes\nframe      {} bytes ({} header)",
        frame.offset(),
        frame.ciphertext.len(),
        frame.ciphertext.len() + padlock_crypto::AUTH_KEY_SIZE,
        frame.encoded_len(),
        FrameHeader::SIZE,
    ))
}

/// Counters and state from a CBOR ledger snapshot.
pub fn ledger(snapshot_path: &Path, config: &LedgerConfig) -> Result<String, CliError> {
    config.validate()?;
    let bytes = read(snapshot_path)?;
    let snapshot = LedgerSnapshot::from_cbor(&bytes)?;
    let ledger = Ledger::restore(snapshot, config)?;

    Ok(format!(
        "role          {}\ntotal         {}\nsend_offset   {}\npeer_consumed {}\nremaining     {}\nstate         {:?}",
        ledger.role(),
        ledger.total(),
        ledger.send_offset(),
        ledger.peer_consumed(),
        ledger.remaining(),
        ledger.state(),
    ))
}
