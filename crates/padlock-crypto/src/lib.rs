//! Padlock Cryptographic Primitives
//!
//! Building blocks for one-time pad messaging. Pure functions with
//! deterministic outputs. Callers provide all pad bytes; nothing in this crate
//! touches system randomness or performs I/O.
//!
//! # Key Lifecycle
//!
//! A conversation pad is split once at ceremony time. The reserved prefix
//! feeds the identity tokens, the rest is consumed frame by frame:
//!
//! ```text
//! Shared Pad (N bytes)
//!        │
//!        ├── [0, 160)  ──► SHA-256(label || prefix) → conversation id,
//!        │                 auth token, burn token
//!        │
//!        └── [160, N)  ──► per frame: cipher key || 64-byte auth key
//!                                │                 │
//!                                ▼                 ▼
//!                          XOR ciphertext   Wegman-Carter tag
//! ```
//!
//! # Security
//!
//! Confidentiality:
//! - XOR with pad bytes used exactly once (enforced by the ledger, not here)
//! - Padding hides message length below 32 bytes
//!
//! Authenticity:
//! - Polynomial hash over GF(2^128) keyed with one-time points, masked with
//!   one-time pads
//! - Constant-time tag comparison
//!
//! Hygiene:
//! - Key buffers handed out by this crate are zeroized on drop
//! - No function logs or formats key material

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod auth;
pub mod crc;
pub mod derivation;
pub mod error;
pub mod mnemonic;
pub mod otp;
pub mod padding;
pub mod wordlist;

pub use auth::{AUTH_KEY_SIZE, TAG_SIZE, compute_tag, verify_tag};
pub use crc::{PadChecksum, compute_crc32, verify_crc32};
pub use derivation::{
    DerivedTokens, TOKEN_PREFIX_SIZE, derive_all, derive_auth_token, derive_burn_token,
    derive_conversation_id,
};
pub use error::CryptoError;
pub use mnemonic::{DEFAULT_WORD_COUNT, generate_default, generate_mnemonic, verify_mnemonic};
pub use padding::{MAX_MESSAGE_SIZE, MIN_PADDED_SIZE, PADDING_OVERHEAD, pad, padded_len, unpad};
pub use wordlist::{WORDLIST, WORDLIST_VERSION};
