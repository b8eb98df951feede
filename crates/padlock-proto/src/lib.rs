//! Padlock wire protocol
//!
//! Defines the authenticated frame exchanged between the two holders of a
//! pad, the codec that encrypts and authenticates frames, and the envelope
//! the relay hands back.
//!
//! # Frame layout
//!
//! ```text
//! ┌──────────────┬──────────────┬─────────────────────┬──────────────┐
//! │ offset (u64) │ length (u16) │ ciphertext (length) │ tag (32)     │
//! └──────────────┴──────────────┴─────────────────────┴──────────────┘
//! ```
//!
//! Offsets are relative to the pad's message region, which starts after the
//! 160-byte token prefix.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod errors;
pub mod frame;
pub mod header;
pub mod relay;

pub use codec::{KeySlices, decode, encode};
pub use errors::{ProtocolError, Result};
pub use frame::Frame;
pub use header::FrameHeader;
pub use relay::RelayEnvelope;
