//! Relay envelope
//!
//! The relay stores and forwards opaque frames keyed by conversation id. It
//! never sees pad bytes. The ciphertext field carries the full encoded frame
//! (header, ciphertext and tag) as standard base64.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::{
    Frame,
    errors::{ProtocolError, Result},
};

/// A frame as delivered by the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEnvelope {
    /// Conversation the frame belongs to (hex token)
    pub conversation_id: String,

    /// Base64-encoded frame bytes
    pub ciphertext: String,

    /// Relay-assigned sequence number, if the relay provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,

    /// Unix time in milliseconds at which the relay accepted the frame
    pub received_at: u64,
}

impl RelayEnvelope {
    /// Wrap an encoded frame for upload.
    #[must_use]
    pub fn from_frame(conversation_id: impl Into<String>, frame: &Frame, received_at: u64) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            ciphertext: STANDARD.encode(frame.to_bytes()),
            sequence: None,
            received_at,
        }
    }

    /// Raw frame bytes.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::InvalidEnvelope` if the ciphertext is not valid
    ///   base64
    pub fn frame_bytes(&self) -> Result<Vec<u8>> {
        STANDARD.decode(&self.ciphertext).map_err(|e| ProtocolError::InvalidEnvelope(e.to_string()))
    }

    /// Decode the carried frame.
    ///
    /// # Errors
    ///
    /// - `ProtocolError::InvalidEnvelope` for bad base64
    /// - Any structural error from [`Frame::decode`]
    pub fn frame(&self) -> Result<Frame> {
        Frame::decode(self.frame_bytes()?)
    }
}
