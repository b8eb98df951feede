//! Identity token derivation from the reserved pad prefix
//!
//! Both devices hold the same pad after the ceremony, so both compute the same
//! conversation id and tokens without a network round trip. The prefix is
//! never used for message frames.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::CryptoError;

/// Bytes at the start of the pad reserved for token derivation
pub const TOKEN_PREFIX_SIZE: usize = 160;

/// Label for the conversation identifier
const CONVERSATION_ID_LABEL: &[u8] = b"padlock:conversation-id:v1";

/// Label for the relay authorization token
const AUTH_TOKEN_LABEL: &[u8] = b"padlock:auth-token:v1";

/// Label for the burn authorization token
const BURN_TOKEN_LABEL: &[u8] = b"padlock:burn-token:v1";

/// Derive the conversation identifier (64 lowercase hex chars).
///
/// # Errors
///
/// - `InsufficientPadSize`: pad shorter than [`TOKEN_PREFIX_SIZE`]
pub fn derive_conversation_id(pad: &[u8]) -> Result<String, CryptoError> {
    derive_labeled(CONVERSATION_ID_LABEL, pad)
}

/// Derive the token that authorizes relay reads and writes.
pub fn derive_auth_token(pad: &[u8]) -> Result<String, CryptoError> {
    derive_labeled(AUTH_TOKEN_LABEL, pad)
}

/// Derive the token that authorizes burning the conversation at the relay.
pub fn derive_burn_token(pad: &[u8]) -> Result<String, CryptoError> {
    derive_labeled(BURN_TOKEN_LABEL, pad)
}

/// All identity values derived from one pad.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedTokens {
    /// Public conversation identifier
    pub conversation_id: String,
    /// Secret relay authorization token
    pub auth_token: String,
    /// Secret burn authorization token
    pub burn_token: String,
}

/// Derive the conversation id, auth token, and burn token in one pass.
pub fn derive_all(pad: &[u8]) -> Result<DerivedTokens, CryptoError> {
    Ok(DerivedTokens {
        conversation_id: derive_conversation_id(pad)?,
        auth_token: derive_auth_token(pad)?,
        burn_token: derive_burn_token(pad)?,
    })
}

// Tokens are bearer credentials; keep them out of logs.
impl fmt::Debug for DerivedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedTokens")
            .field("conversation_id", &self.conversation_id)
            .field("auth_token", &"<redacted>")
            .field("burn_token", &"<redacted>")
            .finish()
    }
}

fn derive_labeled(label: &[u8], pad: &[u8]) -> Result<String, CryptoError> {
    let prefix = pad.get(..TOKEN_PREFIX_SIZE).ok_or(CryptoError::InsufficientPadSize {
        required: TOKEN_PREFIX_SIZE,
        actual: pad.len(),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(label);
    hasher.update(prefix);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_pad(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + 3) as u8).collect()
    }

    #[test]
    fn produces_64_hex_chars() {
        let id = derive_conversation_id(&test_pad(TOKEN_PREFIX_SIZE)).unwrap();
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn derive_is_deterministic() {
        let pad = test_pad(1000);
        assert_eq!(derive_all(&pad).unwrap(), derive_all(&pad).unwrap());
    }

    #[test]
    fn labels_separate_tokens() {
        let tokens = derive_all(&test_pad(TOKEN_PREFIX_SIZE)).unwrap();
        assert_ne!(tokens.conversation_id, tokens.auth_token);
        assert_ne!(tokens.conversation_id, tokens.burn_token);
        assert_ne!(tokens.auth_token, tokens.burn_token);
    }

    #[test]
    fn only_prefix_matters() {
        let mut a = test_pad(500);
        let b = test_pad(500);
        a[TOKEN_PREFIX_SIZE] ^= 0xFF;
        a[499] ^= 0xFF;
        assert_eq!(derive_all(&a).unwrap(), derive_all(&b).unwrap());
    }

    #[test]
    fn prefix_change_changes_every_token() {
        let a = test_pad(TOKEN_PREFIX_SIZE);
        let mut b = a.clone();
        b[TOKEN_PREFIX_SIZE - 1] ^= 0x01;

        let ta = derive_all(&a).unwrap();
        let tb = derive_all(&b).unwrap();
        assert_ne!(ta.conversation_id, tb.conversation_id);
        assert_ne!(ta.auth_token, tb.auth_token);
        assert_ne!(ta.burn_token, tb.burn_token);
    }

    #[test]
    fn short_pad_rejected() {
        let result = derive_auth_token(&test_pad(TOKEN_PREFIX_SIZE - 1));
        assert_eq!(
            result,
            Err(CryptoError::InsufficientPadSize { required: 160, actual: 159 })
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let tokens = derive_all(&test_pad(TOKEN_PREFIX_SIZE)).unwrap();
        let debug = format!("{tokens:?}");
        assert!(debug.contains(&tokens.conversation_id));
        assert!(!debug.contains(&tokens.auth_token));
        assert!(!debug.contains(&tokens.burn_token));
    }
}
