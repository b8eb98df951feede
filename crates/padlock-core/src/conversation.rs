//! One side of a padlock conversation
//!
//! A [`Conversation`] owns the pad, the identity tokens derived from it, and
//! the consumption ledger. It is the only type that combines the ledger with
//! the codec, so every outgoing frame is encrypted under a range the ledger
//! has already committed.
//!
//! # Receive pipeline
//!
//! ```text
//! bytes ─► Frame::decode ─► classify ─┬─ Own ─────────► Skipped(Own)
//!                                     ├─ Duplicate ───► Skipped(AlreadyProcessed)
//!                                     ├─ overlaps processed ─► InvalidFormat
//!                                     └─ New ─► authenticate ─► decrypt
//!                                                   ─► record peer consumption
//!                                                   ─► Delivered
//! ```
//!
//! Frames that fail to parse or authenticate leave the ledger untouched. So
//! does a frame whose range runs into peer bytes already processed.

use std::fmt;

use padlock_crypto::{
    AUTH_KEY_SIZE, DerivedTokens, derive_all, generate_mnemonic, padded_len, verify_mnemonic,
};
use padlock_proto::{Frame, ProtocolError, RelayEnvelope, codec};
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    config::LedgerConfig,
    error::LedgerError,
    ledger::{Classification, Ledger, LedgerSnapshot, LedgerState, PeerUpdate},
    role::Role,
};

/// Why a well-formed frame was not delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Peer frame at or below the watermark
    AlreadyProcessed,
    /// Our own frame, echoed back by the relay
    Own,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyProcessed => f.write_str("Already processed"),
            Self::Own => f.write_str("Own message"),
        }
    }
}

/// A decrypted peer message
#[derive(Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// Plaintext, wiped on drop
    pub plaintext: Zeroizing<Vec<u8>>,
    /// Frame offset in the message region
    pub offset: u64,
    /// Pad bytes the frame consumed (ciphertext plus auth key)
    pub consumed: u64,
    /// Ciphertext length
    pub ciphertext_len: usize,
}

impl fmt::Debug for ReceivedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceivedMessage")
            .field("plaintext_len", &self.plaintext.len())
            .field("offset", &self.offset)
            .field("consumed", &self.consumed)
            .field("ciphertext_len", &self.ciphertext_len)
            .finish()
    }
}

/// Result of processing a well-formed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// New peer message, authenticated and decrypted
    Delivered(ReceivedMessage),
    /// Nothing to deliver; ledger unchanged
    Skipped(SkipReason),
}

/// Pad, tokens and ledger for one conversation
pub struct Conversation {
    pad: Zeroizing<Vec<u8>>,
    tokens: DerivedTokens,
    ledger: Ledger,
    config: LedgerConfig,
}

impl Conversation {
    /// Open a fresh conversation with default settings.
    ///
    /// # Errors
    ///
    /// - `InsufficientPadSize` if the pad cannot hold the token prefix
    pub fn new(pad: Vec<u8>, role: Role) -> Result<Self, LedgerError> {
        Self::with_config(pad, role, LedgerConfig::default())
    }

    /// Open a fresh conversation.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `config` fails validation
    /// - `InsufficientPadSize` if the pad cannot hold the reserved prefix
    pub fn with_config(pad: Vec<u8>, role: Role, config: LedgerConfig) -> Result<Self, LedgerError> {
        let pad = Zeroizing::new(pad);
        config.validate()?;

        if pad.len() < config.reserved_prefix {
            return Err(LedgerError::InsufficientPadSize {
                required: config.reserved_prefix,
                actual: pad.len(),
            });
        }

        let tokens = derive_all(&pad)?;
        let total = (pad.len() - config.reserved_prefix) as u64;
        let ledger = Ledger::with_config(role, total, &config);

        debug!(conversation_id = %tokens.conversation_id, %role, total, "conversation opened");

        Ok(Self { pad, tokens, ledger, config })
    }

    /// Reopen a conversation from its pad and stored counters.
    ///
    /// # Errors
    ///
    /// - `Burned` if the snapshot records a burn
    /// - `InvalidFormat` if the snapshot does not match the pad or its
    ///   counters overlap
    pub fn restore(
        pad: Vec<u8>,
        snapshot: LedgerSnapshot,
        config: LedgerConfig,
    ) -> Result<Self, LedgerError> {
        if snapshot.burned {
            return Err(LedgerError::Burned);
        }

        let mut conversation = Self::with_config(pad, snapshot.role, config)?;
        if snapshot.total != conversation.ledger.total() {
            return Err(LedgerError::InvalidFormat { reason: "snapshot does not match pad" });
        }

        conversation.ledger = Ledger::restore(snapshot, &config)?;
        Ok(conversation)
    }

    /// Public conversation identifier.
    pub fn id(&self) -> &str {
        &self.tokens.conversation_id
    }

    /// Identity tokens derived from the pad prefix.
    pub fn tokens(&self) -> &DerivedTokens {
        &self.tokens
    }

    /// Our role.
    pub fn role(&self) -> Role {
        self.ledger.role()
    }

    /// Lifecycle state.
    pub fn state(&self) -> LedgerState {
        self.ledger.state()
    }

    /// Unused message-region bytes.
    pub fn remaining(&self) -> u64 {
        self.ledger.remaining()
    }

    /// Read-only view of the ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Counters for persistence.
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    /// Encrypt `plaintext` into wire bytes.
    ///
    /// # Errors
    ///
    /// - `Burned` or `PadExhausted` from the ledger
    /// - `Protocol(PayloadTooLarge)` if the padded message does not fit a
    ///   frame; checked before any pad is consumed
    pub fn send(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, LedgerError> {
        let cipher_len = padded_len(plaintext.len());
        if cipher_len > u16::MAX as usize {
            return Err(ProtocolError::PayloadTooLarge {
                size: cipher_len,
                max: u16::MAX as usize,
            }
            .into());
        }

        let reservation = self.ledger.reserve_send(cipher_len)?;
        let frame = codec::encode(self.region(), reservation.offset, plaintext)?;
        debug_assert_eq!(frame.ciphertext.len(), reservation.cipher_len);

        Ok(frame.to_bytes())
    }

    /// Process frame bytes received from the relay.
    ///
    /// # Errors
    ///
    /// - `Burned` after [`Conversation::burn`]
    /// - `Protocol` if the frame is malformed or fails authentication
    /// - `InvalidFormat` if an authentic frame contradicts our own sends
    pub fn receive(&mut self, bytes: &[u8]) -> Result<ReceiveOutcome, LedgerError> {
        if self.ledger.is_burned() {
            return Err(LedgerError::Burned);
        }

        let frame = Frame::decode(bytes).inspect_err(|e| self.log_drop(e))?;
        let offset = frame.offset();
        let ciphertext_len = frame.ciphertext.len();
        let consumed = (ciphertext_len + AUTH_KEY_SIZE) as u64;

        let class = self.ledger.classify_frame(offset, consumed).inspect_err(|e| {
            warn!(conversation_id = %self.tokens.conversation_id, offset, error = %e, "dropped frame");
        })?;

        match class {
            Classification::Own => {
                debug!(conversation_id = %self.id(), offset, "skipped own frame");
                return Ok(ReceiveOutcome::Skipped(SkipReason::Own));
            },
            Classification::Duplicate => {
                debug!(conversation_id = %self.id(), offset, "skipped duplicate frame");
                return Ok(ReceiveOutcome::Skipped(SkipReason::AlreadyProcessed));
            },
            Classification::New => {},
        }

        let plaintext = codec::decode(self.region(), &frame).inspect_err(|e| self.log_drop(e))?;

        let update = self.ledger.record_peer_consumption(offset, consumed).inspect_err(|e| {
            warn!(conversation_id = %self.tokens.conversation_id, offset, error = %e, "dropped frame");
        })?;

        match update {
            PeerUpdate::Advanced { .. } => {},
            PeerUpdate::OwnMessage => return Ok(ReceiveOutcome::Skipped(SkipReason::Own)),
            PeerUpdate::Stale => return Ok(ReceiveOutcome::Skipped(SkipReason::AlreadyProcessed)),
        }

        Ok(ReceiveOutcome::Delivered(ReceivedMessage { plaintext, offset, consumed, ciphertext_len }))
    }

    /// Process a relay envelope addressed to this conversation.
    ///
    /// # Errors
    ///
    /// - `UnknownConversation` if the envelope names another conversation
    /// - Anything [`Conversation::receive`] returns
    pub fn receive_envelope(
        &mut self,
        envelope: &RelayEnvelope,
    ) -> Result<ReceiveOutcome, LedgerError> {
        if envelope.conversation_id != self.tokens.conversation_id {
            return Err(LedgerError::UnknownConversation(envelope.conversation_id.clone()));
        }

        let bytes = envelope.frame_bytes().inspect_err(|e| self.log_drop(e))?;
        self.receive(&bytes)
    }

    /// Mnemonic over the full pad for ceremony verification.
    ///
    /// # Errors
    ///
    /// - `Burned` after [`Conversation::burn`]
    pub fn mnemonic(&self) -> Result<Vec<&'static str>, LedgerError> {
        if self.ledger.is_burned() {
            return Err(LedgerError::Burned);
        }
        Ok(generate_mnemonic(&self.pad, self.config.mnemonic_words)?)
    }

    /// Check words read back by the user. Always false once burned.
    pub fn verify_mnemonic<S: AsRef<str>>(&self, spoken: &[S]) -> bool {
        !self.ledger.is_burned() && verify_mnemonic(&self.pad, spoken)
    }

    /// Destroy the pad. Irreversible.
    pub fn burn(&mut self) {
        self.pad.zeroize();
        self.ledger.burn();
        info!(conversation_id = %self.tokens.conversation_id, "conversation burned");
    }

    fn region(&self) -> &[u8] {
        self.pad.get(self.config.reserved_prefix..).unwrap_or(&[])
    }

    fn log_drop(&self, err: &ProtocolError) {
        warn!(conversation_id = %self.tokens.conversation_id, kind = err.kind(), "dropped frame");
    }
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("conversation_id", &self.tokens.conversation_id)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: usize = 160;

    fn pad(region: usize) -> Vec<u8> {
        (0..PREFIX + region).map(|i| (i * 131 + 17) as u8).collect()
    }

    fn pair(region: usize) -> (Conversation, Conversation) {
        let a = Conversation::new(pad(region), Role::Initiator).unwrap();
        let b = Conversation::new(pad(region), Role::Responder).unwrap();
        (a, b)
    }

    fn delivered(outcome: ReceiveOutcome) -> ReceivedMessage {
        match outcome {
            ReceiveOutcome::Delivered(msg) => msg,
            ReceiveOutcome::Skipped(reason) => panic!("expected delivery, skipped: {reason}"),
        }
    }

    #[test]
    fn authentic_frame_over_processed_bytes_is_dropped() {
        let (mut alice, mut bob) = pair(1000);
        delivered(alice.receive(&bob.send(b"first").unwrap()).unwrap());

        // authentic under the pad, but [850, 946) reuses bytes of [904, 1000)
        let region = pad(1000);
        let forged = codec::encode(&region[PREFIX..], 850, b"again").unwrap().to_bytes();

        let before = alice.snapshot();
        let err = alice.receive(&forged).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidFormat { .. }));
        assert!(err.is_recoverable());
        assert_eq!(alice.snapshot(), before);
    }

    #[test]
    fn basic_exchange() {
        let (mut alice, mut bob) = pair(1000);

        let wire = alice.send(b"hello").unwrap();
        let msg = delivered(bob.receive(&wire).unwrap());

        assert_eq!(msg.plaintext.as_slice(), b"hello");
        assert_eq!(msg.offset, 0);
        assert_eq!(msg.ciphertext_len, 32);
        assert_eq!(msg.consumed, 96);
        assert_eq!(bob.ledger().peer_consumed(), 96);
        assert_eq!(alice.ledger().send_offset(), 96);
    }

    #[test]
    fn both_directions() {
        let (mut alice, mut bob) = pair(1000);

        let to_bob = alice.send(b"ping").unwrap();
        let to_alice = bob.send(b"pong").unwrap();

        assert_eq!(delivered(bob.receive(&to_bob).unwrap()).plaintext.as_slice(), b"ping");
        assert_eq!(delivered(alice.receive(&to_alice).unwrap()).plaintext.as_slice(), b"pong");
        assert_eq!(alice.remaining(), 1000 - 192);
        assert_eq!(bob.remaining(), 1000 - 192);
    }

    #[test]
    fn same_tokens_on_both_sides() {
        let (alice, bob) = pair(200);
        assert_eq!(alice.id(), bob.id());
        assert_eq!(alice.tokens(), bob.tokens());
        assert_eq!(alice.mnemonic().unwrap(), bob.mnemonic().unwrap());
    }

    #[test]
    fn self_echo_skipped() {
        let (mut alice, _) = pair(1000);
        let wire = alice.send(b"echo").unwrap();
        let before = alice.snapshot();

        assert_eq!(alice.receive(&wire).unwrap(), ReceiveOutcome::Skipped(SkipReason::Own));
        assert_eq!(alice.snapshot(), before);
    }

    #[test]
    fn duplicate_delivery_skipped() {
        let (mut alice, mut bob) = pair(1000);
        let wire = alice.send(b"once").unwrap();

        delivered(bob.receive(&wire).unwrap());
        let after_first = bob.snapshot();

        let second = bob.receive(&wire).unwrap();
        assert_eq!(second, ReceiveOutcome::Skipped(SkipReason::AlreadyProcessed));
        assert_eq!(SkipReason::AlreadyProcessed.to_string(), "Already processed");
        assert_eq!(bob.snapshot(), after_first);
    }

    #[test]
    fn tampered_frame_leaves_ledger_unchanged() {
        let (mut alice, mut bob) = pair(1000);
        let mut wire = alice.send(b"secret").unwrap();
        wire[20] ^= 0x01;
        let before = bob.snapshot();

        let err = bob.receive(&wire).unwrap_err();
        assert_eq!(err, LedgerError::Protocol(ProtocolError::AuthenticationFailed));
        assert!(err.is_recoverable());
        assert_eq!(bob.snapshot(), before);
    }

    #[test]
    fn garbage_is_recoverable() {
        let (_, mut bob) = pair(1000);
        let err = bob.receive(&[1, 2, 3]).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn exhaustion_is_reported() {
        let (mut alice, _) = pair(150);
        alice.send(b"fits").unwrap();

        assert_eq!(alice.state(), LedgerState::Exhausted);
        assert!(matches!(alice.send(b"x"), Err(LedgerError::PadExhausted { .. })));
    }

    #[test]
    fn oversized_message_consumes_nothing() {
        let (mut alice, _) = pair(70_000);
        let result = alice.send(&vec![0u8; 65_533]);

        assert!(matches!(result, Err(LedgerError::Protocol(ProtocolError::PayloadTooLarge { .. }))));
        assert_eq!(alice.ledger().send_offset(), 0);
    }

    #[test]
    fn burn_destroys_pad() {
        let (mut alice, mut bob) = pair(1000);
        let wire = alice.send(b"late").unwrap();
        bob.burn();

        assert_eq!(bob.state(), LedgerState::Burned);
        assert_eq!(bob.receive(&wire), Err(LedgerError::Burned));
        assert_eq!(bob.send(b"x"), Err(LedgerError::Burned));
        assert_eq!(bob.mnemonic(), Err(LedgerError::Burned));
        assert!(bob.region().is_empty());
    }

    #[test]
    fn restore_continues_where_it_left_off() {
        let (mut alice, mut bob) = pair(1000);
        delivered(bob.receive(&alice.send(b"one").unwrap()).unwrap());

        let stored = alice.snapshot().to_cbor().unwrap();
        let snapshot = LedgerSnapshot::from_cbor(&stored).unwrap();
        let mut alice =
            Conversation::restore(pad(1000), snapshot, LedgerConfig::default()).unwrap();

        let msg = delivered(bob.receive(&alice.send(b"two").unwrap()).unwrap());
        assert_eq!(msg.offset, 96);
        assert_eq!(msg.plaintext.as_slice(), b"two");
    }

    #[test]
    fn restore_rejects_mismatched_pad() {
        let (alice, _) = pair(1000);
        let result = Conversation::restore(pad(999), alice.snapshot(), LedgerConfig::default());
        assert!(matches!(result, Err(LedgerError::InvalidFormat { .. })));
    }

    #[test]
    fn restore_rejects_burned() {
        let (mut alice, _) = pair(1000);
        alice.burn();
        let result = Conversation::restore(pad(1000), alice.snapshot(), LedgerConfig::default());
        assert!(matches!(result, Err(LedgerError::Burned)));
    }

    #[test]
    fn reject_short_pad() {
        let result = Conversation::new(vec![0u8; 159], Role::Initiator);
        assert_eq!(result.unwrap_err(), LedgerError::InsufficientPadSize {
            required: 160,
            actual: 159
        });
    }

    #[test]
    fn envelope_for_other_conversation() {
        let (mut alice, mut bob) = pair(1000);
        let frame = Frame::decode(alice.send(b"hi").unwrap()).unwrap();
        let envelope = RelayEnvelope::from_frame("00".repeat(32), &frame, 0);

        assert!(matches!(
            bob.receive_envelope(&envelope),
            Err(LedgerError::UnknownConversation(_))
        ));
    }

    #[test]
    fn envelope_delivery() {
        let (mut alice, mut bob) = pair(1000);
        let frame = Frame::decode(alice.send(b"via relay").unwrap()).unwrap();
        let envelope = RelayEnvelope::from_frame(alice.id(), &frame, 1_700_000_000_000);

        let msg = delivered(bob.receive_envelope(&envelope).unwrap());
        assert_eq!(msg.plaintext.as_slice(), b"via relay");
    }

    #[test]
    fn debug_hides_pad_and_plaintext() {
        let (mut alice, mut bob) = pair(1000);
        let msg = delivered(bob.receive(&alice.send(b"top secret").unwrap()).unwrap());

        assert!(!format!("{msg:?}").contains("116")); // 't'
        assert!(format!("{alice:?}").contains(alice.id()));
        assert!(!format!("{:?}", alice.tokens()).contains(&alice.tokens().auth_token));
    }
}
