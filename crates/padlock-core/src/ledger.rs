//! Pad consumption ledger
//!
//! Tracks which bytes of the shared message region each party has consumed.
//! This is the only component that hands out key material positions, and the
//! only place where pad reuse could be introduced.
//!
//! # State machine
//!
//! ```text
//! Active ──(remaining < min frame)──► Exhausted
//!    │                                    │
//!    └──────────────(burn)────────────────┴──► Burned
//! ```
//!
//! # Invariants
//!
//! - `send_offset + peer_consumed <= total` at all times
//! - `send_offset` only grows, and the counter is committed before the
//!   reserved range is returned
//! - `peer_consumed` only grows
//! - Once burned, every operation fails with `Burned`

use std::ops::Range;

use padlock_crypto::AUTH_KEY_SIZE;
use padlock_proto::KeySlices;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{config::LedgerConfig, error::LedgerError, role::Role};

/// Lifecycle state derived from the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    /// Enough capacity for at least one minimum-size frame
    Active,
    /// Capacity below one minimum-size frame
    Exhausted,
    /// Terminal
    Burned,
}

/// A committed range of the message region for one outgoing frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    /// Start of the range; written into the frame header
    pub offset: u64,
    /// Ciphertext length the range was sized for
    pub cipher_len: usize,
}

impl Reservation {
    /// Cipher and auth key slices of this reservation
    #[must_use]
    pub fn slices(&self) -> KeySlices {
        KeySlices::for_frame(self.offset, self.cipher_len)
    }

    /// Total bytes consumed (ciphertext plus auth key)
    #[must_use]
    pub fn consumed(&self) -> u64 {
        self.cipher_len.saturating_add(AUTH_KEY_SIZE) as u64
    }

    /// The consumed byte range
    #[must_use]
    pub fn range(&self) -> Range<u64> {
        self.offset..self.offset + self.consumed()
    }
}

/// Result of observing a peer frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerUpdate {
    /// Offset lies in our own range (relay echoed our frame); nothing changed
    OwnMessage,
    /// Already covered by the watermark; nothing changed
    Stale,
    /// Watermark moved
    Advanced {
        /// New peer consumed count
        peer_consumed: u64,
    },
}

/// How an incoming frame offset relates to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// One of our own frames
    Own,
    /// A peer frame already processed
    Duplicate,
    /// A peer frame beyond the watermark
    New,
}

/// Persisted counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Our role
    pub role: Role,
    /// Message region size
    pub total: u64,
    /// Bytes we have consumed
    pub send_offset: u64,
    /// Bytes the peer has consumed, as far as we have seen
    pub peer_consumed: u64,
    /// Whether the conversation was burned
    pub burned: bool,
}

impl LedgerSnapshot {
    /// Encode as CBOR.
    ///
    /// # Errors
    ///
    /// - `Snapshot` if serialization fails
    pub fn to_cbor(&self) -> Result<Vec<u8>, LedgerError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from CBOR.
    ///
    /// # Errors
    ///
    /// - `Snapshot` if the bytes are not a valid snapshot
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, LedgerError> {
        ciborium::from_reader(bytes).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }
}

/// Per-conversation consumption counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    role: Role,
    total: u64,
    send_offset: u64,
    peer_consumed: u64,
    burned: bool,
    min_frame_consumption: u64,
}

impl Ledger {
    /// Fresh ledger over a message region of `total` bytes.
    pub fn new(role: Role, total: u64) -> Self {
        Self::with_config(role, total, &LedgerConfig::default())
    }

    /// Fresh ledger using `config`'s exhaustion threshold.
    pub fn with_config(role: Role, total: u64, config: &LedgerConfig) -> Self {
        Self {
            role,
            total,
            send_offset: 0,
            peer_consumed: 0,
            burned: false,
            min_frame_consumption: config.min_frame_consumption,
        }
    }

    /// Rebuild a ledger from stored counters.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the counters overlap
    pub fn restore(snapshot: LedgerSnapshot, config: &LedgerConfig) -> Result<Self, LedgerError> {
        let used = snapshot.send_offset.checked_add(snapshot.peer_consumed);
        if used.is_none_or(|used| used > snapshot.total) {
            return Err(LedgerError::InvalidFormat { reason: "snapshot counters exceed pad" });
        }

        Ok(Self {
            role: snapshot.role,
            total: snapshot.total,
            send_offset: snapshot.send_offset,
            peer_consumed: snapshot.peer_consumed,
            burned: snapshot.burned,
            min_frame_consumption: config.min_frame_consumption,
        })
    }

    /// Current counters for persistence.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            role: self.role,
            total: self.total,
            send_offset: self.send_offset,
            peer_consumed: self.peer_consumed,
            burned: self.burned,
        }
    }

    /// Our role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Message region size.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Bytes we have consumed.
    pub fn send_offset(&self) -> u64 {
        self.send_offset
    }

    /// Bytes the peer has consumed, as observed.
    pub fn peer_consumed(&self) -> u64 {
        self.peer_consumed
    }

    /// Bytes neither party has consumed.
    pub fn remaining(&self) -> u64 {
        self.total.saturating_sub(self.send_offset + self.peer_consumed)
    }

    /// Lifecycle state.
    pub fn state(&self) -> LedgerState {
        if self.burned {
            LedgerState::Burned
        } else if self.remaining() < self.min_frame_consumption {
            LedgerState::Exhausted
        } else {
            LedgerState::Active
        }
    }

    /// Reserve the range for a frame with `cipher_len` ciphertext bytes.
    ///
    /// The send counter is advanced before returning, so the range is never
    /// handed out twice even if the caller fails to send.
    ///
    /// # Errors
    ///
    /// - `Burned` after [`Ledger::burn`]
    /// - `PadExhausted` if fewer than `cipher_len + 64` bytes remain, or the
    ///   ledger is already exhausted
    pub fn reserve_send(&mut self, cipher_len: usize) -> Result<Reservation, LedgerError> {
        let remaining = self.remaining();
        let consumed = cipher_len
            .checked_add(AUTH_KEY_SIZE)
            .map_or(u64::MAX, |len| len as u64);

        match self.state() {
            LedgerState::Burned => return Err(LedgerError::Burned),
            LedgerState::Exhausted => {
                return Err(LedgerError::PadExhausted { requested: consumed, remaining });
            },
            LedgerState::Active if remaining < consumed => {
                return Err(LedgerError::PadExhausted { requested: consumed, remaining });
            },
            LedgerState::Active => {},
        }

        let range = self.role.reserve_range(self.total, self.send_offset, consumed);
        self.send_offset += consumed;

        debug_assert!(self.send_offset + self.peer_consumed <= self.total);
        debug!(
            role = %self.role,
            offset = range.start,
            len = consumed,
            remaining = self.remaining(),
            "reserved pad range"
        );

        if self.state() == LedgerState::Exhausted {
            info!(role = %self.role, remaining = self.remaining(), "pad exhausted");
        }

        Ok(Reservation { offset: range.start, cipher_len })
    }

    /// Record that the peer consumed `len` bytes starting at `offset`.
    ///
    /// `len` is the full consumption of the frame: ciphertext plus auth key.
    ///
    /// # Errors
    ///
    /// - `Burned` after [`Ledger::burn`]
    /// - `InvalidFormat` if the frame claims bytes outside the region or
    ///   bytes we already used for our own sends
    pub fn record_peer_consumption(
        &mut self,
        offset: u64,
        len: u64,
    ) -> Result<PeerUpdate, LedgerError> {
        if self.burned {
            return Err(LedgerError::Burned);
        }

        if self.role.is_own_offset(self.total, self.send_offset, offset) {
            return Ok(PeerUpdate::OwnMessage);
        }

        let candidate = self
            .role
            .peer_consumed_after(self.total, offset, len)
            .ok_or(LedgerError::InvalidFormat { reason: "peer offset outside pad" })?;

        if self.role.peer_range_overlaps(self.total, self.peer_consumed, offset, len) {
            return Err(LedgerError::InvalidFormat { reason: "peer range overlaps processed frames" });
        }

        if candidate <= self.peer_consumed {
            return Ok(PeerUpdate::Stale);
        }

        if self.send_offset.checked_add(candidate).is_none_or(|used| used > self.total) {
            return Err(LedgerError::InvalidFormat { reason: "peer range overlaps own sends" });
        }

        self.peer_consumed = candidate;
        debug!(
            role = %self.role,
            offset,
            len,
            peer_consumed = candidate,
            remaining = self.remaining(),
            "peer consumption advanced"
        );

        Ok(PeerUpdate::Advanced { peer_consumed: candidate })
    }

    /// Whether a peer frame at `offset` was already processed.
    pub fn is_duplicate(&self, offset: u64) -> bool {
        self.role.is_peer_duplicate(self.total, self.peer_consumed, offset)
    }

    /// Classify an incoming frame by its full range.
    ///
    /// Same as [`Ledger::classify`], but a new frame whose `len` bytes run
    /// into already-processed peer bytes is refused before anything is
    /// decrypted with them.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the range partially overlaps processed peer bytes
    pub fn classify_frame(&self, offset: u64, len: u64) -> Result<Classification, LedgerError> {
        match self.classify(offset) {
            Classification::New
                if self.role.peer_range_overlaps(self.total, self.peer_consumed, offset, len) =>
            {
                Err(LedgerError::InvalidFormat { reason: "peer range overlaps processed frames" })
            },
            class => Ok(class),
        }
    }

    /// Classify an incoming frame offset.
    pub fn classify(&self, offset: u64) -> Classification {
        if self.role.is_own_offset(self.total, self.send_offset, offset) {
            Classification::Own
        } else if self.is_duplicate(offset) {
            Classification::Duplicate
        } else {
            Classification::New
        }
    }

    /// Mark the ledger burned. Idempotent.
    pub fn burn(&mut self) {
        if !self.burned {
            info!(role = %self.role, send_offset = self.send_offset, "ledger burned");
        }
        self.burned = true;
    }

    /// Whether [`Ledger::burn`] was called.
    pub fn is_burned(&self) -> bool {
        self.burned
    }
}
