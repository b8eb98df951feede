//! Observable state snapshots for invariant checking.
//!
//! Snapshots capture ledger counters and reserved ranges at a point in time.
//! Invariants operate on snapshots rather than live conversations so checks
//! never hold a conversation lock.

use std::ops::Range;

use padlock_core::{Conversation, LedgerSnapshot, Role};

/// Snapshot of both parties of a conversation.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// Per-party state snapshots.
    pub parties: Vec<PartySnapshot>,
}

impl SystemSnapshot {
    /// Create an empty snapshot (no parties).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a snapshot from several parties.
    pub fn from_parties(parties: Vec<PartySnapshot>) -> Self {
        Self { parties }
    }

    /// Add a party snapshot.
    pub fn add_party(&mut self, party: PartySnapshot) {
        self.parties.push(party);
    }

    /// The party playing `role`, if present.
    pub fn party(&self, role: Role) -> Option<&PartySnapshot> {
        self.parties.iter().find(|p| p.counters.role == role)
    }
}

/// Snapshot of one party's observable state.
#[derive(Debug, Clone)]
pub struct PartySnapshot {
    /// Ledger counters.
    pub counters: LedgerSnapshot,
    /// Ranges this party reserved, in reservation order.
    pub ranges: Vec<Range<u64>>,
    /// Every `peer_consumed` value observed, in order.
    pub peer_history: Vec<u64>,
}

impl PartySnapshot {
    /// Snapshot with counters only.
    pub fn new(counters: LedgerSnapshot) -> Self {
        Self { counters, ranges: Vec::new(), peer_history: Vec::new() }
    }

    /// Snapshot the counters of a live conversation.
    pub fn of(conversation: &Conversation) -> Self {
        Self::new(conversation.snapshot())
    }

    /// Attach reserved ranges.
    pub fn with_ranges(mut self, ranges: Vec<Range<u64>>) -> Self {
        self.ranges = ranges;
        self
    }

    /// Attach the observed peer watermark history.
    pub fn with_peer_history(mut self, history: Vec<u64>) -> Self {
        self.peer_history = history;
        self
    }
}
