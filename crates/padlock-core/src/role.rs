//! Consumption direction
//!
//! Both parties share one message region and consume it from opposite ends,
//! so neither needs to coordinate with the other before sending:
//!
//! ```text
//! 0                                                          total
//! ├── Initiator ──►                              ◄── Responder ──┤
//!     [0, send)                           [total - send, total)
//! ```

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Which end of the message region this party consumes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Consumes forward from offset 0
    Initiator,
    /// Consumes backward from the end
    Responder,
}

impl Role {
    /// The other party's role.
    #[must_use]
    pub fn peer(self) -> Self {
        match self {
            Self::Initiator => Self::Responder,
            Self::Responder => Self::Initiator,
        }
    }

    /// Range for the next `len` bytes after `send_offset` bytes have been
    /// consumed. The caller has already checked capacity.
    pub fn reserve_range(self, total: u64, send_offset: u64, len: u64) -> Range<u64> {
        match self {
            Self::Initiator => send_offset..send_offset + len,
            Self::Responder => {
                let end = total - send_offset;
                end - len..end
            },
        }
    }

    /// Whether `offset` falls in our own consumed range.
    pub fn is_own_offset(self, total: u64, send_offset: u64, offset: u64) -> bool {
        match self {
            Self::Initiator => offset < send_offset,
            Self::Responder => offset >= total.saturating_sub(send_offset),
        }
    }

    /// Peer's consumed count implied by a frame at `offset` that consumed
    /// `len` bytes. `None` if the frame cannot lie in the region.
    pub fn peer_consumed_after(self, total: u64, offset: u64, len: u64) -> Option<u64> {
        match self {
            // peer is the Responder, whose range ends where ours would begin
            Self::Initiator => total.checked_sub(offset),
            Self::Responder => offset.checked_add(len),
        }
    }

    /// Peer bytes already processed, given the peer watermark.
    pub fn peer_processed(self, total: u64, peer_consumed: u64) -> Range<u64> {
        match self {
            Self::Initiator => total.saturating_sub(peer_consumed)..total,
            Self::Responder => 0..peer_consumed,
        }
    }

    /// Whether a peer frame at `offset` lies inside what we already processed.
    pub fn is_peer_duplicate(self, total: u64, peer_consumed: u64, offset: u64) -> bool {
        self.peer_processed(total, peer_consumed).contains(&offset)
    }

    /// Whether a peer frame starting outside the processed range still runs
    /// into it.
    pub fn peer_range_overlaps(self, total: u64, peer_consumed: u64, offset: u64, len: u64) -> bool {
        let processed = self.peer_processed(total, peer_consumed);
        let end = offset.saturating_add(len);
        !processed.is_empty()
            && !processed.contains(&offset)
            && offset < processed.end
            && end > processed.start
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initiator => f.write_str("initiator"),
            Self::Responder => f.write_str("responder"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initiator_grows_forward() {
        assert_eq!(Role::Initiator.reserve_range(1000, 0, 96), 0..96);
        assert_eq!(Role::Initiator.reserve_range(1000, 96, 100), 96..196);
    }

    #[test]
    fn responder_grows_backward() {
        assert_eq!(Role::Responder.reserve_range(1000, 0, 96), 904..1000);
        assert_eq!(Role::Responder.reserve_range(1000, 96, 100), 804..904);
    }

    #[test]
    fn own_offsets() {
        assert!(Role::Initiator.is_own_offset(1000, 50, 10));
        assert!(!Role::Initiator.is_own_offset(1000, 50, 50));
        assert!(Role::Responder.is_own_offset(1000, 96, 904));
        assert!(!Role::Responder.is_own_offset(1000, 96, 903));
    }

    #[test]
    fn fresh_responder_owns_nothing() {
        assert!(!Role::Responder.is_own_offset(1000, 0, 999));
    }

    #[test]
    fn peer_consumed_mirrors_reservation() {
        // Responder frame at 904 consumed [904, 1000)
        assert_eq!(Role::Initiator.peer_consumed_after(1000, 904, 96), Some(96));
        // Initiator frame at 0 consumed [0, 96)
        assert_eq!(Role::Responder.peer_consumed_after(1000, 0, 96), Some(96));
        assert_eq!(Role::Initiator.peer_consumed_after(1000, 1001, 96), None);
    }

    #[test]
    fn duplicates() {
        assert!(Role::Initiator.is_peer_duplicate(1000, 96, 904));
        assert!(!Role::Initiator.is_peer_duplicate(1000, 96, 808));
        assert!(Role::Responder.is_peer_duplicate(1000, 96, 0));
        assert!(!Role::Responder.is_peer_duplicate(1000, 96, 96));
    }

    #[test]
    fn partial_overlap_with_processed_range() {
        // Initiator processed [904, 1000); [850, 946) runs into it
        assert!(Role::Initiator.peer_range_overlaps(1000, 96, 850, 96));
        assert!(!Role::Initiator.peer_range_overlaps(1000, 96, 808, 96));
        assert!(!Role::Initiator.peer_range_overlaps(1000, 96, 904, 96));
        assert!(!Role::Initiator.peer_range_overlaps(1000, 0, 904, 96));

        // Responder processed [0, 96); anything starting at 96 or later is clear
        assert!(!Role::Responder.peer_range_overlaps(1000, 96, 96, 96));
        assert!(!Role::Responder.peer_range_overlaps(1000, 96, 50, 96));
    }

    #[test]
    fn peers() {
        assert_eq!(Role::Initiator.peer(), Role::Responder);
        assert_eq!(Role::Responder.peer(), Role::Initiator);
        assert_eq!(Role::Responder.to_string(), "responder");
    }
}
