//! Standard invariant checks.
//!
//! These invariants capture what must hold for every conversation, whatever
//! order frames arrive in.

use padlock_core::Role;

use super::{Invariant, InvariantResult, SystemSnapshot, Violation};

/// No pad byte is consumed by two reservations.
///
/// Checked across all ranges of all parties. Overlap means two frames were
/// encrypted with the same key bytes.
pub struct NoRangeOverlap;

impl Invariant for NoRangeOverlap {
    fn name(&self) -> &'static str {
        "NoRangeOverlap"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let mut all: Vec<_> = state
            .parties
            .iter()
            .flat_map(|p| p.ranges.iter().map(move |r| (p.counters.role, r.clone())))
            .collect();
        all.sort_by_key(|(_, r)| r.start);

        for pair in all.windows(2) {
            let (role_a, a) = &pair[0];
            let (role_b, b) = &pair[1];
            if b.start < a.end {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("{role_a} range {a:?} overlaps {role_b} range {b:?}"),
                });
            }
        }
        Ok(())
    }
}

/// Each role consumes in one direction without gaps.
///
/// The Initiator's ranges move forward from 0, the Responder's backward from
/// the end of the region.
pub struct RangeMonotonicity;

impl Invariant for RangeMonotonicity {
    fn name(&self) -> &'static str {
        "RangeMonotonicity"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for party in &state.parties {
            let role = party.counters.role;
            for w in party.ranges.windows(2) {
                let contiguous = match role {
                    Role::Initiator => w[1].start == w[0].end,
                    Role::Responder => w[1].end == w[0].start,
                };
                if !contiguous {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("{role}: {:?} does not follow {:?}", w[1], w[0]),
                    });
                }
            }

            if let Some(h) = party.peer_history.windows(2).find(|h| h[1] < h[0]) {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!("{role}: peer_consumed decreased {} → {}", h[0], h[1]),
                });
            }
        }
        Ok(())
    }
}

/// Counters never claim more than the region holds.
pub struct CapacityBound;

impl Invariant for CapacityBound {
    fn name(&self) -> &'static str {
        "CapacityBound"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for party in &state.parties {
            let c = &party.counters;
            if c.send_offset + c.peer_consumed > c.total {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "{}: send {} + peer {} exceeds total {}",
                        c.role, c.send_offset, c.peer_consumed, c.total
                    ),
                });
            }

            let reserved: u64 = party.ranges.iter().map(|r| r.end - r.start).sum();
            if !party.ranges.is_empty() && reserved != c.send_offset {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "{}: ranges cover {reserved} bytes but send_offset is {}",
                        c.role, c.send_offset
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A party never believes its peer consumed more than the peer actually did.
pub struct PeerViewBounded;

impl Invariant for PeerViewBounded {
    fn name(&self) -> &'static str {
        "PeerViewBounded"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let (Some(init), Some(resp)) =
            (state.party(Role::Initiator), state.party(Role::Responder))
        else {
            return Ok(());
        };

        for (viewer, peer) in [(init, resp), (resp, init)] {
            if viewer.counters.peer_consumed > peer.counters.send_offset {
                return Err(Violation {
                    invariant: self.name(),
                    message: format!(
                        "{} sees peer_consumed {} but {} sent {}",
                        viewer.counters.role,
                        viewer.counters.peer_consumed,
                        peer.counters.role,
                        peer.counters.send_offset
                    ),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use padlock_core::LedgerSnapshot;

    use super::*;
    use crate::invariants::PartySnapshot;

    fn counters(role: Role, send_offset: u64, peer_consumed: u64) -> LedgerSnapshot {
        LedgerSnapshot { role, total: 1000, send_offset, peer_consumed, burned: false }
    }

    #[test]
    fn detects_cross_role_overlap() {
        let state = SystemSnapshot::from_parties(vec![
            PartySnapshot::new(counters(Role::Initiator, 600, 0)).with_ranges(vec![0..600]),
            PartySnapshot::new(counters(Role::Responder, 500, 0)).with_ranges(vec![500..1000]),
        ]);
        assert!(NoRangeOverlap.check(&state).is_err());
    }

    #[test]
    fn adjacent_ranges_pass() {
        let state = SystemSnapshot::from_parties(vec![
            PartySnapshot::new(counters(Role::Initiator, 500, 500)).with_ranges(vec![0..96, 96..500]),
            PartySnapshot::new(counters(Role::Responder, 500, 500)).with_ranges(vec![500..1000]),
        ]);
        assert!(NoRangeOverlap.check(&state).is_ok());
        assert!(RangeMonotonicity.check(&state).is_ok());
        assert!(CapacityBound.check(&state).is_ok());
        assert!(PeerViewBounded.check(&state).is_ok());
    }

    #[test]
    fn detects_gap_in_responder_ranges() {
        let state = SystemSnapshot::from_parties(vec![
            PartySnapshot::new(counters(Role::Responder, 192, 0))
                .with_ranges(vec![904..1000, 700..796]),
        ]);
        assert!(RangeMonotonicity.check(&state).is_err());
    }

    #[test]
    fn detects_decreasing_watermark() {
        let state = SystemSnapshot::from_parties(vec![
            PartySnapshot::new(counters(Role::Responder, 0, 96)).with_peer_history(vec![96, 0]),
        ]);
        assert!(RangeMonotonicity.check(&state).is_err());
    }

    #[test]
    fn detects_capacity_overrun() {
        let state = SystemSnapshot::from_parties(vec![PartySnapshot::new(counters(
            Role::Initiator,
            600,
            500,
        ))]);
        assert!(CapacityBound.check(&state).is_err());
    }

    #[test]
    fn detects_overestimated_peer() {
        let state = SystemSnapshot::from_parties(vec![
            PartySnapshot::new(counters(Role::Initiator, 0, 192)),
            PartySnapshot::new(counters(Role::Responder, 96, 0)),
        ]);
        assert!(PeerViewBounded.check(&state).is_err());
    }
}
