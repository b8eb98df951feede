//! Fuzz target for ledger state transitions
//!
//! # Invariants
//!
//! - Own reservations are contiguous and never leave the pad
//! - Own usage plus the peer watermark never exceeds the total
//! - Peer watermark never decreases
//! - Own offsets and stale peer offsets leave the counters untouched
//! - A peer range running into already-processed peer bytes never advances
//! - A burned ledger refuses every operation

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use padlock_core::{Ledger, LedgerError, PeerUpdate, Role};

#[derive(Debug, Arbitrary)]
enum Op {
    Reserve { cipher_len: u16 },
    Peer { offset: u32, len: u16 },
    Classify { offset: u32, len: u16 },
    Burn,
}

#[derive(Debug, Arbitrary)]
struct Input {
    responder: bool,
    total: u16,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let role = if input.responder { Role::Responder } else { Role::Initiator };
    let total = u64::from(input.total);
    let mut ledger = Ledger::new(role, total);
    let mut next_own = 0u64;

    for op in input.ops {
        let before = ledger.snapshot();

        match op {
            Op::Reserve { cipher_len } => match ledger.reserve_send(usize::from(cipher_len)) {
                Ok(reservation) => {
                    assert!(!before.burned);
                    let range = reservation.range();
                    assert!(range.end <= total);
                    assert_eq!(ledger.send_offset(), next_own + reservation.consumed());
                    match role {
                        Role::Initiator => assert_eq!(range.start, next_own),
                        Role::Responder => assert_eq!(range.end, total - next_own),
                    }
                    next_own = ledger.send_offset();
                },
                Err(LedgerError::PadExhausted { .. } | LedgerError::Burned) => {
                    assert_eq!(ledger.snapshot(), before);
                },
                Err(e) => panic!("unexpected reserve error: {e}"),
            },
            Op::Peer { offset, len } => {
                let overlaps = role.peer_range_overlaps(
                    total,
                    before.peer_consumed,
                    u64::from(offset),
                    u64::from(len),
                );
                match ledger.record_peer_consumption(u64::from(offset), u64::from(len)) {
                    Ok(PeerUpdate::Advanced { peer_consumed }) => {
                        assert!(!overlaps);
                        assert!(peer_consumed > before.peer_consumed);
                        assert_eq!(ledger.peer_consumed(), peer_consumed);
                    },
                    Ok(PeerUpdate::OwnMessage | PeerUpdate::Stale) | Err(_) => {
                        assert_eq!(ledger.snapshot(), before);
                    },
                }
            },
            Op::Classify { offset, len } => {
                let (offset, len) = (u64::from(offset), u64::from(len));
                if let Ok(class) = ledger.classify_frame(offset, len) {
                    assert_eq!(class, ledger.classify(offset));
                }
                assert_eq!(ledger.snapshot(), before);
            },
            Op::Burn => {
                ledger.burn();
                assert!(ledger.is_burned());
                assert_eq!(ledger.reserve_send(0), Err(LedgerError::Burned));
            },
        }

        assert!(ledger.send_offset() + ledger.peer_consumed() <= total);
        assert!(ledger.peer_consumed() >= before.peer_consumed);
    }
});
