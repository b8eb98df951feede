//! Deterministic simulation harness for padlock conversations.
//!
//! # Invariant Testing
//!
//! The `invariants` module checks behavioral properties of the consumption
//! ledgers (no byte consumed twice, one-directional growth, capacity bounds)
//! against snapshots of both parties. [`RangeAudit`] tracks every reserved
//! range as it is handed out.
//!
//! # Simulation
//!
//! [`Simulation`] runs two parties over a seeded, faulty relay and fails with
//! a [`Violation`] naming the seed and step as soon as anything breaks.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod invariants;
pub mod sim;

pub use invariants::{
    CapacityBound, Invariant, InvariantRegistry, InvariantResult, NoRangeOverlap, PartySnapshot,
    PeerViewBounded, RangeAudit, RangeMonotonicity, SystemSnapshot, Violation,
};
pub use sim::{SimConfig, SimStats, Simulation};
