//! Pad consumption invariants.
//!
//! Two complementary tools:
//!
//! - [`InvariantRegistry`] runs stateless checks over a [`SystemSnapshot`]
//!   of both ledgers: counters, reserved ranges and observed peer
//!   watermarks.
//! - [`RangeAudit`] is fed each range the moment it is reserved and refuses
//!   any byte handed out twice, by either party.
//!
//! ```ignore
//! let checks = InvariantRegistry::standard();
//! checks.check_all(&SystemSnapshot::from_parties(vec![alice, bob]))?;
//! ```

mod audit;
mod checks;
mod snapshot;

use std::fmt;

pub use audit::RangeAudit;
pub use checks::{CapacityBound, NoRangeOverlap, PeerViewBounded, RangeMonotonicity};
pub use snapshot::{PartySnapshot, SystemSnapshot};

/// Outcome of one invariant check
pub type InvariantResult = Result<(), Violation>;

/// A broken invariant, or a simulation step that went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Which check failed
    pub invariant: &'static str,
    /// Offsets and counters involved
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.invariant, self.message)
    }
}

impl std::error::Error for Violation {}

/// A property of both ledgers that no sequence of sends and receives may
/// break.
pub trait Invariant: Send + Sync {
    /// Short name used in [`Violation::invariant`].
    fn name(&self) -> &'static str;

    /// Inspect the snapshot.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Ordered set of invariants run together
#[derive(Default)]
pub struct InvariantRegistry {
    checks: Vec<Box<dyn Invariant>>,
}

impl InvariantRegistry {
    /// No checks registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlap, monotonicity, capacity and peer-view checks.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.add(NoRangeOverlap);
        registry.add(RangeMonotonicity);
        registry.add(CapacityBound);
        registry.add(PeerViewBounded);
        registry
    }

    /// Register another check; it runs after the existing ones.
    pub fn add<I: Invariant + 'static>(&mut self, invariant: I) {
        self.checks.push(Box::new(invariant));
    }

    /// Run every check and collect all failures, in registration order.
    pub fn check_all(&self, state: &SystemSnapshot) -> Result<(), Vec<Violation>> {
        let failures: Vec<Violation> =
            self.checks.iter().filter_map(|check| check.check(state).err()).collect();

        if failures.is_empty() { Ok(()) } else { Err(failures) }
    }

    /// Names of the registered checks.
    pub fn names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|check| check.name()).collect()
    }

    /// Registered check count.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}
