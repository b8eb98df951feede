//! Pad reuse audit.
//!
//! Records every consumed range, from either party, as it is observed and
//! fails on the first byte claimed twice.

use std::{collections::BTreeMap, ops::Range};

use padlock_core::Role;

use super::{InvariantResult, Violation};

/// Every range consumed so far, keyed by start offset.
#[derive(Debug, Clone, Default)]
pub struct RangeAudit {
    ranges: BTreeMap<u64, (u64, Role)>,
    total: u64,
}

impl RangeAudit {
    /// Empty audit over a message region of `total` bytes.
    pub fn new(total: u64) -> Self {
        Self { ranges: BTreeMap::new(), total }
    }

    /// Record a range consumed by `role`.
    ///
    /// Fails if the range is empty, leaves the region, or touches any
    /// previously recorded byte.
    pub fn record(&mut self, role: Role, range: Range<u64>) -> InvariantResult {
        let violation = |message: String| Violation { invariant: "RangeAudit", message };

        if range.start >= range.end || range.end > self.total {
            return Err(violation(format!("{role} range {range:?} invalid for total {}", self.total)));
        }

        // nearest range starting at or before ours
        if let Some((&start, &(end, owner))) = self.ranges.range(..=range.start).next_back() {
            if end > range.start {
                return Err(violation(format!(
                    "{role} range {range:?} overlaps {owner} range {:?}",
                    start..end
                )));
            }
        }

        // nearest range starting after ours
        if let Some((&start, &(end, owner))) = self.ranges.range(range.start + 1..).next() {
            if start < range.end {
                return Err(violation(format!(
                    "{role} range {range:?} overlaps {owner} range {:?}",
                    start..end
                )));
            }
        }

        self.ranges.insert(range.start, (range.end, role));
        Ok(())
    }

    /// Ranges recorded for `role`, ordered by offset.
    pub fn ranges(&self, role: Role) -> Vec<Range<u64>> {
        self.ranges
            .iter()
            .filter(|(_, (_, owner))| *owner == role)
            .map(|(&start, &(end, _))| start..end)
            .collect()
    }

    /// Bytes recorded across both roles.
    pub fn consumed(&self) -> u64 {
        self.ranges.iter().map(|(start, (end, _))| end - start).sum()
    }

    /// Number of recorded ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
