//! Unit cost of a stock record.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Unit cost with the "free" and "unresolved" cases kept apart.
///
/// Feeds report `0.0` both for in-house stock and for rows whose cost never
/// resolved. Those mean opposite things when choosing a supplier, so they are
/// distinct variants here.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "lowercase")]
pub enum Cost {
    /// No marginal cost (in-house stock).
    Free,
    /// A resolved, non-zero supplier cost.
    Known(f64),
    /// Reported as zero by the supplier feed; the real cost is not known.
    Unknown,
}

impl Cost {
    /// Interpret a cost read from a vendor feed: exactly `0.0` is unresolved.
    pub fn from_feed(amount: f64) -> Self {
        if amount == 0.0 {
            Cost::Unknown
        } else {
            Cost::Known(amount)
        }
    }

    /// Monetary amount; unresolved costs report `0.0`.
    pub fn amount(&self) -> f64 {
        match self {
            Cost::Known(amount) => *amount,
            Cost::Free | Cost::Unknown => 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Cost::Unknown)
    }

    /// Add a delta to a known cost. Free and unresolved costs are left alone,
    /// and a known cost adjusted down to exactly zero becomes unresolved.
    pub fn adjusted(self, delta: f64) -> Self {
        match self {
            Cost::Known(amount) => Cost::from_feed(amount + delta),
            other => other,
        }
    }

    /// Allocation order: free first, then known costs ascending, unresolved last.
    pub fn allocation_cmp(&self, other: &Cost) -> Ordering {
        match (self, other) {
            (Cost::Known(a), Cost::Known(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Cost::Free => 0,
            Cost::Known(_) => 1,
            Cost::Unknown => 2,
        }
    }
}

impl core::fmt::Display for Cost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Cost::Free => f.write_str("free"),
            Cost::Known(amount) => write!(f, "{amount:.2}"),
            Cost::Unknown => f.write_str("unknown"),
        }
    }
}
