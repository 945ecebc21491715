//! Item outcome definitions for tracking what happened to each work item

use std::fmt;
use std::ops::AddAssign;

/// What a stage did with one item it pulled from its input queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOutcome {
    // ===== Forwarded =====
    /// Candidate satisfied the predicate and moved on to extraction
    Passed,

    /// Passed item produced a record
    Extracted,

    // ===== Resolved without forwarding =====
    /// Candidate content did not satisfy the predicate
    Rejected,

    /// Service answered with a throttling signal; item dropped after cooldown
    Throttled,

    /// Connection, timeout or HTTP failure; item dropped
    NetworkError,
}

impl ItemOutcome {
    /// Returns true if the item was handed to the next queue
    pub fn is_forwarded(&self) -> bool {
        matches!(self, Self::Passed | Self::Extracted)
    }

    /// Returns true if the item was lost to a fetch failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Throttled | Self::NetworkError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Extracted => "extracted",
            Self::Rejected => "rejected",
            Self::Throttled => "throttled",
            Self::NetworkError => "network_error",
        }
    }
}

impl fmt::Display for ItemOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-worker (and, once merged, per-stage) outcome counts
///
/// Each worker owns its tally; tallies are summed when the pool's
/// completion barrier is reached, so no counter is shared between workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageTally {
    pub passed: u64,
    pub extracted: u64,
    pub rejected: u64,
    pub throttled: u64,
    pub network_errors: u64,
    /// Forwarded items the next queue refused because it was closed
    pub undelivered: u64,
}

impl StageTally {
    pub fn record(&mut self, outcome: ItemOutcome) {
        match outcome {
            ItemOutcome::Passed => self.passed += 1,
            ItemOutcome::Extracted => self.extracted += 1,
            ItemOutcome::Rejected => self.rejected += 1,
            ItemOutcome::Throttled => self.throttled += 1,
            ItemOutcome::NetworkError => self.network_errors += 1,
        }
    }

    /// Number of items this stage pulled from its input queue
    pub fn processed(&self) -> u64 {
        self.passed + self.extracted + self.rejected + self.throttled + self.network_errors
    }

    /// Items lost to fetch failures
    pub fn failures(&self) -> u64 {
        self.throttled + self.network_errors
    }
}

impl AddAssign for StageTally {
    fn add_assign(&mut self, other: Self) {
        self.passed += other.passed;
        self.extracted += other.extracted;
        self.rejected += other.rejected;
        self.throttled += other.throttled;
        self.network_errors += other.network_errors;
        self.undelivered += other.undelivered;
    }
}
