//! Pair records and the order in which they are offered

use std::cmp::Ordering;
use std::collections::VecDeque;

use super::exemptions::ShapePair;

/// Tier given to ordinary pairs
pub const DEFAULT_TIER: u16 = 1;

/// Outcome of the last commit for a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Unprocessed,
    Satisfied,
    Unsatisfied,
}

/// Working record for one candidate pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairRecord {
    pub pair: ShapePair,
    /// Priority bucket; lower tiers are offered first
    pub tier: u16,
    pub processed: bool,
    /// Whether the constraint emitted for this pair was accepted
    pub satisfied: bool,
    /// Last computed overlap severity
    pub severity: f64,
}

impl PairRecord {
    pub fn new(pair: ShapePair, tier: u16) -> Self {
        Self {
            pair,
            tier,
            processed: false,
            satisfied: false,
            severity: 0.0,
        }
    }

    pub fn state(&self) -> PairState {
        match (self.processed, self.satisfied) {
            (false, _) => PairState::Unprocessed,
            (true, true) => PairState::Satisfied,
            (true, false) => PairState::Unsatisfied,
        }
    }

    pub fn is_overlapping(&self) -> bool {
        self.severity > 0.0
    }

    /// Offer order: unprocessed before processed, overlapping before
    /// clear, then lower tier, then higher severity.
    ///
    /// Clear pairs carry no constraint, so letting them trail the
    /// overlapping ones keeps a clear low-tier pair from hiding an overlap
    /// in a later tier.
    pub fn rank_cmp(&self, other: &PairRecord) -> Ordering {
        self.processed
            .cmp(&other.processed)
            .then_with(|| other.is_overlapping().cmp(&self.is_overlapping()))
            .then_with(|| self.tier.cmp(&other.tier))
            .then_with(|| other.severity.total_cmp(&self.severity))
    }
}

/// Lazy sorting state of the pair list within one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortState {
    /// No severities computed since the last reset
    #[default]
    Uncomputed,
    /// Severities fresh and list in rank order
    Sorted,
    /// A commit rotated the list; only the front is re-evaluated
    Stale,
    /// The sorted front shows no overlap; nothing left this pass
    Exhausted,
}

/// Stable sort of the records into offer order
pub fn sort_records(records: &mut VecDeque<PairRecord>) {
    records.make_contiguous().sort_by(PairRecord::rank_cmp);
}
