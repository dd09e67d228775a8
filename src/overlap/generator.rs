//! Incremental non-overlap constraint generation
//!
//! [`NonOverlapConstraints`] keeps one [`PairRecord`] per pair of
//! same-group participants and exposes them to an outer solver loop one at
//! a time, worst overlap first:
//!
//! 1. `remaining_count()` tells the loop whether anything is left,
//! 2. `alternatives()` proposes up to four separation constraints for the
//!    current worst pair, each with a displacement cost,
//! 3. the loop tries them cheapest-first against its solver and reports
//!    the outcome through `commit_front()`,
//! 4. `reset_all()` starts the next pass.
//!
//! `emit_all_as_constraints()` is a separate one-shot pass that turns every
//! overlapping pair into a single constraint.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use tracing::{debug, trace};

use super::config::OverlapConfig;
use super::evaluator::overlap_severity;
use super::exemptions::{ExemptionRegistry, ShapePair};
use super::geometry::{ClusterBoundary, GroupId, ParticipantGeometry};
use super::hint::{AllDirections, Direction, DirectionalHint, Directions};
use super::ranking::{sort_records, PairRecord, SortState};
use super::types::{Dim, Rect, SeparationConstraint, Variables};

/// One candidate way of separating the front pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alternative {
    pub direction: Direction,
    pub constraint: SeparationConstraint,
    /// Displacement cost; lower is preferable
    pub cost: f64,
}

impl Alternative {
    pub fn dim(&self) -> Dim {
        self.constraint.dim
    }
}

/// Generator of non-overlap separation constraints.
///
/// Participant ids double as indices into the solver's [`Variables`];
/// the generator never owns those variables, so the variable arena passed
/// to `alternatives()` must be the one the participants were registered
/// against.
pub struct NonOverlapConstraints<'a> {
    config: OverlapConfig,
    exemptions: Option<&'a ExemptionRegistry>,
    hint: Box<dyn DirectionalHint + 'a>,
    shapes: BTreeMap<usize, ParticipantGeometry>,
    records: VecDeque<PairRecord>,
    sort_state: SortState,
}

impl<'a> NonOverlapConstraints<'a> {
    pub fn new(exemptions: Option<&'a ExemptionRegistry>, config: OverlapConfig) -> Self {
        Self {
            config,
            exemptions,
            hint: Box::new(AllDirections),
            shapes: BTreeMap::new(),
            records: VecDeque::new(),
            sort_state: SortState::Uncomputed,
        }
    }

    /// Replace the directional hint used when proposing alternatives
    pub fn with_hint(mut self, hint: impl DirectionalHint + 'a) -> Self {
        self.hint = Box::new(hint);
        self
    }

    pub fn config(&self) -> &OverlapConfig {
        &self.config
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register a rectangle centred on variable `id`.
    ///
    /// Pairs it with every registered participant of the same group,
    /// skipping exempt leaf pairs. Panics if `id` is already taken.
    pub fn register_leaf(&mut self, id: usize, half_width: f64, half_height: f64, group: GroupId) {
        self.add_participant(ParticipantGeometry::leaf(id, half_width, half_height, group));
    }

    /// Register a cluster boundary. Clusters pair with every same-group
    /// participant regardless of exemptions.
    pub fn register_cluster(&mut self, cluster: &ClusterBoundary, group: GroupId) {
        self.add_participant(ParticipantGeometry::cluster(cluster, group));
    }

    fn add_participant(&mut self, shape: ParticipantGeometry) {
        for other in self.shapes.values() {
            let clash = shape
                .occupied_vars()
                .any(|v| other.occupied_vars().contains(&v));
            assert!(
                !clash,
                "participant {} overlaps the variables of participant {}; ids must be unique",
                shape.id, other.id
            );

            if other.group != shape.group {
                continue;
            }
            let exemption_applies = !shape.is_cluster && !other.is_cluster;
            if exemption_applies
                && self
                    .exemptions
                    .is_some_and(|ex| ex.is_exempt(other.id, shape.id))
            {
                trace!(a = other.id, b = shape.id, "pair exempt from non-overlap");
                continue;
            }

            let tier = if shape.is_cluster || other.is_cluster {
                self.config.cluster_tier
            } else {
                self.config.default_tier
            };
            let pair = ShapePair::new(other.id, shape.id);
            debug!(a = pair.first(), b = pair.second(), tier, "non-overlap pair created");
            // Processed records stay behind every unprocessed one
            let at = self
                .records
                .iter()
                .position(|r| r.processed)
                .unwrap_or(self.records.len());
            self.records.insert(at, PairRecord::new(pair, tier));
        }

        self.shapes.insert(shape.id, shape);
        self.sort_state = SortState::Uncomputed;
    }

    /// Override the tier of an existing pair. Returns false if the two
    /// participants are not paired.
    pub fn set_pair_tier(&mut self, a: usize, b: usize, tier: u16) -> bool {
        let pair = ShapePair::new(a, b);
        match self.records.iter_mut().find(|r| r.pair == pair) {
            Some(record) => {
                record.tier = tier;
                self.sort_state = SortState::Uncomputed;
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn participant(&self, id: usize) -> Option<&ParticipantGeometry> {
        self.shapes.get(&id)
    }

    pub fn participant_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn pair_count(&self) -> usize {
        self.records.len()
    }

    /// Pair records in current list order
    pub fn pair_records(&self) -> impl Iterator<Item = &PairRecord> {
        self.records.iter()
    }

    /// The record that the next `alternatives()` call would look at
    pub fn front(&self) -> Option<&PairRecord> {
        self.records.front()
    }

    pub fn sort_state(&self) -> SortState {
        self.sort_state
    }

    /// Outcome of the last commit for a pair; `None` if unpaired or not yet
    /// processed in this pass
    pub fn is_satisfied(&self, a: usize, b: usize) -> Option<bool> {
        let pair = ShapePair::new(a, b);
        self.records
            .iter()
            .find(|r| r.pair == pair && r.processed)
            .map(|r| r.satisfied)
    }

    /// Severity of two participants for the given positions, whether or not
    /// they form a pair. Panics if either id is not registered.
    pub fn severity(&self, a: usize, b: usize, vars: &Variables) -> f64 {
        overlap_severity(
            &self.shapes[&a],
            &self.shapes[&b],
            vars,
            self.config.containment_penalty,
        )
    }

    // ========================================================================
    // Incremental protocol
    // ========================================================================

    /// Number of pairs not yet processed in this pass, or zero once the pass
    /// has found no remaining overlap
    pub fn remaining_count(&self) -> usize {
        if self.sort_state == SortState::Exhausted {
            return 0;
        }
        self.records.iter().filter(|r| !r.processed).count()
    }

    /// Separation alternatives for the worst unresolved pair.
    ///
    /// Returns an empty list when no overlap remains, after which
    /// `remaining_count()` is zero. Panics if called when
    /// `remaining_count()` is already zero.
    pub fn alternatives(&mut self, vars: &Variables) -> Vec<Alternative> {
        assert!(
            self.remaining_count() > 0,
            "alternatives requested with no remaining non-overlap pairs"
        );

        if self.sort_state == SortState::Uncomputed {
            self.compute_and_sort(vars);
        }
        if self.sort_state == SortState::Stale {
            let severity = self.evaluate_front(vars);
            if severity > 0.0 {
                trace!(severity, "stale front still overlapping");
            } else {
                self.compute_and_sort(vars);
            }
        }

        let Some(front) = self.records.front().copied() else {
            return Vec::new();
        };
        if self.sort_state == SortState::Sorted && !front.is_overlapping() {
            debug!("no overlapping pairs remain in this pass");
            self.sort_state = SortState::Exhausted;
            return Vec::new();
        }

        self.alternatives_for(front.pair, vars)
    }

    /// Retire the front pair to the back of the list with the outcome of
    /// its constraint
    pub fn commit_front(&mut self, satisfiable: bool) {
        let Some(mut record) = self.records.pop_front() else {
            panic!("commit_front called with no pair records");
        };
        assert!(
            !record.processed,
            "commit_front called with no unprocessed pair at the front"
        );

        record.processed = true;
        record.satisfied = satisfiable;
        record.severity = 0.0;
        debug!(
            a = record.pair.first(),
            b = record.pair.second(),
            satisfiable,
            "non-overlap pair committed"
        );
        self.records.push_back(record);

        if self.sort_state != SortState::Uncomputed {
            self.sort_state = SortState::Stale;
        }
    }

    /// Mark every pair unprocessed for a new pass
    pub fn reset_all(&mut self) {
        for record in self.records.iter_mut() {
            record.processed = false;
            record.satisfied = false;
        }
        self.sort_state = SortState::Uncomputed;
    }

    fn evaluate(&self, pair: ShapePair, vars: &Variables) -> f64 {
        self.severity(pair.first(), pair.second(), vars)
    }

    fn evaluate_front(&mut self, vars: &Variables) -> f64 {
        let Some(pair) = self.records.front().map(|r| r.pair) else {
            return 0.0;
        };
        let severity = self.evaluate(pair, vars);
        if let Some(front) = self.records.front_mut() {
            front.severity = severity;
        }
        severity
    }

    fn compute_and_sort(&mut self, vars: &Variables) {
        let shapes = &self.shapes;
        let penalty = self.config.containment_penalty;
        for record in self.records.iter_mut().filter(|r| !r.processed) {
            record.severity = overlap_severity(
                &shapes[&record.pair.first()],
                &shapes[&record.pair.second()],
                vars,
                penalty,
            );
        }
        sort_records(&mut self.records);
        self.sort_state = SortState::Sorted;
        debug!(pairs = self.records.len(), "non-overlap pairs re-ranked");
    }

    fn alternatives_for(&self, pair: ShapePair, vars: &Variables) -> Vec<Alternative> {
        let shape1 = &self.shapes[&pair.first()];
        let shape2 = &self.shapes[&pair.second()];
        let margin1 = shape1.margin();
        let margin2 = shape2.margin();
        let epsilon = self.config.min_separation;

        let allowed = self
            .hint
            .allowed_directions(shape1, shape2, vars)
            .filter(|d| !d.is_empty())
            .unwrap_or(Directions::all());

        let mut alternatives = Vec::with_capacity(4);
        for direction in Direction::ALL {
            if !allowed.allows(direction) {
                continue;
            }
            let dim = direction.dim();
            let half_sep = shape1.half_dim(dim) + shape2.half_dim(dim);
            let cost_sep = half_sep
                + shape1.boundary_span(dim, vars) / 2.0
                + shape2.boundary_span(dim, vars) / 2.0;
            let desired1 = shape1.desired_center(dim, vars);
            let desired2 = shape2.desired_center(dim, vars);

            let (left, right, gap, cost) = match direction {
                // shape1 after shape2 along the axis
                Direction::PushRight | Direction::PushDown => (
                    shape2.high_var(),
                    shape1.low_var(),
                    half_sep + margin1.min(dim) + margin2.max(dim),
                    cost_sep - (desired1 - desired2),
                ),
                // shape1 before shape2 along the axis
                Direction::PushLeft | Direction::PushUp => (
                    shape1.high_var(),
                    shape2.low_var(),
                    half_sep + margin1.max(dim) + margin2.min(dim),
                    cost_sep - (desired2 - desired1),
                ),
            };

            alternatives.push(Alternative {
                direction,
                constraint: SeparationConstraint::new(dim, left, right, gap + epsilon),
                cost,
            });
        }
        alternatives
    }

    // ========================================================================
    // One-shot emission
    // ========================================================================

    /// Emit one separation constraint on `dim` for every pair whose boxes
    /// overlap on the opposite axis, ignoring the incremental state.
    ///
    /// `boxes` is indexed by participant id; for a cluster the entry at its
    /// id holds the cluster bounds without margin. The direction follows the
    /// current order of the box centres.
    pub fn emit_all_as_constraints(
        &self,
        dim: Dim,
        boxes: &[Rect],
        out: &mut Vec<SeparationConstraint>,
    ) {
        let before = out.len();
        for record in &self.records {
            let shape1 = &self.shapes[&record.pair.first()];
            let shape2 = &self.shapes[&record.pair.second()];
            for id in [shape1.id, shape2.id] {
                assert!(
                    id < boxes.len(),
                    "bounding box missing for participant {}",
                    id
                );
            }

            let margin1 = shape1.margin();
            let margin2 = shape2.margin();
            let pos1 = boxes[shape1.id].center(dim);
            let pos2 = boxes[shape2.id].center(dim);
            let rect1 = boxes[shape1.id].expanded_by(&margin1);
            let rect2 = boxes[shape2.id].expanded_by(&margin2);

            let below1 = shape1.half_dim(dim) + margin1.min(dim);
            let above1 = shape1.half_dim(dim) + margin1.max(dim);
            let below2 = shape2.half_dim(dim) + margin2.min(dim);
            let above2 = shape2.half_dim(dim) + margin2.max(dim);

            if rect1.overlap(dim.opposite(), &rect2) <= self.config.emit_overlap_threshold {
                continue;
            }
            let constraint = if pos1 < pos2 {
                SeparationConstraint::new(dim, shape1.high_var(), shape2.low_var(), above1 + below2)
            } else {
                SeparationConstraint::new(dim, shape2.high_var(), shape1.low_var(), below1 + above2)
            };
            out.push(constraint);
        }
        debug!(%dim, emitted = out.len() - before, "non-overlap constraints emitted");
    }
}

impl fmt::Display for NonOverlapConstraints<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NonOverlapConstraints(pairs={}, participants={})",
            self.records.len(),
            self.shapes.len()
        )
    }
}

impl fmt::Debug for NonOverlapConstraints<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NonOverlapConstraints")
            .field("config", &self.config)
            .field("shapes", &self.shapes)
            .field("records", &self.records)
            .field("sort_state", &self.sort_state)
            .finish_non_exhaustive()
    }
}
