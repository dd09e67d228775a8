//! Feasibility-testing incremental solver and the overlap-removal pass
//!
//! This module wraps the kasuari Cassowary solver. Every variable is
//! anchored at its desired position with a strong (non-required) edit, and
//! separation constraints are added as required constraints one at a time.
//! A separation that cannot be satisfied is rejected and the affected axis
//! is rebuilt from its anchors and the constraints already accepted.

use std::collections::HashMap;

use kasuari::{
    AddConstraintError, Solver as KasuariSolver, Strength, Variable as KasuariVariable,
    WeightedRelation::*,
};
use thiserror::Error;
use tracing::{debug, info};

use super::generator::NonOverlapConstraints;
use super::types::{Dim, SeparationConstraint, Variables};

/// Errors from the constraint solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Failed to anchor variable {index} on axis {dim}: {reason}")]
    Anchor {
        dim: Dim,
        index: usize,
        reason: String,
    },

    #[error("Internal solver error: {0}")]
    Internal(String),
}

/// One kasuari solver and its variable mapping.
///
/// kasuari does not roll back a rejected constraint cleanly, so the axis
/// keeps its anchors and accepted constraints and rebuilds the tableau from
/// them after every rejection.
struct AxisSolver {
    dim: Dim,
    solver: KasuariSolver,
    anchors: Vec<f64>,
    vars: Vec<KasuariVariable>,
    index: HashMap<KasuariVariable, usize>,
    accepted: Vec<SeparationConstraint>,
    /// Set after a rebuild; the next sync must rewrite every position
    rebuilt: bool,
}

impl AxisSolver {
    fn new(dim: Dim, vars: &Variables) -> Result<Self, SolverError> {
        let anchors = vars.dim(dim).iter().map(|v| v.desired_position).collect();
        Self::build(dim, anchors, Vec::new())
    }

    fn build(
        dim: Dim,
        anchors: Vec<f64>,
        accepted: Vec<SeparationConstraint>,
    ) -> Result<Self, SolverError> {
        let mut axis = Self {
            dim,
            solver: KasuariSolver::new(),
            vars: Vec::with_capacity(anchors.len()),
            index: HashMap::with_capacity(anchors.len()),
            anchors,
            accepted: Vec::new(),
            rebuilt: false,
        };
        for (i, &anchor) in axis.anchors.iter().enumerate() {
            let kvar = KasuariVariable::new();
            axis.solver
                .add_edit_variable(kvar, Strength::STRONG)
                .map_err(|e| SolverError::Anchor {
                    dim,
                    index: i,
                    reason: e.to_string(),
                })?;
            axis.solver
                .suggest_value(kvar, anchor)
                .map_err(|e| SolverError::Anchor {
                    dim,
                    index: i,
                    reason: e.to_string(),
                })?;
            axis.vars.push(kvar);
            axis.index.insert(kvar, i);
        }
        for constraint in &accepted {
            axis.add(constraint).map_err(|e| {
                SolverError::Internal(format!(
                    "Failed to restore accepted constraint {}: {:?}",
                    constraint, e
                ))
            })?;
        }
        axis.accepted = accepted;
        Ok(axis)
    }

    fn var(&self, index: usize) -> KasuariVariable {
        assert!(
            index < self.vars.len(),
            "constraint references variable {} on axis {} but only {} exist",
            index,
            self.dim,
            self.vars.len()
        );
        self.vars[index]
    }

    fn add(&mut self, constraint: &SeparationConstraint) -> Result<(), AddConstraintError> {
        let left = self.var(constraint.left);
        let right = self.var(constraint.right);
        self.solver
            .add_constraint(right | GE(Strength::REQUIRED) | left + constraint.gap)
    }

    fn try_add(&mut self, constraint: &SeparationConstraint) -> Result<bool, SolverError> {
        match self.add(constraint) {
            Ok(()) => {
                self.accepted.push(*constraint);
                Ok(true)
            }
            Err(AddConstraintError::UnsatisfiableConstraint) => {
                let anchors = std::mem::take(&mut self.anchors);
                let accepted = std::mem::take(&mut self.accepted);
                *self = Self::build(self.dim, anchors, accepted)?;
                self.rebuilt = true;
                Ok(false)
            }
            Err(AddConstraintError::DuplicateConstraint) => Err(SolverError::Internal(format!(
                "Duplicate constraint: {}",
                constraint
            ))),
            Err(AddConstraintError::InternalSolverError(msg)) => Err(SolverError::Internal(
                format!("Internal solver error for {}: {}", constraint, msg),
            )),
        }
    }

    fn sync(&mut self, vars: &mut Variables) {
        let dim = self.dim;
        // A fresh tableau only reports values that moved away from zero
        if self.rebuilt {
            vars.fill_final(dim, 0.0);
            self.rebuilt = false;
        }
        for (kvar, value) in self.solver.fetch_changes() {
            if let Some(&i) = self.index.get(kvar) {
                vars.get_mut(dim, i).final_position = *value;
            }
        }
    }
}

/// Incremental solver that reports whether each added separation keeps
/// the system feasible
pub struct SeparationSolver {
    x: AxisSolver,
    y: AxisSolver,
    accepted: Vec<SeparationConstraint>,
}

impl SeparationSolver {
    /// Build a solver for `vars`, anchored at their desired positions, and
    /// write the resulting unconstrained solution into the final positions.
    pub fn attach(vars: &mut Variables) -> Result<Self, SolverError> {
        let mut solver = Self {
            x: AxisSolver::new(Dim::Horizontal, vars)?,
            y: AxisSolver::new(Dim::Vertical, vars)?,
            accepted: Vec::new(),
        };
        // kasuari only reports values that moved away from zero
        for dim in Dim::ALL {
            vars.fill_final(dim, 0.0);
        }
        solver.sync(vars);
        Ok(solver)
    }

    fn axis_mut(&mut self, dim: Dim) -> &mut AxisSolver {
        match dim {
            Dim::Horizontal => &mut self.x,
            Dim::Vertical => &mut self.y,
        }
    }

    /// Add `constraint` as a required constraint. Returns `Ok(false)` if it
    /// cannot be satisfied together with the constraints already accepted;
    /// the solution then stays the one those constraints give.
    pub fn try_add(&mut self, constraint: &SeparationConstraint) -> Result<bool, SolverError> {
        let accepted = self.axis_mut(constraint.dim).try_add(constraint)?;
        if accepted {
            debug!(%constraint, "separation accepted");
            self.accepted.push(*constraint);
        } else {
            debug!(%constraint, "separation rejected as infeasible");
        }
        Ok(accepted)
    }

    /// Copy the current solution into the final positions of `vars`
    pub fn sync(&mut self, vars: &mut Variables) {
        self.x.sync(vars);
        self.y.sync(vars);
    }

    /// Constraints accepted so far, in order
    pub fn accepted(&self) -> &[SeparationConstraint] {
        &self.accepted
    }
}

/// Summary of one overlap-removal pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    /// Separation constraints accepted by the solver, in order
    pub accepted: Vec<SeparationConstraint>,
    /// Pairs whose constraint was accepted
    pub satisfied: usize,
    /// Pairs for which every alternative was infeasible
    pub unsatisfied: usize,
}

impl PassReport {
    pub fn pairs_processed(&self) -> usize {
        self.satisfied + self.unsatisfied
    }
}

/// Run one overlap-removal pass with a fresh solver anchored at the
/// desired positions of `vars`
pub fn resolve_overlaps(
    generator: &mut NonOverlapConstraints<'_>,
    vars: &mut Variables,
) -> Result<PassReport, SolverError> {
    let mut solver = SeparationSolver::attach(vars)?;
    run_pass(generator, &mut solver, vars)
}

/// Run one overlap-removal pass against an existing solver.
///
/// Alternatives for the worst remaining pair are tried cheapest first; the
/// first feasible one is kept and the pair is committed either way.
pub fn run_pass(
    generator: &mut NonOverlapConstraints<'_>,
    solver: &mut SeparationSolver,
    vars: &mut Variables,
) -> Result<PassReport, SolverError> {
    generator.reset_all();
    let first_accepted = solver.accepted().len();
    let mut report = PassReport::default();

    while generator.remaining_count() > 0 {
        let mut alternatives = generator.alternatives(vars);
        if alternatives.is_empty() {
            break;
        }
        alternatives.sort_by(|a, b| a.cost.total_cmp(&b.cost));

        let mut satisfiable = false;
        for alternative in &alternatives {
            if solver.try_add(&alternative.constraint)? {
                solver.sync(vars);
                satisfiable = true;
                break;
            }
        }
        generator.commit_front(satisfiable);
        if satisfiable {
            report.satisfied += 1;
        } else {
            report.unsatisfied += 1;
        }
    }

    report.accepted = solver.accepted()[first_accepted..].to_vec();
    info!(
        satisfied = report.satisfied,
        unsatisfied = report.unsatisfied,
        "overlap removal pass finished"
    );
    Ok(report)
}
