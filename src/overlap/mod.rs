//! Non-overlap constraint generation
//!
//! This module turns overlapping rectangles (leaf shapes and cluster
//! boundaries) into separation constraints for an incremental solver,
//! worst overlap first.

pub mod config;
pub mod evaluator;
pub mod exemptions;
pub mod generator;
pub mod geometry;
pub mod hint;
pub mod ranking;
pub mod solver;
pub mod types;

pub use config::{ConfigError, OverlapConfig};
pub use evaluator::overlap_severity;
pub use exemptions::{ExemptionRegistry, ShapePair};
pub use generator::{Alternative, NonOverlapConstraints};
pub use geometry::{ClusterBoundary, Extent, GroupId, ParticipantGeometry};
pub use hint::{AllDirections, Direction, DirectionalHint, Directions, MidLabelHint};
pub use ranking::{PairRecord, PairState, SortState, DEFAULT_TIER};
pub use solver::{resolve_overlaps, run_pass, PassReport, SeparationSolver, SolverError};
pub use types::{Dim, Margin, PositionVariable, Rect, SeparationConstraint, Variables};
