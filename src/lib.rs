//! Non-overlap constraint generation for constrained graph layout
//!
//! This library detects overlaps between axis-aligned rectangles (leaf
//! shapes and cluster boundaries), ranks them by severity and feeds
//! separation constraints, worst overlap first, into an incremental
//! constraint solver until no significant overlap remains.
//!
//! # Example
//!
//! ```rust
//! use nonoverlap::overlap::{resolve_overlaps, NonOverlapConstraints, OverlapConfig, Variables};
//!
//! let mut vars = Variables::new();
//! let a = vars.push_point(0.0, 0.0);
//! let b = vars.push_point(3.0, 3.0);
//!
//! let mut generator = NonOverlapConstraints::new(None, OverlapConfig::default());
//! generator.register_leaf(a, 5.0, 5.0, 0);
//! generator.register_leaf(b, 5.0, 5.0, 0);
//!
//! let report = resolve_overlaps(&mut generator, &mut vars).unwrap();
//! assert_eq!(report.satisfied, 1);
//! assert_eq!(generator.severity(a, b, &vars), 0.0);
//! ```

pub mod error;
pub mod overlap;
pub mod scene;

pub use error::NonOverlapError;
pub use overlap::{
    resolve_overlaps, Alternative, ClusterBoundary, Dim, ExemptionRegistry, Margin,
    NonOverlapConstraints, OverlapConfig, PassReport, Rect, SeparationConstraint, Variables,
};
pub use scene::{Scene, SceneError, SceneLayout};

use tracing::{debug, warn};

use overlap::{run_pass, SeparationSolver};

/// Final placement of one scene participant
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParticipant {
    pub name: String,
    pub id: usize,
    /// Bounds without cluster margin
    pub bounds: Rect,
}

/// Result of resolving a scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneReport {
    pub participants: Vec<ResolvedParticipant>,
    /// Number of candidate pairs the generator tracked
    pub pair_count: usize,
    /// Outcome of the incremental pass
    pub pass: PassReport,
    /// One-shot constraints for the final positions, horizontal then
    /// vertical
    pub emitted: Vec<SeparationConstraint>,
}

/// Resolve a scene with its own configuration
///
/// # Example
///
/// ```rust
/// use nonoverlap::{resolve_scene, Scene};
///
/// let scene = Scene::from_toml_str(r#"
///     [[leaf]]
///     name = "a"
///     x = 0.0
///     y = 0.0
///     width = 10.0
///     height = 10.0
///
///     [[leaf]]
///     name = "b"
///     x = 3.0
///     y = 3.0
///     width = 10.0
///     height = 10.0
/// "#).unwrap();
///
/// let report = resolve_scene(&scene).unwrap();
/// assert_eq!(report.pass.satisfied, 1);
/// ```
pub fn resolve_scene(scene: &Scene) -> Result<SceneReport, NonOverlapError> {
    resolve_scene_with_config(scene, scene.config.clone())
}

/// Resolve a scene with an explicit configuration
///
/// Builds the variables, registers every participant, keeps each cluster's
/// high boundary at or after its low boundary, runs one incremental
/// overlap-removal pass and finally emits the one-shot constraints for the
/// resolved positions.
pub fn resolve_scene_with_config(
    scene: &Scene,
    config: OverlapConfig,
) -> Result<SceneReport, NonOverlapError> {
    let SceneLayout {
        mut vars,
        exemptions,
        participants,
    } = scene.layout()?;

    let mut generator = NonOverlapConstraints::new(Some(&exemptions), config);
    for participant in &participants {
        participant.register(&mut generator);
    }
    debug!(%generator, "scene registered");

    let mut solver = SeparationSolver::attach(&mut vars)?;
    for participant in &participants {
        let g = &participant.geometry;
        if !g.uses_boundary_variables() {
            continue;
        }
        for dim in Dim::ALL {
            let ordered = SeparationConstraint::new(dim, g.low_var(), g.high_var(), 0.0);
            if !solver.try_add(&ordered)? {
                warn!(cluster = %participant.name, %dim, "cluster boundary order rejected");
            }
        }
    }

    let pass = run_pass(&mut generator, &mut solver, &mut vars)?;

    let boxes = SceneLayout::bounding_boxes(&participants, &vars);
    let mut emitted = Vec::new();
    for dim in Dim::ALL {
        generator.emit_all_as_constraints(dim, &boxes, &mut emitted);
    }

    let resolved = participants
        .iter()
        .map(|p| ResolvedParticipant {
            name: p.name.clone(),
            id: p.id(),
            bounds: p.bounds(&vars),
        })
        .collect();

    Ok(SceneReport {
        participants: resolved,
        pair_count: generator.pair_count(),
        pass,
        emitted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_empty_scene() {
        let report = resolve_scene(&Scene::default()).unwrap();
        assert!(report.participants.is_empty());
        assert_eq!(report.pair_count, 0);
        assert_eq!(report.pass, PassReport::default());
        assert!(report.emitted.is_empty());
    }

    #[test]
    fn test_inverted_cluster_is_reordered() {
        let scene = Scene::from_toml_str(
            r#"
[[cluster]]
name = "inside_out"
x = 0.0
y = 0.0
width = -10.0
height = 20.0
"#,
        )
        .unwrap();
        let report = resolve_scene(&scene).unwrap();
        let bounds = report.participants[0].bounds;
        assert!(bounds.width >= -1e-9, "width {}", bounds.width);
        assert!((bounds.height - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_scene_separates_overlap() {
        let scene = Scene::from_toml_str(
            r#"
[[leaf]]
name = "a"
x = 0.0
y = 0.0
width = 10.0
height = 10.0

[[leaf]]
name = "b"
x = 4.0
y = 1.0
width = 10.0
height = 10.0
"#,
        )
        .unwrap();
        let report = resolve_scene(&scene).unwrap();
        assert_eq!(report.pair_count, 1);
        assert_eq!(report.pass.satisfied, 1);
        let a = report.participants[0].bounds;
        let b = report.participants[1].bounds;
        let x_clear = a.max(Dim::Horizontal) <= b.min(Dim::Horizontal) + 1e-6
            || b.max(Dim::Horizontal) <= a.min(Dim::Horizontal) + 1e-6;
        let y_clear = a.max(Dim::Vertical) <= b.min(Dim::Vertical) + 1e-6
            || b.max(Dim::Vertical) <= a.min(Dim::Vertical) + 1e-6;
        assert!(x_clear || y_clear, "a={:?} b={:?}", a, b);
    }
}
