//! Overlap severity between two participants

use super::geometry::ParticipantGeometry;
use super::types::{Dim, Variables};

/// Penetration depth along one axis, or `None` when the projections do
/// not overlap. Gaps are measured on both sides; a negative gap on both
/// sides means the intervals interpenetrate.
fn axis_overlap(low1: f64, high1: f64, low2: f64, high2: f64) -> Option<f64> {
    let gap_after = low2 - high1;
    let gap_before = low1 - high2;
    if gap_after < 0.0 && gap_before < 0.0 {
        Some((-gap_before).max(-gap_after))
    } else {
        None
    }
}

/// Severity used to rank a pair: the deepest penetration across both
/// axes, zero unless the rectangles overlap on both axes at once.
///
/// When one rectangle lies entirely within the other the severity becomes
/// `containment_penalty` plus the area of the inner rectangle, so nested
/// shapes are separated before partial overlaps and ties between nested
/// pairs break consistently on the inner area.
pub fn overlap_severity(
    shape1: &ParticipantGeometry,
    shape2: &ParticipantGeometry,
    vars: &Variables,
    containment_penalty: f64,
) -> f64 {
    let (left1, right1) = shape1.edges(Dim::Horizontal, vars);
    let (top1, bottom1) = shape1.edges(Dim::Vertical, vars);
    let (left2, right2) = shape2.edges(Dim::Horizontal, vars);
    let (top2, bottom2) = shape2.edges(Dim::Vertical, vars);

    let (Some(x_depth), Some(y_depth)) = (
        axis_overlap(left1, right1, left2, right2),
        axis_overlap(top1, bottom1, top2, bottom2),
    ) else {
        return 0.0;
    };

    let first_inside =
        left1 >= left2 && right1 <= right2 && top1 >= top2 && bottom1 <= bottom2;
    let second_inside =
        left2 >= left1 && right2 <= right1 && top2 >= top1 && bottom2 <= bottom1;

    if first_inside {
        containment_penalty + (right1 - left1) * (bottom1 - top1)
    } else if second_inside {
        containment_penalty + (right2 - left2) * (bottom2 - top2)
    } else {
        x_depth.max(y_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::geometry::ClusterBoundary;
    use crate::overlap::types::Margin;

    const PENALTY: f64 = 100000.0;

    fn leaf(vars: &mut Variables, x: f64, y: f64, hw: f64, hh: f64) -> ParticipantGeometry {
        let id = vars.push_point(x, y);
        ParticipantGeometry::leaf(id, hw, hh, 0)
    }

    #[test]
    fn test_partial_overlap_takes_deepest_axis() {
        let mut vars = Variables::new();
        let a = leaf(&mut vars, 0.0, 0.0, 5.0, 5.0);
        let b = leaf(&mut vars, 3.0, 3.0, 5.0, 5.0);
        // Each axis overlaps [-2, 5] from one side and [-5, 8] from the other
        assert_eq!(overlap_severity(&a, &b, &vars, PENALTY), 13.0);
    }

    #[test]
    fn test_single_axis_overlap_is_zero() {
        let mut vars = Variables::new();
        let a = leaf(&mut vars, 0.0, 0.0, 5.0, 5.0);
        let b = leaf(&mut vars, 3.0, 30.0, 5.0, 5.0);
        assert_eq!(overlap_severity(&a, &b, &vars, PENALTY), 0.0);
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let mut vars = Variables::new();
        let a = leaf(&mut vars, 0.0, 0.0, 5.0, 5.0);
        let b = leaf(&mut vars, 10.0, 0.0, 5.0, 5.0);
        assert_eq!(overlap_severity(&a, &b, &vars, PENALTY), 0.0);
    }

    #[test]
    fn test_containment_dominates_partial_overlap() {
        let mut vars = Variables::new();
        let big = leaf(&mut vars, 0.0, 0.0, 50.0, 50.0);
        let small = leaf(&mut vars, 10.0, 10.0, 5.0, 5.0);
        let other = leaf(&mut vars, 90.0, 0.0, 45.0, 45.0);

        let nested = overlap_severity(&small, &big, &vars, PENALTY);
        assert_eq!(nested, PENALTY + 100.0);
        assert_eq!(nested, overlap_severity(&big, &small, &vars, PENALTY));

        let partial = overlap_severity(&big, &other, &vars, PENALTY);
        assert!(partial > 0.0);
        assert!(nested > partial);
    }

    #[test]
    fn test_nested_area_breaks_ties() {
        let mut vars = Variables::new();
        let big = leaf(&mut vars, 0.0, 0.0, 50.0, 50.0);
        let tiny = leaf(&mut vars, 0.0, 0.0, 1.0, 1.0);
        let mid = leaf(&mut vars, 0.0, 0.0, 10.0, 10.0);
        let tiny_sev = overlap_severity(&tiny, &big, &vars, PENALTY);
        let mid_sev = overlap_severity(&mid, &big, &vars, PENALTY);
        // Area breaks ties: a larger nested area yields a larger severity
        assert!(tiny_sev < mid_sev);
        assert!(tiny_sev > PENALTY);
    }

    #[test]
    fn test_degenerate_geometry_never_panics() {
        let mut vars = Variables::new();
        let a = leaf(&mut vars, 0.0, 0.0, 0.0, 0.0);
        let b = leaf(&mut vars, 0.0, 0.0, -3.0, -3.0);
        assert_eq!(overlap_severity(&a, &b, &vars, PENALTY), 0.0);
    }

    #[test]
    fn test_cluster_bounds_include_margin() {
        let mut vars = Variables::new();
        let low = vars.push_point(0.0, 0.0);
        vars.push_point(20.0, 20.0);
        let cluster =
            ParticipantGeometry::cluster(&ClusterBoundary::new(low, Margin::uniform(2.0)), 0);
        // Leaf sits just outside the raw bounds but inside the margin
        let outside = leaf(&mut vars, 23.0, 10.0, 2.0, 2.0);
        let severity = overlap_severity(&cluster, &outside, &vars, PENALTY);
        assert!(severity > 0.0 && severity < PENALTY);
    }
}
