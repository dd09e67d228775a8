//! Geometry of the participants taking part in overlap removal

use super::types::{Dim, Margin, Rect, Variables};

/// Grouping scope. Only participants sharing a group are ever paired.
pub type GroupId = u32;

/// The engine's description of a cluster boundary.
///
/// A normal cluster owns two adjacent variables per axis: `var_id` for
/// its low edge and `var_id + 1` for its high edge. A cluster derived
/// from a fixed rectangle has no boundary variables; it sits on the single
/// variable `var_id` with the extent of `bounds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterBoundary {
    pub var_id: usize,
    pub margin: Margin,
    pub bounds: Rect,
    pub from_fixed_rectangle: bool,
}

impl ClusterBoundary {
    pub fn new(var_id: usize, margin: Margin) -> Self {
        Self {
            var_id,
            margin,
            bounds: Rect::default(),
            from_fixed_rectangle: false,
        }
    }

    pub fn fixed(var_id: usize, bounds: Rect, margin: Margin) -> Self {
        Self {
            var_id,
            margin,
            bounds,
            from_fixed_rectangle: true,
        }
    }
}

/// How a participant's rectangle is derived from its variables
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extent {
    /// Centre variable plus fixed half extents
    Leaf { half_width: f64, half_height: f64 },
    /// Low and high boundary variables plus a margin
    Cluster { margin: Margin },
}

/// Geometry record for one registered participant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticipantGeometry {
    pub id: usize,
    pub extent: Extent,
    pub group: GroupId,
    /// Clusters never honour exemptions, whatever their extent
    pub is_cluster: bool,
}

impl ParticipantGeometry {
    pub fn leaf(id: usize, half_width: f64, half_height: f64, group: GroupId) -> Self {
        Self {
            id,
            extent: Extent::Leaf {
                half_width,
                half_height,
            },
            group,
            is_cluster: false,
        }
    }

    pub fn cluster(cluster: &ClusterBoundary, group: GroupId) -> Self {
        let extent = if cluster.from_fixed_rectangle {
            Extent::Leaf {
                half_width: cluster.bounds.width / 2.0,
                half_height: cluster.bounds.height / 2.0,
            }
        } else {
            Extent::Cluster {
                margin: cluster.margin,
            }
        };
        Self {
            id: cluster.var_id,
            extent,
            group,
            is_cluster: true,
        }
    }

    /// Whether the rectangle comes from two boundary variables
    pub fn uses_boundary_variables(&self) -> bool {
        matches!(self.extent, Extent::Cluster { .. })
    }

    /// Intrinsic half extent along `dim`; zero for boundary-variable clusters
    pub fn half_dim(&self, dim: Dim) -> f64 {
        match self.extent {
            Extent::Leaf {
                half_width,
                half_height,
            } => match dim {
                Dim::Horizontal => half_width,
                Dim::Vertical => half_height,
            },
            Extent::Cluster { .. } => 0.0,
        }
    }

    /// Margin contributed on each side; zero for leaves
    pub fn margin(&self) -> Margin {
        match self.extent {
            Extent::Leaf { .. } => Margin::default(),
            Extent::Cluster { margin } => margin,
        }
    }

    /// Variable holding the low edge (or the centre for leaves)
    pub fn low_var(&self) -> usize {
        self.id
    }

    /// Variable holding the high edge (or the centre for leaves)
    pub fn high_var(&self) -> usize {
        if self.uses_boundary_variables() {
            self.id + 1
        } else {
            self.id
        }
    }

    /// Variable indices this participant occupies
    pub fn occupied_vars(&self) -> std::ops::RangeInclusive<usize> {
        self.low_var()..=self.high_var()
    }

    /// Current rectangle from the solver's final positions
    pub fn current_rect(&self, vars: &Variables) -> Rect {
        let (left, right) = self.edges(Dim::Horizontal, vars);
        let (top, bottom) = self.edges(Dim::Vertical, vars);
        Rect::new(left, top, right - left, bottom - top)
    }

    /// Low and high edge along `dim` from final positions
    pub fn edges(&self, dim: Dim, vars: &Variables) -> (f64, f64) {
        match self.extent {
            Extent::Leaf { .. } => {
                let centre = vars.final_position(dim, self.id);
                let half = self.half_dim(dim);
                (centre - half, centre + half)
            }
            Extent::Cluster { margin } => {
                let low = vars.final_position(dim, self.low_var());
                let high = vars.final_position(dim, self.high_var());
                (low - margin.min(dim), high + margin.max(dim))
            }
        }
    }

    /// Current centre along `dim` from final positions, ignoring margins
    pub fn center(&self, dim: Dim, vars: &Variables) -> f64 {
        let low = vars.final_position(dim, self.low_var());
        let high = vars.final_position(dim, self.high_var());
        (low + high) / 2.0
    }

    /// Current distance between the boundary variables; zero for leaves
    pub fn boundary_span(&self, dim: Dim, vars: &Variables) -> f64 {
        if self.uses_boundary_variables() {
            vars.final_position(dim, self.high_var()) - vars.final_position(dim, self.low_var())
        } else {
            0.0
        }
    }

    /// Unconstrained target position used to compare alternatives. For
    /// boundary-variable clusters this is recentred to the current
    /// midpoint of the cluster.
    pub fn desired_center(&self, dim: Dim, vars: &Variables) -> f64 {
        vars.desired_position(dim, self.low_var()) + self.boundary_span(dim, vars) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_edges_from_centre() {
        let mut vars = Variables::new();
        let id = vars.push_point(10.0, 20.0);
        let shape = ParticipantGeometry::leaf(id, 5.0, 3.0, 0);
        assert_eq!(shape.edges(Dim::Horizontal, &vars), (5.0, 15.0));
        assert_eq!(shape.edges(Dim::Vertical, &vars), (17.0, 23.0));
        assert_eq!(shape.high_var(), id);
    }

    #[test]
    fn test_cluster_edges_from_boundary_vars_and_margin() {
        let mut vars = Variables::new();
        let low = vars.push_point(0.0, 0.0);
        vars.push_point(40.0, 30.0);
        let cluster = ClusterBoundary::new(low, Margin::new(1.0, 2.0, 3.0, 4.0));
        let shape = ParticipantGeometry::cluster(&cluster, 0);
        assert_eq!(shape.half_dim(Dim::Horizontal), 0.0);
        assert_eq!(shape.edges(Dim::Horizontal, &vars), (-1.0, 42.0));
        assert_eq!(shape.edges(Dim::Vertical, &vars), (-3.0, 34.0));
        assert_eq!(shape.current_rect(&vars), Rect::new(-1.0, -3.0, 43.0, 37.0));
        assert_eq!(shape.occupied_vars(), 0..=1);
    }

    #[test]
    fn test_center_uses_boundary_midpoint() {
        let mut vars = Variables::new();
        let low = vars.push_point(10.0, 0.0);
        vars.push_point(30.0, 50.0);
        let leaf = vars.push_point(7.0, 8.0);
        let boundary = ClusterBoundary::new(low, Margin::new(9.0, 0.0, 0.0, 0.0));
        let cluster = ParticipantGeometry::cluster(&boundary, 0);
        assert_eq!(cluster.center(Dim::Horizontal, &vars), 20.0);
        assert_eq!(cluster.center(Dim::Vertical, &vars), 25.0);
        let leaf = ParticipantGeometry::leaf(leaf, 3.0, 3.0, 0);
        assert_eq!(leaf.center(Dim::Vertical, &vars), 8.0);
    }

    #[test]
    fn test_cluster_desired_center_is_recentred() {
        let mut vars = Variables::new();
        let low = vars.push_point(10.0, 0.0);
        vars.push_point(30.0, 50.0);
        let shape = ParticipantGeometry::cluster(&ClusterBoundary::new(low, Margin::default()), 0);
        assert_eq!(shape.desired_center(Dim::Horizontal, &vars), 20.0);
        assert_eq!(shape.desired_center(Dim::Vertical, &vars), 25.0);
    }

    #[test]
    fn test_fixed_rectangle_cluster_acts_like_a_leaf() {
        let cluster =
            ClusterBoundary::fixed(3, Rect::new(0.0, 0.0, 20.0, 10.0), Margin::uniform(2.0));
        let shape = ParticipantGeometry::cluster(&cluster, 1);
        assert!(shape.is_cluster);
        assert!(!shape.uses_boundary_variables());
        assert_eq!(shape.half_dim(Dim::Horizontal), 10.0);
        assert_eq!(shape.half_dim(Dim::Vertical), 5.0);
        assert_eq!(shape.high_var(), 3);
    }
}
