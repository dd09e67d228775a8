//! Core value types shared by the overlap generator and the solver

use std::fmt;

use serde::Deserialize;

/// An axis of the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dim {
    Horizontal,
    Vertical,
}

impl Dim {
    pub const ALL: [Dim; 2] = [Dim::Horizontal, Dim::Vertical];

    /// The other axis
    pub fn opposite(self) -> Dim {
        match self {
            Dim::Horizontal => Dim::Vertical,
            Dim::Vertical => Dim::Horizontal,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Horizontal => write!(f, "x"),
            Dim::Vertical => write!(f, "y"),
        }
    }
}

/// An axis-aligned rectangle. `y` grows downwards, so `y` is the top edge
/// in screen terms and the low edge in solver terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from its centre and half extents
    pub fn from_center(cx: f64, cy: f64, half_width: f64, half_height: f64) -> Self {
        Self::new(
            cx - half_width,
            cy - half_height,
            half_width * 2.0,
            half_height * 2.0,
        )
    }

    /// Low edge along `dim`
    pub fn min(&self, dim: Dim) -> f64 {
        match dim {
            Dim::Horizontal => self.x,
            Dim::Vertical => self.y,
        }
    }

    /// High edge along `dim`
    pub fn max(&self, dim: Dim) -> f64 {
        match dim {
            Dim::Horizontal => self.x + self.width,
            Dim::Vertical => self.y + self.height,
        }
    }

    /// Centre coordinate along `dim`
    pub fn center(&self, dim: Dim) -> f64 {
        (self.min(dim) + self.max(dim)) / 2.0
    }

    /// Length of the overlap between the projections of the two
    /// rectangles onto `dim`, or zero when they are disjoint on that axis.
    pub fn overlap(&self, dim: Dim, other: &Rect) -> f64 {
        let u = self.center(dim);
        let v = other.center(dim);
        if u <= v && other.min(dim) < self.max(dim) {
            return self.max(dim) - other.min(dim);
        }
        if v <= u && self.min(dim) < other.max(dim) {
            return other.max(dim) - self.min(dim);
        }
        0.0
    }

    /// Grow the rectangle outwards by a per-side margin
    pub fn expanded_by(&self, margin: &Margin) -> Rect {
        Rect::new(
            self.x - margin.left,
            self.y - margin.top,
            self.width + margin.left + margin.right,
            self.height + margin.top + margin.bottom,
        )
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// Asymmetric padding around a cluster boundary.
///
/// `top` pads the low `y` edge and `bottom` pads the high `y` edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Margin {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
}

impl Margin {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Same padding on every side
    pub fn uniform(pad: f64) -> Self {
        Self::new(pad, pad, pad, pad)
    }

    /// Padding on the low side of `dim`
    pub fn min(&self, dim: Dim) -> f64 {
        match dim {
            Dim::Horizontal => self.left,
            Dim::Vertical => self.top,
        }
    }

    /// Padding on the high side of `dim`
    pub fn max(&self, dim: Dim) -> f64 {
        match dim {
            Dim::Horizontal => self.right,
            Dim::Vertical => self.bottom,
        }
    }
}

/// A solver-owned position variable as seen by the generator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionVariable {
    /// Position the variable would take without any constraint
    pub desired_position: f64,
    /// Position most recently reported by the solver
    pub final_position: f64,
}

impl PositionVariable {
    pub fn new(desired_position: f64, final_position: f64) -> Self {
        Self {
            desired_position,
            final_position,
        }
    }

    /// A variable currently sitting at its desired position
    pub fn at(position: f64) -> Self {
        Self::new(position, position)
    }
}

/// Per-axis arena of position variables, indexed by participant id.
///
/// A leaf uses one index (its centre). A cluster uses two adjacent
/// indices: `id` for the low boundary and `id + 1` for the high one.
/// Generators only store indices into this arena, so the arena must
/// outlive every generator that reads from it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    x: Vec<PositionVariable>,
    y: Vec<PositionVariable>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one variable per axis and return its index
    pub fn push(&mut self, x: PositionVariable, y: PositionVariable) -> usize {
        self.x.push(x);
        self.y.push(y);
        self.x.len() - 1
    }

    /// Append a point whose current and desired positions coincide
    pub fn push_point(&mut self, x: f64, y: f64) -> usize {
        self.push(PositionVariable::at(x), PositionVariable::at(y))
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// All variables of one axis
    pub fn dim(&self, dim: Dim) -> &[PositionVariable] {
        match dim {
            Dim::Horizontal => &self.x,
            Dim::Vertical => &self.y,
        }
    }

    fn dim_mut(&mut self, dim: Dim) -> &mut Vec<PositionVariable> {
        match dim {
            Dim::Horizontal => &mut self.x,
            Dim::Vertical => &mut self.y,
        }
    }

    /// Look up a variable. Panics when `index` is outside the arena, since
    /// that means the caller and the solver disagree about the variables.
    pub fn get(&self, dim: Dim, index: usize) -> &PositionVariable {
        let vars = self.dim(dim);
        assert!(
            index < vars.len(),
            "variable index {} out of range for {} ({} variables)",
            index,
            dim,
            vars.len()
        );
        &vars[index]
    }

    pub fn get_mut(&mut self, dim: Dim, index: usize) -> &mut PositionVariable {
        let vars = self.dim_mut(dim);
        let len = vars.len();
        assert!(
            index < len,
            "variable index {} out of range for {} ({} variables)",
            index,
            dim,
            len
        );
        &mut vars[index]
    }

    pub fn final_position(&self, dim: Dim, index: usize) -> f64 {
        self.get(dim, index).final_position
    }

    pub fn desired_position(&self, dim: Dim, index: usize) -> f64 {
        self.get(dim, index).desired_position
    }

    /// Reset every final position on `dim` to `value`
    pub fn fill_final(&mut self, dim: Dim, value: f64) {
        for var in self.dim_mut(dim).iter_mut() {
            var.final_position = value;
        }
    }
}

/// A separation constraint `right >= left + gap` between two variables of
/// the same axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparationConstraint {
    pub dim: Dim,
    pub left: usize,
    pub right: usize,
    pub gap: f64,
}

impl SeparationConstraint {
    pub fn new(dim: Dim, left: usize, right: usize, gap: f64) -> Self {
        Self {
            dim,
            left,
            right,
            gap,
        }
    }

    /// Whether the constraint holds for the current final positions
    pub fn is_satisfied(&self, vars: &Variables, tolerance: f64) -> bool {
        let left = vars.final_position(self.dim, self.left);
        let right = vars.final_position(self.dim, self.right);
        right - left >= self.gap - tolerance
    }
}

impl fmt::Display for SeparationConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{dim}[{}] >= {dim}[{}] + {}",
            self.right,
            self.left,
            self.gap,
            dim = self.dim
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::from_center(10.0, 20.0, 5.0, 2.0);
        assert_eq!(r.min(Dim::Horizontal), 5.0);
        assert_eq!(r.max(Dim::Horizontal), 15.0);
        assert_eq!(r.min(Dim::Vertical), 18.0);
        assert_eq!(r.max(Dim::Vertical), 22.0);
        assert_eq!(r.center(Dim::Vertical), 20.0);
    }

    #[test]
    fn test_rect_overlap_is_symmetric() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(6.0, 20.0, 10.0, 10.0);
        assert_eq!(a.overlap(Dim::Horizontal, &b), 4.0);
        assert_eq!(b.overlap(Dim::Horizontal, &a), 4.0);
        assert_eq!(a.overlap(Dim::Vertical, &b), 0.0);
    }

    #[test]
    fn test_rect_expanded_by_margin() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0).expanded_by(&Margin::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(r, Rect::new(-1.0, -3.0, 13.0, 17.0));
    }

    #[test]
    fn test_margin_sides_per_dim() {
        let m = Margin::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(m.min(Dim::Horizontal), 1.0);
        assert_eq!(m.max(Dim::Horizontal), 2.0);
        assert_eq!(m.min(Dim::Vertical), 3.0);
        assert_eq!(m.max(Dim::Vertical), 4.0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_variable_index_out_of_range_panics() {
        let vars = Variables::new();
        vars.get(Dim::Horizontal, 0);
    }

    #[test]
    fn test_separation_constraint_display() {
        let c = SeparationConstraint::new(Dim::Vertical, 1, 3, 10.0);
        assert_eq!(c.to_string(), "y[3] >= y[1] + 10");
    }
}
