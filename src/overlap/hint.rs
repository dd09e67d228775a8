//! Optional restrictions on which way a pair may be separated

use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;

use super::geometry::ParticipantGeometry;
use super::types::{Dim, Variables};

/// Where the lower-id participant `A` of a pair is placed relative to the
/// other participant `B`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// `A` to the right of `B`
    PushRight,
    /// `A` to the left of `B`
    PushLeft,
    /// `A` below `B` (larger `y`)
    PushDown,
    /// `A` above `B` (smaller `y`)
    PushUp,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::PushRight,
        Direction::PushLeft,
        Direction::PushDown,
        Direction::PushUp,
    ];

    pub fn dim(self) -> Dim {
        match self {
            Direction::PushRight | Direction::PushLeft => Dim::Horizontal,
            Direction::PushDown | Direction::PushUp => Dim::Vertical,
        }
    }

    pub fn flag(self) -> Directions {
        match self {
            Direction::PushRight => Directions::PUSH_RIGHT,
            Direction::PushLeft => Directions::PUSH_LEFT,
            Direction::PushDown => Directions::PUSH_DOWN,
            Direction::PushUp => Directions::PUSH_UP,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::PushRight => write!(f, "push-right"),
            Direction::PushLeft => write!(f, "push-left"),
            Direction::PushDown => write!(f, "push-down"),
            Direction::PushUp => write!(f, "push-up"),
        }
    }
}

bitflags! {
    /// A set of allowed separation directions
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Directions: u8 {
        const PUSH_RIGHT = 1 << 0;
        const PUSH_LEFT = 1 << 1;
        const PUSH_DOWN = 1 << 2;
        const PUSH_UP = 1 << 3;
    }
}

impl Directions {
    pub fn allows(&self, direction: Direction) -> bool {
        self.contains(direction.flag())
    }
}

/// Strategy restricting the alternatives offered for a pair.
///
/// Returning `None` (or an empty set) leaves all four directions open; a
/// hint can narrow the choice but never block resolution.
pub trait DirectionalHint {
    /// `shape1` is the lower-id participant `A` of the pair
    fn allowed_directions(
        &self,
        shape1: &ParticipantGeometry,
        shape2: &ParticipantGeometry,
        vars: &Variables,
    ) -> Option<Directions>;
}

/// Hint that never restricts anything
#[derive(Debug, Clone, Copy, Default)]
pub struct AllDirections;

impl DirectionalHint for AllDirections {
    fn allowed_directions(
        &self,
        _shape1: &ParticipantGeometry,
        _shape2: &ParticipantGeometry,
        _vars: &Variables,
    ) -> Option<Directions> {
        None
    }
}

/// Keeps connector labels on the side of a shape where their connector
/// already runs.
///
/// Ids up to `shape_end` are shapes and ids from `label_start` on are
/// labels. A label attached to a connector mid-point maps to the dummy
/// node standing for that point. For a (shape, label) pair the shape's
/// centre is compared with the dummy's centre and only the directions
/// that keep the shape on its current side are allowed.
#[derive(Debug, Clone, Default)]
pub struct MidLabelHint {
    shape_end: usize,
    label_start: usize,
    label_dummies: HashMap<usize, usize>,
}

impl MidLabelHint {
    pub fn new(shape_end: usize, label_start: usize) -> Self {
        Self {
            shape_end,
            label_start,
            label_dummies: HashMap::new(),
        }
    }

    /// Attach `label` to the mid-point dummy node `dummy`
    pub fn with_label_dummy(mut self, label: usize, dummy: usize) -> Self {
        self.label_dummies.insert(label, dummy);
        self
    }

    pub fn insert_label_dummy(&mut self, label: usize, dummy: usize) {
        self.label_dummies.insert(label, dummy);
    }
}

impl DirectionalHint for MidLabelHint {
    fn allowed_directions(
        &self,
        shape1: &ParticipantGeometry,
        shape2: &ParticipantGeometry,
        vars: &Variables,
    ) -> Option<Directions> {
        if self.shape_end >= self.label_start {
            return None;
        }
        let shape = shape1.id;
        let label = shape2.id;
        if shape > self.shape_end || label < self.label_start {
            return None;
        }
        let dummy = *self.label_dummies.get(&label)?;

        let shape_x = shape1.center(Dim::Horizontal, vars);
        let shape_y = shape1.center(Dim::Vertical, vars);
        let dummy_x = vars.final_position(Dim::Horizontal, dummy);
        let dummy_y = vars.final_position(Dim::Vertical, dummy);

        let mut allowed = Directions::empty();
        if shape_x < dummy_x {
            allowed |= Directions::PUSH_LEFT;
        } else if dummy_x < shape_x {
            allowed |= Directions::PUSH_RIGHT;
        }
        if shape_y < dummy_y {
            allowed |= Directions::PUSH_UP;
        } else if dummy_y < shape_y {
            allowed |= Directions::PUSH_DOWN;
        }

        if allowed.is_empty() {
            None
        } else {
            tracing::trace!(shape, label, dummy, ?allowed, "mid-label hint applied");
            Some(allowed)
        }
    }
}
