//! Participant pairs that are allowed to overlap

use std::collections::BTreeSet;

/// An unordered pair of participant ids, stored smaller id first so that
/// `ShapePair::new(a, b) == ShapePair::new(b, a)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapePair {
    first: usize,
    second: usize,
}

impl ShapePair {
    /// Panics if both ids are the same: a participant never pairs with itself.
    pub fn new(a: usize, b: usize) -> Self {
        assert!(a != b, "a shape pair needs two distinct ids, got {} twice", a);
        Self {
            first: a.min(b),
            second: a.max(b),
        }
    }

    /// The smaller id
    pub fn first(&self) -> usize {
        self.first
    }

    /// The larger id
    pub fn second(&self) -> usize {
        self.second
    }

    pub fn contains(&self, id: usize) -> bool {
        self.first == id || self.second == id
    }
}

/// Set of participant pairs permitted to overlap, e.g. because the user
/// grouped them explicitly
#[derive(Debug, Clone, Default)]
pub struct ExemptionRegistry {
    pairs: BTreeSet<ShapePair>,
}

impl ExemptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exempt every pair within a group of ids. Duplicate ids are ignored
    /// and declaring the same group twice changes nothing.
    pub fn declare_exempt_group(&mut self, ids: impl IntoIterator<Item = usize>) {
        let ids: BTreeSet<usize> = ids.into_iter().collect();
        let ids: Vec<usize> = ids.into_iter().collect();
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                self.pairs.insert(ShapePair::new(a, b));
            }
        }
    }

    pub fn is_exempt(&self, a: usize, b: usize) -> bool {
        a != b && self.pairs.contains(&ShapePair::new(a, b))
    }

    /// Number of exempt pairs
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pair_is_canonical() {
        let pair = ShapePair::new(7, 3);
        assert_eq!(pair.first(), 3);
        assert_eq!(pair.second(), 7);
        assert_eq!(pair, ShapePair::new(3, 7));
    }

    #[test]
    #[should_panic(expected = "distinct")]
    fn test_pair_rejects_same_id() {
        ShapePair::new(4, 4);
    }

    #[test]
    fn test_group_exempts_all_pairs() {
        let mut registry = ExemptionRegistry::new();
        registry.declare_exempt_group([1, 2, 3]);
        assert!(registry.is_exempt(1, 2));
        assert!(registry.is_exempt(2, 3));
        assert!(registry.is_exempt(3, 1));
        assert!(!registry.is_exempt(1, 4));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_group_dedups_and_is_idempotent() {
        let mut registry = ExemptionRegistry::new();
        registry.declare_exempt_group([5, 2, 5, 2]);
        registry.declare_exempt_group(vec![2, 5]);
        assert_eq!(registry.len(), 1);
        assert!(registry.is_exempt(5, 2));
    }

    #[test]
    fn test_singleton_group_exempts_nothing() {
        let mut registry = ExemptionRegistry::new();
        registry.declare_exempt_group([9]);
        assert!(registry.is_empty());
        assert!(!registry.is_exempt(9, 9));
    }

    proptest! {
        #[test]
        fn prop_pair_order_independent(a in 0usize..1000, b in 0usize..1000) {
            prop_assume!(a != b);
            prop_assert_eq!(ShapePair::new(a, b), ShapePair::new(b, a));
            prop_assert!(ShapePair::new(a, b).first() < ShapePair::new(a, b).second());
        }

        #[test]
        fn prop_pair_ordering_is_lexicographic(
            a in 0usize..100, b in 0usize..100, c in 0usize..100, d in 0usize..100,
        ) {
            prop_assume!(a != b && c != d);
            let lhs = ShapePair::new(a, b);
            let rhs = ShapePair::new(c, d);
            let expected = (a.min(b), a.max(b)).cmp(&(c.min(d), c.max(d)));
            prop_assert_eq!(lhs.cmp(&rhs), expected);
        }
    }
}
