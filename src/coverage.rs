//! EP coverage sets.
//!
//! Every edge records which elementary predications (EPs) of the input LF its
//! semantics accounts for. Coverage is the hottest value in the chart: it is
//! part of the dedup signature, it gates every combination (disjointness) and
//! it decides completeness. A fixed-width bitset keeps all of those cheap.
//!
//! All coverages built for one LF share the same width (`n_eps`), so equal sets
//! have identical word vectors and therefore hash and compare equal.

use crate::EpId;
use std::fmt;

const WORD_BITS: usize = 64;

/// A set of EP ids drawn from `0..n_eps`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Coverage {
    n_eps: usize,
    words: Vec<u64>,
}

impl Coverage {
    /// The empty set over `n_eps` EPs.
    pub fn empty(n_eps: usize) -> Self {
        Coverage { n_eps, words: vec![0; n_eps.div_ceil(WORD_BITS)] }
    }

    /// The full set `0..n_eps`.
    pub fn full(n_eps: usize) -> Self {
        let mut cov = Coverage::empty(n_eps);
        for ep in 0..n_eps {
            cov.insert(ep);
        }
        cov
    }

    pub fn singleton(n_eps: usize, ep: EpId) -> Self {
        let mut cov = Coverage::empty(n_eps);
        cov.insert(ep);
        cov
    }

    /// Build a set from ids; ids outside the width are ignored.
    pub fn from_ids(n_eps: usize, ids: impl IntoIterator<Item = EpId>) -> Self {
        let mut cov = Coverage::empty(n_eps);
        for ep in ids {
            cov.insert(ep);
        }
        cov
    }

    /// Width of the universe this set is drawn from.
    pub fn width(&self) -> usize {
        self.n_eps
    }

    pub fn insert(&mut self, ep: EpId) {
        if ep < self.n_eps {
            self.words[ep / WORD_BITS] |= 1u64 << (ep % WORD_BITS);
        }
    }

    pub fn contains(&self, ep: EpId) -> bool {
        ep < self.n_eps && self.words[ep / WORD_BITS] & (1u64 << (ep % WORD_BITS)) != 0
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn union(&self, other: &Coverage) -> Coverage {
        Coverage { n_eps: self.n_eps, words: self.words.iter().zip(&other.words).map(|(a, b)| a | b).collect() }
    }

    pub fn intersection(&self, other: &Coverage) -> Coverage {
        Coverage { n_eps: self.n_eps, words: self.words.iter().zip(&other.words).map(|(a, b)| a & b).collect() }
    }

    pub fn difference(&self, other: &Coverage) -> Coverage {
        Coverage { n_eps: self.n_eps, words: self.words.iter().zip(&other.words).map(|(a, b)| a & !b).collect() }
    }

    pub fn is_disjoint(&self, other: &Coverage) -> bool {
        self.words.iter().zip(&other.words).all(|(a, b)| a & b == 0)
    }

    pub fn intersects(&self, other: &Coverage) -> bool {
        !self.is_disjoint(other)
    }

    /// True when every member of `self` is also in `other`.
    pub fn is_subset(&self, other: &Coverage) -> bool {
        self.words.iter().zip(&other.words).all(|(a, b)| a & !b == 0)
    }

    /// Smallest member, i.e. the earliest EP in LF order.
    pub fn first(&self) -> Option<EpId> {
        self.words
            .iter()
            .enumerate()
            .find(|(_, w)| **w != 0)
            .map(|(idx, w)| idx * WORD_BITS + w.trailing_zeros() as usize)
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = EpId> + '_ {
        self.words.iter().enumerate().flat_map(|(idx, &word)| {
            (0..WORD_BITS).filter(move |bit| word & (1u64 << bit) != 0).map(move |bit| idx * WORD_BITS + bit)
        })
    }
}

impl fmt::Debug for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (pos, ep) in self.iter().enumerate() {
            if pos > 0 {
                write!(f, ",")?;
            }
            write!(f, "{ep}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_operations_span_word_boundaries() {
        let a = Coverage::from_ids(130, [0, 63, 64, 129]);
        let b = Coverage::from_ids(130, [1, 64]);

        assert_eq!(a.len(), 4);
        assert!(a.contains(129));
        assert!(!a.contains(1));
        assert!(a.intersects(&b));
        assert_eq!(a.union(&b).len(), 5);
        assert_eq!(a.intersection(&b).iter().collect::<Vec<_>>(), vec![64]);
        assert_eq!(a.difference(&b).iter().collect::<Vec<_>>(), vec![0, 63, 129]);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![0, 63, 64, 129]);
    }

    #[test]
    fn subset_and_first() {
        let small = Coverage::from_ids(10, [3, 7]);
        let big = Coverage::from_ids(10, [2, 3, 7]);

        assert!(small.is_subset(&big));
        assert!(!big.is_subset(&small));
        assert_eq!(big.first(), Some(2));
        assert_eq!(Coverage::empty(10).first(), None);
        assert!(Coverage::empty(10).is_subset(&small));
    }

    #[test]
    fn equal_sets_are_equal_regardless_of_insertion_order() {
        let a = Coverage::from_ids(8, [5, 1]);
        let b = Coverage::from_ids(8, [1, 5]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "{1,5}");
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        let mut cov = Coverage::empty(3);
        cov.insert(3);
        assert!(cov.is_empty());
        assert_eq!(Coverage::full(3).len(), 3);
    }
}
