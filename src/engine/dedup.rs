//! Storage signatures for dominance pruning.
//!
//! Without a stable notion of "the same edge", semantically equivalent
//! derivations multiply combinatorially (every bracketing of the same words,
//! every order in which the same pieces were found). The chart keeps at most
//! one edge per [`EdgeSignature`]: the highest scoring one.
//!
//! ## What counts as "the same edge"
//!
//! - Coverage: the exact set of EPs accounted for.
//! - Category: the syntactic category, structurally compared.
//!
//! Words and derivation history are deliberately not part of the key; two
//! edges that differ only there are interchangeable for all further
//! combination, so only the better scoring one is worth expanding.

use super::edge::Edge;
use crate::{Category, Coverage};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct EdgeSignature {
    pub(crate) coverage: Coverage,
    pub(crate) category: Category,
}

impl EdgeSignature {
    pub(crate) fn from_edge(edge: &Edge) -> Self {
        EdgeSignature { coverage: edge.coverage().clone(), category: edge.category().clone() }
    }
}
