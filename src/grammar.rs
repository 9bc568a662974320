//! The grammar collaborator.
//!
//! The realizer never knows which signs combine or how: it asks a [`Grammar`].
//! A grammar provides three things:
//!
//! ```text
//! transform(lf)        -> normalized LF       (once, before seeding)
//! seed_edges(lf, ep)   -> lexical signs        (once per EP)
//! combine(left, right) -> Option<Combination>  (many times during search)
//! ```
//!
//! Implementations must be free of side effects visible to the chart and safe
//! to share across threads: independent requests may run in parallel against
//! the same grammar.
//!
//! [`CategorialGrammar`] is a small built-in implementation (application and
//! composition over slash categories) used by the CLI and the tests.

#[path = "grammar/categorial.rs"]
mod categorial;

pub use categorial::{CategorialGrammar, LexEntry, LexEntrySpec};

use crate::lf::Lf;
use crate::{EpId, GrammarError, Sign};

/// A lexical sign together with the EPs it covers.
///
/// `coverage` always contains the EP it was seeded from, and may contain more
/// when a single entry realizes several predications.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalSign {
    pub sign: Sign,
    pub coverage: Vec<EpId>,
}

/// Result of a licensed combination: the new sign and the rule that built it.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub sign: Sign,
    pub rule: &'static str,
}

pub trait Grammar: Send + Sync {
    /// Grammar-specific LF normalization, applied once before seeding.
    fn transform(&self, lf: Lf) -> Result<Lf, GrammarError> {
        Ok(lf)
    }

    /// Lexical signs for the EP `ep` of `lf`.
    fn seed_edges(&self, lf: &Lf, ep: EpId) -> Result<Vec<LexicalSign>, GrammarError>;

    /// Combine `left` (linearly first) with `right`, if some rule licenses it.
    fn combine(&self, left: &Sign, right: &Sign) -> Option<Combination>;
}
