//! Edges and derivations.
//!
//! An [`Edge`] wraps a [`Sign`] with the EPs it covers, the record of how it
//! was built and its score. Edges are immutable once created; re-deriving the
//! same material produces a new edge.
//!
//! Derivation records refer to child edges by [`EdgeId`], an index into the
//! chart's arena. Children are always inserted before their parent, so child
//! ids are strictly smaller and derivations are acyclic by construction.

use crate::policy::Scorer;
use crate::{Category, Coverage, EpId, Sign};
use std::fmt;

/// Index of an edge in its chart's arena (also its insertion rank).
pub type EdgeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum Derivation {
    /// Lexical insertion, seeded from EP `ep`.
    Lexical { ep: EpId },
    /// Combination of two chart edges under a named rule; `left` precedes
    /// `right` in the surface.
    Combined { rule: &'static str, left: EdgeId, right: EdgeId },
    /// Concatenation of disjoint edges in LF order.
    Joined { parts: Vec<EdgeId> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    sign: Sign,
    coverage: Coverage,
    derivation: Derivation,
    score: f64,
}

impl Edge {
    /// An unscored edge; call [`Edge::scored`] before storing it.
    pub fn new(sign: Sign, coverage: Coverage, derivation: Derivation) -> Self {
        Edge { sign, coverage, derivation, score: 0.0 }
    }

    pub fn scored(mut self, scorer: &dyn Scorer) -> Self {
        self.score = scorer.score(&self);
        self
    }

    pub fn sign(&self) -> &Sign {
        &self.sign
    }

    pub fn category(&self) -> &Category {
        &self.sign.category
    }

    pub fn words(&self) -> &[String] {
        &self.sign.words
    }

    pub fn surface(&self) -> String {
        self.sign.surface()
    }

    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self.derivation, Derivation::Lexical { .. })
    }
}

/// A derivation with child references resolved, for reporting.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivationTree {
    Lexical { ep: EpId, category: Category, surface: String },
    Combined { rule: &'static str, category: Category, surface: String, left: Box<DerivationTree>, right: Box<DerivationTree> },
    Joined { surface: String, parts: Vec<DerivationTree> },
}

impl DerivationTree {
    pub fn surface(&self) -> &str {
        match self {
            DerivationTree::Lexical { surface, .. }
            | DerivationTree::Combined { surface, .. }
            | DerivationTree::Joined { surface, .. } => surface,
        }
    }

    /// Rule names in pre-order (`lex` for leaves, `join` for joins).
    pub fn rules(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.collect_rules(&mut out);
        out
    }

    fn collect_rules(&self, out: &mut Vec<&'static str>) {
        match self {
            DerivationTree::Lexical { .. } => out.push("lex"),
            DerivationTree::Combined { rule, left, right, .. } => {
                out.push(*rule);
                left.collect_rules(out);
                right.collect_rules(out);
            }
            DerivationTree::Joined { parts, .. } => {
                out.push("join");
                for part in parts {
                    part.collect_rules(out);
                }
            }
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let pad = "  ".repeat(depth);
        match self {
            DerivationTree::Lexical { ep, category, surface } => {
                writeln!(f, "{pad}{surface} :- {category}  (lex ep{ep})")
            }
            DerivationTree::Combined { rule, category, surface, left, right } => {
                writeln!(f, "{pad}{surface} :- {category}  ({rule})")?;
                left.write_indented(f, depth + 1)?;
                right.write_indented(f, depth + 1)
            }
            DerivationTree::Joined { surface, parts } => {
                writeln!(f, "{pad}{surface}  (join)")?;
                parts.iter().try_for_each(|part| part.write_indented(f, depth + 1))
            }
        }
    }
}

impl fmt::Display for DerivationTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
