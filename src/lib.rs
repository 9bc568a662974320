//! Chart-based surface realization.
//!
//! Given a logical form (a set of elementary predications) and a grammar, the
//! realizer searches for a sign whose semantics covers the whole input and
//! reports its words. When no single derivation covers everything it falls back
//! to the best concatenation ("join") of partial derivations that together
//! cover the input exactly once.
//!
//! ```text
//! Lf ── Grammar::transform ── seed (Grammar::seed_edges, Hypertagger)
//!                                │
//!                                v
//!              agenda ── pop ── Chart::combine ── PruningStrategy
//!                 ^                    │
//!                 └──── accepted ──────┘      (Scorer ranks everything)
//!                                │
//!                                v
//!                 Realization { best_edge, best_joined_edge }
//! ```
//!
//! ```
//! use chartrealize::{lexicon, realize, Lf, RealizerConfig};
//!
//! let grammar = lexicon![
//!     "john" => "np" : "John",
//!     "sleep" => "s\\np" : "sleeps",
//! ]
//! .unwrap();
//! let lf: Lf = "sleep(e,x) john(x)".parse().unwrap();
//!
//! let out = realize(&grammar, &lf, &RealizerConfig::default()).unwrap();
//! assert_eq!(out.best_edge().unwrap().surface(), "John sleeps");
//! assert!(out.best_joined_edge().is_none());
//! ```

#[macro_use]
mod macros;
mod api;
mod coverage;
mod engine;
mod error;
mod grammar;
mod lf;
mod policy;
mod sign;

pub use api::{Realization, RealizationStatus, RealizerConfig, realize, realize_with};
pub use coverage::Coverage;
pub use engine::{Chart, Derivation, DerivationTree, Edge, EdgeId, InsertOutcome, Realizer, RunMetrics};
pub use error::{ConfigError, GrammarError, LfParseError, RealizeError};
pub use grammar::{CategorialGrammar, Combination, Grammar, LexEntry, LexEntrySpec, LexicalSign};
pub use lf::{Directive, Ep, Lf, Request};
pub use policy::{
    ArgumentDemandHypertagger, BetaBestHypertagger, CoverageScorer, HypertagMode, Hypertagger, KeepAll,
    LexicalItem, NBestPruning, PolicyRegistry, PruneDecision, PruningStrategy, Scorer, SizeBeamPruning,
    TaggedCategory, UnigramScorer,
};
pub use sign::{Category, Sign, Slash};

/// Index of an elementary predication within its [`Lf`].
pub type EpId = usize;
