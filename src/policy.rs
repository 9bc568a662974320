//! Search policies.
//!
//! Three independent capabilities steer the search without changing what the
//! grammar licenses:
//!
//! - [`Scorer`] (`scorer.rs`): ranks edges, and joined edges by their surface.
//! - [`PruningStrategy`] (`pruning.rs`): decides whether a candidate edge is
//!   kept for further expansion.
//! - [`Hypertagger`] (`hypertagger.rs`): restricts and ranks the lexical
//!   categories seeded for each EP.
//!
//! Concrete pruning strategies and hypertaggers are selected by name through a
//! [`PolicyRegistry`] (`registry.rs`) and shared read-only (`Arc`) for the
//! duration of a request. All three traits require `Send + Sync` so one
//! configured policy can serve concurrent requests.

#[path = "policy/hypertagger.rs"]
mod hypertagger;
#[path = "policy/pruning.rs"]
mod pruning;
#[path = "policy/registry.rs"]
mod registry;
#[path = "policy/scorer.rs"]
mod scorer;

pub use hypertagger::{
    ArgumentDemandHypertagger, BetaBestHypertagger, HypertagMode, Hypertagger, LexicalItem, TaggedCategory,
};
pub use pruning::{KeepAll, NBestPruning, PruneDecision, PruningStrategy, SizeBeamPruning};
pub use registry::PolicyRegistry;
pub use scorer::{CoverageScorer, Scorer, UnigramScorer};
