//! Chart and search engine.
//!
//! This module is the core of the realizer. It is split into focused
//! submodules under `src/engine/`, re-exported here.
//!
//! ## How the parts work together
//!
//! ```text
//! Lf ── Grammar::transform ──┐
//!                            v
//!               Realizer::realize              (realizer.rs)
//!                 - seed lexical edges (Grammar::seed_edges + Hypertagger)
//!                 - best-first loop over the Agenda (agenda.rs)
//!                 - Chart::try_combine + PruningStrategy + Chart::insert
//!                 - budget checks between expansions
//!                            │
//!                            v
//!               Chart                          (chart.rs)
//!                 - arena of Edges (edge.rs)
//!                 - dominance by EdgeSignature (dedup.rs)
//!                 - completeness index
//!                            │
//!                            v
//!               best_edge / best_joined_edge   (join.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `edge.rs`: the immutable `Edge`, its `Derivation` record, and the resolved
//!   `DerivationTree` used for reporting.
//! - `dedup.rs`: the `(coverage, category)` signature that decides which edges
//!   are equivalent for storage.
//! - `chart.rs`: the edge store: insertion with dominance pruning, guarded
//!   combination, completeness, statistics for pruning strategies.
//! - `agenda.rs`: the priority queue of edges waiting for expansion.
//! - `join.rs`: exact-cover search for the best concatenation of edges.
//! - `realizer.rs`: the search driver and its budgets.
//! - `metrics.rs`: counters and timings for a run.
//!
//! ## Determinism
//!
//! Given the same LF, grammar and policies, a run is reproducible bit for bit:
//! edges are identified by arena index (insertion order), every ranking breaks
//! ties on that index, and no ordering decision depends on hash iteration.

#[path = "engine/agenda.rs"]
mod agenda;
#[path = "engine/chart.rs"]
mod chart;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/edge.rs"]
mod edge;
#[path = "engine/join.rs"]
mod join;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/realizer.rs"]
mod realizer;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub use chart::{Chart, InsertOutcome};
pub use edge::{Derivation, DerivationTree, Edge, EdgeId};
pub use metrics::RunMetrics;
pub use realizer::Realizer;
