//! Realization run metrics.
//!
//! Counters and timings collected by [`Realizer::realize`](crate::Realizer).
//! They cost a handful of integer increments per edge and are always
//! collected; the CLI prints them and tests use them to check budgets.

use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunMetrics {
    /// Total elapsed time, transform to join.
    pub total: Duration,
    /// Grammar transform, lexical lookup and seeding.
    pub seeding: Duration,
    /// Best-first search loop.
    pub search: Duration,
    /// Best-edge and joined-edge selection.
    pub join: Duration,
    /// Lexical edges offered to the chart.
    pub seeds: usize,
    /// Edges built by combination (the quantity the edge budget limits).
    pub created: usize,
    /// Edges stored in the chart, seeds included.
    pub accepted: usize,
    /// Candidates rejected by dominance.
    pub dominated: usize,
    /// Candidates dropped by the pruning strategy.
    pub pruned: usize,
    /// Agenda entries expanded.
    pub expansions: usize,
}
