//! Pruning strategies.
//!
//! A pruning strategy sees each candidate edge before it is stored and decides
//! whether it is kept for further expansion. It may look at aggregate chart
//! state (how many edges already share the candidate's coverage, or its
//! coverage size) to implement beam-style limits, but it must be a pure
//! function of its inputs: the same chart and candidate always give the same
//! decision.
//!
//! A dropped candidate is discarded entirely; it never becomes an edge.

use crate::{Chart, Edge};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneDecision {
    Keep,
    Drop,
}

pub trait PruningStrategy: Send + Sync {
    fn evaluate(&self, candidate: &Edge, chart: &Chart) -> PruneDecision;
}

/// Never prunes.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl PruningStrategy for KeepAll {
    fn evaluate(&self, _candidate: &Edge, _chart: &Chart) -> PruneDecision {
        PruneDecision::Keep
    }
}

/// Keep at most `n` edges per exact coverage: a candidate is dropped when `n`
/// stored edges with the same coverage already score at least as well.
#[derive(Debug, Clone, Copy)]
pub struct NBestPruning {
    pub n: usize,
}

impl NBestPruning {
    pub const DEFAULT_N: usize = 5;
}

impl PruningStrategy for NBestPruning {
    fn evaluate(&self, candidate: &Edge, chart: &Chart) -> PruneDecision {
        let better = chart.live_with_coverage(candidate.coverage()).filter(|e| e.score() >= candidate.score()).count();
        if better >= self.n { PruneDecision::Drop } else { PruneDecision::Keep }
    }
}

/// Keep at most `width` edges per coverage size (a beam over partial
/// realizations of the same extent).
#[derive(Debug, Clone, Copy)]
pub struct SizeBeamPruning {
    pub width: usize,
}

impl SizeBeamPruning {
    pub const DEFAULT_WIDTH: usize = 20;
}

impl PruningStrategy for SizeBeamPruning {
    fn evaluate(&self, candidate: &Edge, chart: &Chart) -> PruneDecision {
        let size = candidate.coverage().len();
        let better = chart.live_with_coverage_size(size).filter(|e| e.score() >= candidate.score()).count();
        if better >= self.width { PruneDecision::Drop } else { PruneDecision::Keep }
    }
}
