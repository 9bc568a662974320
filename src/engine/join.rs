//! Best joined edge.
//!
//! When no single edge realizes the whole LF, the realizer can still return a
//! concatenation of edges that together cover every required EP exactly once.
//!
//! ## Rules for a valid join
//!
//! - Constituents have pairwise-disjoint coverage whose union contains every
//!   required EP.
//! - Each constituent covers every obligatory and optional chunk wholly or not
//!   at all.
//! - Constituents are concatenated in LF order (by their earliest EP).
//!
//! ## Ranking
//!
//! ```text
//! 1. scorer on the joined edge (concatenated surface, union coverage)  desc
//! 2. number of constituents                                            asc
//! 3. sum of constituent scores                                         desc
//! 4. sorted constituent ids (earliest inserted)                        asc
//! ```
//!
//! ## Search
//!
//! Every live chunk-respecting edge is a candidate: the scorer sees the
//! concatenated surface, so an edge that loses on its own can still win inside
//! a join. Covers are enumerated by a DFS that always branches on the lowest
//! uncovered required EP, so each cover is produced once. Depth limits grow
//! from one constituent upwards, so when the cap truncates a pathological
//! chart the covers with fewer constituents have already been seen.

use super::chart::Chart;
use super::edge::{Derivation, Edge, EdgeId};
use crate::{Category, Coverage, Sign};
use std::cmp::Ordering;

/// Category given to joined edges; never produced by a grammar rule.
pub(crate) const JOIN_CATEGORY: &str = "*join*";

const MAX_COVERS: usize = 10_000;

pub(crate) fn best_join(chart: &Chart) -> Option<Edge> {
    if chart.best_edge_id().is_some() || chart.required().is_empty() {
        return None;
    }

    let candidates: Vec<EdgeId> = chart
        .live_edges()
        .filter(|(_, e)| !e.coverage().is_empty() && chart.respects_chunks(e.coverage()))
        .map(|(id, _)| id)
        .collect();

    let mut search = CoverSearch { chart, candidates: &candidates, chosen: Vec::new(), best: None, covers: 0 };
    for parts in 1..=chart.required().len() {
        search.extend(&Coverage::empty(chart.width()), parts);
        if search.covers >= MAX_COVERS {
            tracing::warn!(parts, covers = search.covers, "join search truncated");
            break;
        }
    }
    let (_, edge) = search.best?;
    tracing::debug!(covers = search.covers, surface = %edge.surface(), score = edge.score(), "best join found");
    Some(edge)
}

/// Ranking key of a candidate join, minus the joined score itself.
#[derive(Debug, PartialEq)]
struct JoinRank {
    parts: usize,
    part_score: f64,
    ids: Vec<EdgeId>,
}

impl JoinRank {
    /// True when `self` beats `other` given equal joined scores.
    fn beats(&self, other: &JoinRank) -> bool {
        self.parts
            .cmp(&other.parts)
            .reverse()
            .then_with(|| self.part_score.total_cmp(&other.part_score))
            .then_with(|| other.ids.cmp(&self.ids))
            == Ordering::Greater
    }
}

struct CoverSearch<'a> {
    chart: &'a Chart,
    candidates: &'a [EdgeId],
    chosen: Vec<EdgeId>,
    best: Option<(JoinRank, Edge)>,
    covers: usize,
}

impl CoverSearch<'_> {
    /// Enumerate covers of exactly `remaining` more constituents.
    fn extend(&mut self, covered: &Coverage, remaining: usize) {
        if self.covers >= MAX_COVERS {
            return;
        }
        let uncovered = self.chart.required().difference(covered);
        let Some(next) = uncovered.first() else {
            if remaining == 0 {
                self.covers += 1;
                self.consider();
            }
            return;
        };
        if remaining == 0 {
            return;
        }
        for &id in self.candidates {
            let cov = self.chart[id].coverage();
            if !cov.contains(next) || cov.intersects(covered) {
                continue;
            }
            self.chosen.push(id);
            self.extend(&covered.union(cov), remaining - 1);
            self.chosen.pop();
        }
    }

    fn consider(&mut self) {
        let mut parts = self.chosen.clone();
        parts.sort_by_key(|&id| self.chart[id].coverage().first());
        let edge = joined_edge(self.chart, &parts);

        let mut ids = parts;
        ids.sort_unstable();
        let rank = JoinRank {
            parts: ids.len(),
            part_score: ids.iter().map(|&id| self.chart[id].score()).sum(),
            ids,
        };
        let better = match &self.best {
            None => true,
            Some((best_rank, best)) => match edge.score().total_cmp(&best.score()) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => rank.beats(best_rank),
            },
        };
        if better {
            self.best = Some((rank, edge));
        }
    }
}

/// Concatenate `parts` (already in LF order) into one scored edge.
fn joined_edge(chart: &Chart, parts: &[EdgeId]) -> Edge {
    let mut words = Vec::new();
    let mut coverage = Coverage::empty(chart.width());
    for &id in parts {
        words.extend(chart[id].words().iter().cloned());
        coverage = coverage.union(chart[id].coverage());
    }
    let sign = Sign::new(Category::atom(JOIN_CATEGORY), words);
    Edge::new(sign, coverage, Derivation::Joined { parts: parts.to_vec() }).scored(chart.scorer())
}
