//! The edge chart.
//!
//! The chart owns every edge of one realization request in an arena
//! (`Vec<Edge>`, indexed by [`EdgeId`]). On top of the arena it keeps:
//!
//! - a signature index (`EdgeSignature -> EdgeId`) for dominance pruning,
//! - coverage and coverage-size indexes (statistics for pruning strategies),
//! - a completeness index (edges whose coverage realizes the whole LF).
//!
//! ## Dominance
//!
//! ```text
//! insert(e):  sig = (coverage, category)
//!             stored edge s with sig?  s.score >= e.score -> Dominated
//!                                      otherwise          -> evict s, store e
//! ```
//!
//! Evicted edges stay in the arena (derivations of other edges may point at
//! them) but are no longer *live*: they are skipped by every query and are
//! never expanded again.
//!
//! ## Completeness
//!
//! A coverage is complete when it contains every required EP and, for each
//! optional chunk, either all of it or none of it.
//!
//! ## Chunk discipline
//!
//! An edge that covers part of an obligatory chunk may only combine with
//! material from inside that chunk. Chunks are therefore completed before
//! they are attached to anything else.

use super::dedup::EdgeSignature;
use super::edge::{Derivation, DerivationTree, Edge, EdgeId};
use super::join::best_join;
use crate::grammar::Grammar;
use crate::lf::Lf;
use crate::policy::Scorer;
use crate::Coverage;
use std::collections::HashMap;
use std::sync::Arc;

/// Result of [`Chart::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Stored under `id`; `evicted` is the equivalent edge it displaced.
    Accepted { id: EdgeId, evicted: Option<EdgeId> },
    /// An equivalent stored edge (`by`) scores at least as well.
    Dominated { by: EdgeId },
}

impl InsertOutcome {
    pub fn accepted(&self) -> Option<EdgeId> {
        match *self {
            InsertOutcome::Accepted { id, .. } => Some(id),
            InsertOutcome::Dominated { .. } => None,
        }
    }
}

pub struct Chart {
    required: Coverage,
    chunks: Vec<Coverage>,
    optional: Vec<Coverage>,
    scorer: Arc<dyn Scorer>,
    edges: Vec<Edge>,
    live: Vec<bool>,
    index: HashMap<EdgeSignature, EdgeId>,
    by_coverage: HashMap<Coverage, Vec<EdgeId>>,
    by_size: HashMap<usize, Vec<EdgeId>>,
    complete: Vec<EdgeId>,
}

impl std::fmt::Debug for Chart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chart")
            .field("required", &self.required)
            .field("chunks", &self.chunks)
            .field("optional", &self.optional)
            .field("scorer", &"<scorer>")
            .field("edges", &self.edges.len())
            .field("live", &self.len())
            .field("complete", &self.complete.len())
            .finish()
    }
}

impl Chart {
    /// An empty chart for `lf`, ranking joins with `scorer`.
    pub fn new(lf: &Lf, scorer: Arc<dyn Scorer>) -> Self {
        Chart {
            required: lf.required(),
            chunks: lf.chunk_coverages(),
            optional: lf.optional_chunk_coverages(),
            scorer,
            edges: Vec::new(),
            live: Vec::new(),
            index: HashMap::new(),
            by_coverage: HashMap::new(),
            by_size: HashMap::new(),
            complete: Vec::new(),
        }
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    /// EPs a complete edge must cover.
    pub fn required(&self) -> &Coverage {
        &self.required
    }

    /// Number of EPs in the LF.
    pub fn width(&self) -> usize {
        self.required.width()
    }

    /// Number of live edges.
    pub fn len(&self) -> usize {
        self.live.iter().filter(|&&l| l).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.live.iter().any(|&l| l)
    }

    /// Number of edges ever stored, including evicted ones.
    pub fn arena_len(&self) -> usize {
        self.edges.len()
    }

    pub fn get(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn is_live(&self, id: EdgeId) -> bool {
        self.live.get(id).copied().unwrap_or(false)
    }

    /// Live edges in insertion order.
    pub fn live_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> + '_ {
        self.edges.iter().enumerate().filter(|(id, _)| self.live[*id])
    }

    /// Live edges with exactly this coverage, in insertion order.
    pub fn live_with_coverage<'a>(&'a self, coverage: &Coverage) -> impl Iterator<Item = &'a Edge> + 'a {
        self.live_ids_in(self.by_coverage.get(coverage))
    }

    /// Live edges covering exactly `size` EPs, in insertion order.
    pub fn live_with_coverage_size(&self, size: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.live_ids_in(self.by_size.get(&size))
    }

    fn live_ids_in<'a>(&'a self, ids: Option<&'a Vec<EdgeId>>) -> impl Iterator<Item = &'a Edge> + 'a {
        ids.into_iter().flatten().filter(|&&id| self.live[id]).map(|&id| &self.edges[id])
    }

    /// Store `edge` unless an equivalent edge scores at least as well.
    pub fn insert(&mut self, edge: Edge) -> InsertOutcome {
        let signature = EdgeSignature::from_edge(&edge);
        let mut evicted = None;
        if let Some(&existing) = self.index.get(&signature) {
            if self.edges[existing].score() >= edge.score() {
                tracing::trace!(by = existing, category = %edge.category(), coverage = %edge.coverage(), "dominated");
                return InsertOutcome::Dominated { by: existing };
            }
            self.live[existing] = false;
            evicted = Some(existing);
        }

        let id = self.edges.len();
        if self.is_complete(edge.coverage()) {
            self.complete.push(id);
        }
        self.by_coverage.entry(edge.coverage().clone()).or_default().push(id);
        self.by_size.entry(edge.coverage().len()).or_default().push(id);
        self.index.insert(signature, id);
        tracing::trace!(
            id,
            evicted = ?evicted,
            category = %edge.category(),
            coverage = %edge.coverage(),
            score = edge.score(),
            "stored edge"
        );
        self.edges.push(edge);
        self.live.push(true);
        InsertOutcome::Accepted { id, evicted }
    }

    /// Build (but do not store) the combination of `left` and `right`.
    ///
    /// Returns `None` when either id is unknown, coverages overlap, chunk
    /// discipline forbids the pair, or the grammar licenses no rule.
    pub fn try_combine(&self, grammar: &dyn Grammar, left: EdgeId, right: EdgeId) -> Option<Edge> {
        let (l, r) = (self.edges.get(left)?, self.edges.get(right)?);
        if l.coverage().intersects(r.coverage()) || !self.chunks_allow(l.coverage(), r.coverage()) {
            return None;
        }
        let combination = grammar.combine(l.sign(), r.sign())?;
        let edge = Edge::new(
            combination.sign,
            l.coverage().union(r.coverage()),
            Derivation::Combined { rule: combination.rule, left, right },
        );
        Some(edge.scored(self.scorer.as_ref()))
    }

    /// Combine two stored edges and insert the result.
    pub fn combine(&mut self, grammar: &dyn Grammar, left: EdgeId, right: EdgeId) -> Option<InsertOutcome> {
        let edge = self.try_combine(grammar, left, right)?;
        Some(self.insert(edge))
    }

    fn chunks_allow(&self, a: &Coverage, b: &Coverage) -> bool {
        self.chunks.iter().all(|chunk| {
            let a_partial = a.intersects(chunk) && !chunk.is_subset(a);
            let b_partial = b.intersects(chunk) && !chunk.is_subset(b);
            (!a_partial || b.is_subset(chunk)) && (!b_partial || a.is_subset(chunk))
        })
    }

    /// Every required EP, and each optional chunk wholly in or out.
    pub fn is_complete(&self, coverage: &Coverage) -> bool {
        self.required.is_subset(coverage) && self.optional_consistent(coverage)
    }

    fn optional_consistent(&self, coverage: &Coverage) -> bool {
        self.optional.iter().all(|opt| !coverage.intersects(opt) || opt.is_subset(coverage))
    }

    /// True when no obligatory or optional chunk is only partly covered.
    pub fn respects_chunks(&self, coverage: &Coverage) -> bool {
        self.optional_consistent(coverage)
            && self.chunks.iter().all(|chunk| !coverage.intersects(chunk) || chunk.is_subset(coverage))
    }

    /// Ids of live complete edges; sorted by descending score (insertion order
    /// on ties) when `sorted`, otherwise in insertion order.
    pub fn complete_edge_ids(&self, sorted: bool) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.complete.iter().copied().filter(|&id| self.live[id]).collect();
        if sorted {
            ids.sort_by(|&a, &b| self.edges[b].score().total_cmp(&self.edges[a].score()));
        }
        ids
    }

    pub fn complete_edges(&self, sorted: bool) -> Vec<&Edge> {
        self.complete_edge_ids(sorted).into_iter().map(|id| &self.edges[id]).collect()
    }

    pub fn best_edge_id(&self) -> Option<EdgeId> {
        self.complete_edge_ids(true).first().copied()
    }

    /// The highest-scoring complete edge.
    pub fn best_edge(&self) -> Option<&Edge> {
        self.best_edge_id().map(|id| &self.edges[id])
    }

    /// The best exact-cover concatenation of edges; `None` whenever a complete
    /// edge exists or no exact cover does.
    pub fn best_joined_edge(&self) -> Option<Edge> {
        best_join(self)
    }

    /// Lexical edges at the leaves of `id`'s derivation, left to right.
    pub fn lexical_leaves(&self, id: EdgeId) -> Vec<EdgeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            let Some(edge) = self.edges.get(cur) else { continue };
            match edge.derivation() {
                Derivation::Lexical { .. } => leaves.push(cur),
                Derivation::Combined { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
                Derivation::Joined { parts } => stack.extend(parts.iter().rev()),
            }
        }
        leaves
    }

    /// Resolve `edge`'s derivation against this chart.
    pub fn derivation_tree(&self, edge: &Edge) -> DerivationTree {
        match edge.derivation() {
            Derivation::Lexical { ep } => {
                DerivationTree::Lexical { ep: *ep, category: edge.category().clone(), surface: edge.surface() }
            }
            Derivation::Combined { rule, left, right } => DerivationTree::Combined {
                rule: *rule,
                category: edge.category().clone(),
                surface: edge.surface(),
                left: Box::new(self.derivation_tree(&self.edges[*left])),
                right: Box::new(self.derivation_tree(&self.edges[*right])),
            },
            Derivation::Joined { parts } => DerivationTree::Joined {
                surface: edge.surface(),
                parts: parts.iter().map(|&p| self.derivation_tree(&self.edges[p])).collect(),
            },
        }
    }
}

impl std::ops::Index<EdgeId> for Chart {
    type Output = Edge;

    fn index(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }
}
