//! The search driver.
//!
//! `Realizer::realize` runs one request from LF to [`Realization`]:
//!
//! ```text
//! transform ─> validate ─> seed every EP ─> hypertag ─> insert seeds
//!                 │                                         │
//!                 └── any GrammarError aborts here          v
//!                                       ┌──── agenda (score + hypertag weight)
//!                                       │         │ pop best
//!                                       │         v
//!                                       │   combine with every expanded live
//!                                       │   edge of disjoint coverage, both
//!                                       │   orders ─> prune ─> Chart::insert
//!                                       └──── accepted
//! ```
//!
//! Budgets are cooperative: the edge budget (edges created by combination,
//! seeds excluded) is checked before every combination attempt, the time
//! budget between expansions. Stopping on a budget with work left on the
//! agenda sets [`RealizationStatus::BUDGET_EXCEEDED`]; it is never an error.

use super::agenda::Agenda;
use super::chart::{Chart, InsertOutcome};
use super::edge::{Derivation, Edge, EdgeId};
use super::metrics::RunMetrics;
use crate::api::{Realization, RealizationStatus, RealizerConfig};
use crate::grammar::{Grammar, LexicalSign};
use crate::policy::{
    CoverageScorer, HypertagMode, Hypertagger, LexicalItem, PolicyRegistry, PruneDecision, PruningStrategy, Scorer,
};
use crate::{Category, ConfigError, Coverage, GrammarError, Lf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Confidences are clamped to this floor before taking the logarithm, so a
/// zero-confidence tag lowers priority without producing `-inf`.
const MIN_CONFIDENCE: f64 = 1e-6;

/// Realizes logical forms against one grammar with a fixed set of policies.
///
/// A `Realizer` is immutable once built; one instance can serve any number of
/// requests, from any number of threads.
pub struct Realizer<'g> {
    grammar: &'g dyn Grammar,
    scorer: Arc<dyn Scorer>,
    pruning: Option<Arc<dyn PruningStrategy>>,
    hypertagger: Option<Arc<dyn Hypertagger>>,
    edge_budget: Option<usize>,
    time_budget: Option<Duration>,
}

impl std::fmt::Debug for Realizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Realizer")
            .field("pruning", &self.pruning.is_some())
            .field("hypertagger", &self.hypertagger.is_some())
            .field("edge_budget", &self.edge_budget)
            .field("time_budget", &self.time_budget)
            .finish()
    }
}

impl<'g> Realizer<'g> {
    /// A realizer with the default scorer, no policies and no budgets.
    pub fn new(grammar: &'g dyn Grammar) -> Self {
        Realizer {
            grammar,
            scorer: Arc::new(CoverageScorer),
            pruning: None,
            hypertagger: None,
            edge_budget: None,
            time_budget: None,
        }
    }

    /// Resolve `config`'s policy identifiers through `registry`.
    ///
    /// Unknown identifiers fail here, before any request is seeded.
    pub fn from_config(
        grammar: &'g dyn Grammar,
        config: &RealizerConfig,
        registry: &PolicyRegistry,
    ) -> Result<Self, ConfigError> {
        let mut realizer = Realizer::new(grammar);
        if let Some(id) = &config.pruning_strategy {
            realizer.pruning = Some(registry.pruning_strategy(id)?);
        }
        if let Some(id) = &config.hypertagger {
            realizer.hypertagger = Some(registry.hypertagger(id)?);
        }
        realizer.edge_budget = config.edge_budget;
        realizer.time_budget = config.time_budget;
        Ok(realizer)
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_pruning_strategy(mut self, pruning: Arc<dyn PruningStrategy>) -> Self {
        self.pruning = Some(pruning);
        self
    }

    pub fn with_hypertagger(mut self, hypertagger: Arc<dyn Hypertagger>) -> Self {
        self.hypertagger = Some(hypertagger);
        self
    }

    pub fn with_edge_budget(mut self, budget: Option<usize>) -> Self {
        self.edge_budget = budget;
        self
    }

    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.time_budget = budget;
        self
    }

    /// Realize `lf`.
    ///
    /// Errors are grammar faults only, and all of them are raised before the
    /// search starts. A request that finds nothing returns a [`Realization`]
    /// whose [`is_failure`](Realization::is_failure) is true.
    pub fn realize(&self, lf: &Lf) -> Result<Realization, GrammarError> {
        let started = Instant::now();
        let mut metrics = RunMetrics::default();

        let lf = self.grammar.transform(lf.clone())?;
        lf.validate()?;
        let seeds = self.lexical_seeds(&lf)?;

        let mut run = Search {
            realizer: self,
            chart: Chart::new(&lf, Arc::clone(&self.scorer)),
            agenda: Agenda::new(),
            weights: Vec::new(),
            candidates: seeds.iter().map(|item| distinct_categories(item)).collect(),
            lf: &lf,
            metrics: &mut metrics,
        };
        let tagged = run.hypertag(seeds);
        for (sign, weight, ep) in tagged {
            run.seed(sign, weight, ep);
        }
        let seed_count = run.chart.len();
        run.metrics.seeding = started.elapsed();
        tracing::debug!(eps = lf.len(), seeds = run.metrics.seeds, live = seed_count, "seeded chart");

        let search_started = Instant::now();
        let exceeded = run.search(started);
        let Search { chart, .. } = run;
        metrics.search = search_started.elapsed();

        let join_started = Instant::now();
        let best_edge = chart.best_edge_id();
        let best_joined = chart.best_joined_edge();
        metrics.join = join_started.elapsed();

        let mut status = RealizationStatus::empty();
        status.set(RealizationStatus::COMPLETE, best_edge.is_some());
        status.set(RealizationStatus::JOINED, best_joined.is_some());
        status.set(RealizationStatus::BUDGET_EXCEEDED, exceeded);
        metrics.total = started.elapsed();

        tracing::debug!(
            status = ?status,
            edges = chart.len(),
            created = metrics.created,
            pruned = metrics.pruned,
            dominated = metrics.dominated,
            expansions = metrics.expansions,
            total = ?metrics.total,
            "realization finished"
        );
        Ok(Realization::new(chart, best_edge, best_joined, status, metrics))
    }

    /// Ask the grammar for every EP's lexical signs up front, so that a fault
    /// on any EP aborts the request before the chart sees a single edge.
    fn lexical_seeds(&self, lf: &Lf) -> Result<Vec<Vec<LexicalSign>>, GrammarError> {
        (0..lf.len())
            .map(|ep| {
                let signs = self.grammar.seed_edges(lf, ep)?;
                for sign in &signs {
                    if let Some(&bad) = sign.coverage.iter().find(|&&id| id >= lf.len()) {
                        return Err(GrammarError::MalformedLf(format!(
                            "lexical sign for EP {ep} covers unknown EP {bad}"
                        )));
                    }
                }
                Ok(signs)
            })
            .collect()
    }

    fn edge_budget_spent(&self, created: usize) -> bool {
        self.edge_budget.is_some_and(|budget| created >= budget)
    }

    fn time_budget_spent(&self, started: Instant) -> bool {
        self.time_budget.is_some_and(|budget| started.elapsed() >= budget)
    }
}

/// Mutable state of one request.
struct Search<'r, 'g> {
    realizer: &'r Realizer<'g>,
    lf: &'r Lf,
    chart: Chart,
    agenda: Agenda,
    /// Static hypertag weight per arena id (sum of `ln(confidence)` over the
    /// edge's lexical leaves).
    weights: Vec<f64>,
    /// Distinct seeded categories per EP, in seed order.
    candidates: Vec<Vec<Category>>,
    metrics: &'r mut RunMetrics,
}

impl Search<'_, '_> {
    /// Restrict each EP's seeds to the hypertagger's categories and attach a
    /// weight to every survivor. Without a hypertagger every seed has weight 0.
    fn hypertag(&self, seeds: Vec<Vec<LexicalSign>>) -> Vec<(LexicalSign, f64, usize)> {
        let mut out = Vec::new();
        for (ep, signs) in seeds.into_iter().enumerate() {
            let Some(tagger) = &self.realizer.hypertagger else {
                out.extend(signs.into_iter().map(|s| (s, 0.0, ep)));
                continue;
            };
            let item = self.item(ep);
            let tags = tagger.candidate_categories(&item, &self.chart);
            if tags.is_empty() {
                out.extend(signs.into_iter().map(|s| (s, 0.0, ep)));
                continue;
            }

            let kept: Vec<(LexicalSign, f64, usize)> = signs
                .iter()
                .filter_map(|s| {
                    let tag = tags.iter().find(|t| t.category == s.sign.category)?;
                    Some((s.clone(), confidence_weight(tag.confidence), ep))
                })
                .collect();
            if kept.is_empty() && !signs.is_empty() {
                tracing::debug!(ep, pred = %item.ep.pred, "hypertagger kept no seed; using all");
                out.extend(signs.into_iter().map(|s| (s, 0.0, ep)));
            } else {
                tracing::trace!(ep, kept = kept.len(), of = signs.len(), "hypertagged");
                out.extend(kept);
            }
        }
        out
    }

    fn item(&self, ep: usize) -> LexicalItem<'_> {
        LexicalItem { ep_id: ep, ep: &self.lf.eps()[ep], candidates: &self.candidates[ep] }
    }

    fn seed(&mut self, sign: LexicalSign, weight: f64, ep: usize) {
        self.metrics.seeds += 1;
        let mut coverage = Coverage::from_ids(self.lf.len(), sign.coverage);
        coverage.insert(ep);
        let edge = Edge::new(sign.sign, coverage, Derivation::Lexical { ep }).scored(self.chart.scorer());
        self.store(edge, weight);
    }

    /// Insert `edge`; queue it if accepted.
    fn store(&mut self, edge: Edge, weight: f64) -> Option<EdgeId> {
        match self.chart.insert(edge) {
            InsertOutcome::Accepted { id, .. } => {
                self.metrics.accepted += 1;
                debug_assert_eq!(self.weights.len(), id);
                self.weights.push(weight);
                let priority = self.chart[id].score() + self.priority_weight(id);
                self.agenda.push(id, priority);
                Some(id)
            }
            InsertOutcome::Dominated { .. } => {
                self.metrics.dominated += 1;
                None
            }
        }
    }

    /// Hypertag weight used for `id`'s agenda priority. Chart-aware taggers
    /// re-rank every lexical leaf against the current chart.
    fn priority_weight(&self, id: EdgeId) -> f64 {
        let Some(tagger) = &self.realizer.hypertagger else {
            return self.weights[id];
        };
        if tagger.mode() != HypertagMode::ChartAware {
            return self.weights[id];
        }
        self.chart
            .lexical_leaves(id)
            .into_iter()
            .map(|leaf| {
                let Derivation::Lexical { ep } = *self.chart[leaf].derivation() else {
                    return 0.0;
                };
                let tags = tagger.candidate_categories(&self.item(ep), &self.chart);
                if tags.is_empty() {
                    return 0.0;
                }
                let category = self.chart[leaf].category();
                tags.iter()
                    .find(|t| t.category == *category)
                    .map_or(MIN_CONFIDENCE.ln(), |t| confidence_weight(t.confidence))
            })
            .sum()
    }

    /// Run the best-first loop; returns whether a budget stopped it early.
    fn search(&mut self, started: Instant) -> bool {
        let mut expanded: Vec<EdgeId> = Vec::new();
        loop {
            // Entries of evicted edges are not pending work.
            while let Some(id) = self.agenda.peek() {
                if self.chart.is_live(id) {
                    break;
                }
                self.agenda.pop();
            }
            if self.agenda.is_empty() {
                break;
            }
            if self.realizer.edge_budget_spent(self.metrics.created) || self.realizer.time_budget_spent(started) {
                tracing::debug!(pending = self.agenda.len(), created = self.metrics.created, "budget exhausted");
                return true;
            }
            let Some(id) = self.agenda.pop() else { break };
            self.metrics.expansions += 1;
            tracing::trace!(id, category = %self.chart[id].category(), coverage = %self.chart[id].coverage(), "expand");

            let partners: Vec<EdgeId> = expanded
                .iter()
                .copied()
                .filter(|&other| {
                    self.chart.is_live(other) && self.chart[other].coverage().is_disjoint(self.chart[id].coverage())
                })
                .collect();
            expanded.push(id);

            for other in partners {
                for (left, right) in [(id, other), (other, id)] {
                    if self.realizer.edge_budget_spent(self.metrics.created) {
                        tracing::debug!(created = self.metrics.created, "edge budget exhausted mid-expansion");
                        return true;
                    }
                    self.try_combine(left, right);
                }
            }
        }
        false
    }

    fn try_combine(&mut self, left: EdgeId, right: EdgeId) {
        let Some(edge) = self.chart.try_combine(self.realizer.grammar, left, right) else {
            return;
        };
        self.metrics.created += 1;
        if let Some(pruning) = &self.realizer.pruning {
            if pruning.evaluate(&edge, &self.chart) == PruneDecision::Drop {
                self.metrics.pruned += 1;
                tracing::trace!(left, right, category = %edge.category(), "pruned");
                return;
            }
        }
        let weight = self.weights[left] + self.weights[right];
        self.store(edge, weight);
    }
}

fn distinct_categories(signs: &[LexicalSign]) -> Vec<Category> {
    let mut out: Vec<Category> = Vec::new();
    for sign in signs {
        if !out.contains(&sign.sign.category) {
            out.push(sign.sign.category.clone());
        }
    }
    out
}

fn confidence_weight(confidence: f64) -> f64 {
    confidence.max(MIN_CONFIDENCE).min(1.0).ln()
}
