use crate::engine::{Chart, DerivationTree, Edge, EdgeId, Realizer, RunMetrics};
use crate::{Directive, Grammar, Lf, PolicyRegistry, RealizeError};
use bitflags::bitflags;
use std::time::Duration;

/// Realizer configuration.
///
/// `None` means "no policy" for the policy fields and "unlimited" for the
/// budgets. Policy fields hold registry identifiers (`name` or
/// `name:argument`, see [`PolicyRegistry`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealizerConfig {
    pub pruning_strategy: Option<String>,
    pub hypertagger: Option<String>,
    /// Maximum number of edges built by combination (seeds are free).
    pub edge_budget: Option<usize>,
    /// Wall-clock limit for one request, checked between expansions.
    pub time_budget: Option<Duration>,
}

impl RealizerConfig {
    /// Override one field from a request directive.
    pub fn apply(&mut self, directive: &Directive) {
        match directive {
            Directive::PruningStrategy(id) => self.pruning_strategy = id.clone(),
            Directive::Hypertagger(id) => self.hypertagger = id.clone(),
            Directive::EdgeBudget(n) => self.edge_budget = *n,
            Directive::TimeBudget(d) => self.time_budget = *d,
        }
    }

    pub fn with_directives<'a>(mut self, directives: impl IntoIterator<Item = &'a Directive>) -> Self {
        for directive in directives {
            self.apply(directive);
        }
        self
    }
}

bitflags! {
    /// Outcome flags of one realization.
    ///
    /// The empty set means "no realization found": nothing complete, no
    /// exact-cover join, search ran to the end.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RealizationStatus: u8 {
        /// A complete edge exists.
        const COMPLETE = 1 << 0;
        /// No complete edge, but an exact-cover join exists.
        const JOINED = 1 << 1;
        /// Search stopped on the edge or time budget with work left.
        const BUDGET_EXCEEDED = 1 << 2;
    }
}

/// Result from [`realize`], [`realize_with`] and [`Realizer::realize`].
///
/// Owns the final chart, so every edge and derivation stays inspectable.
#[derive(Debug)]
pub struct Realization {
    chart: Chart,
    best_edge: Option<EdgeId>,
    best_joined: Option<Edge>,
    status: RealizationStatus,
    metrics: RunMetrics,
}

impl Realization {
    pub(crate) fn new(
        chart: Chart,
        best_edge: Option<EdgeId>,
        best_joined: Option<Edge>,
        status: RealizationStatus,
        metrics: RunMetrics,
    ) -> Self {
        Realization { chart, best_edge, best_joined, status, metrics }
    }

    /// The highest-scoring complete edge.
    pub fn best_edge(&self) -> Option<&Edge> {
        self.best_edge.map(|id| &self.chart[id])
    }

    pub fn best_edge_id(&self) -> Option<EdgeId> {
        self.best_edge
    }

    /// The best exact-cover join; only present when no complete edge exists.
    pub fn best_joined_edge(&self) -> Option<&Edge> {
        self.best_joined.as_ref()
    }

    pub fn status(&self) -> RealizationStatus {
        self.status
    }

    /// True when a budget cut the search short; the result may be suboptimal.
    pub fn is_partial(&self) -> bool {
        self.status.contains(RealizationStatus::BUDGET_EXCEEDED)
    }

    /// True when neither a complete edge nor a join was found.
    pub fn is_failure(&self) -> bool {
        !self.status.intersects(RealizationStatus::COMPLETE | RealizationStatus::JOINED)
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    /// Complete edges, best first when `sorted`.
    pub fn complete_edges(&self, sorted: bool) -> Vec<&Edge> {
        self.chart.complete_edges(sorted)
    }

    /// Resolve the derivation of an edge of this realization (including the
    /// joined edge, which is not stored in the chart).
    pub fn derivation(&self, edge: &Edge) -> DerivationTree {
        self.chart.derivation_tree(edge)
    }
}

/// Realize `lf` with `config`, resolving policies through the built-in
/// registry.
///
/// # Example
/// ```
/// use chartrealize::{lexicon, realize, Lf, RealizerConfig};
///
/// let grammar = lexicon![
///     "rain" => "s" : "it rains",
///     "now" => "adv" : "now",
/// ]
/// .unwrap();
/// let lf: Lf = "rain(e) now(e)".parse().unwrap();
///
/// let out = realize(&grammar, &lf, &RealizerConfig::default()).unwrap();
/// assert!(out.best_edge().is_none());
/// assert_eq!(out.best_joined_edge().unwrap().surface(), "it rains now");
/// ```
pub fn realize(grammar: &dyn Grammar, lf: &Lf, config: &RealizerConfig) -> Result<Realization, RealizeError> {
    realize_with(grammar, lf, config, PolicyRegistry::global())
}

/// Like [`realize`], with a caller-supplied policy registry.
pub fn realize_with(
    grammar: &dyn Grammar,
    lf: &Lf,
    config: &RealizerConfig,
    registry: &PolicyRegistry,
) -> Result<Realization, RealizeError> {
    let realizer = Realizer::from_config(grammar, config, registry)?;
    Ok(realizer.realize(lf)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigError, Request};

    #[test]
    fn directives_override_config() {
        let request: Request =
            "@pruning-strategy n-best:2\n@edge-budget 10\n@hypertagger none\np(x)".parse().unwrap();
        let base = RealizerConfig { hypertagger: Some("beta-best".into()), ..RealizerConfig::default() };

        let config = base.with_directives(&request.directives);
        assert_eq!(config.pruning_strategy.as_deref(), Some("n-best:2"));
        assert_eq!(config.hypertagger, None);
        assert_eq!(config.edge_budget, Some(10));
        assert_eq!(config.time_budget, None);
    }

    #[test]
    fn realize_reports_success_and_metrics() {
        let grammar = lexicon!["john" => "np" : "John", "sleep" => "s\\np" : "sleeps"].unwrap();
        let lf: Lf = "sleep(e,x) john(x)".parse().unwrap();

        let out = realize(&grammar, &lf, &RealizerConfig::default()).unwrap();
        assert_eq!(out.status(), RealizationStatus::COMPLETE);
        assert!(!out.is_failure());
        assert!(!out.is_partial());
        assert_eq!(out.best_edge_id().map(|id| out.chart()[id].surface()), Some("John sleeps".to_string()));
        assert_eq!(out.metrics().seeds, 2);
        assert_eq!(out.metrics().created, 1);
        assert!(out.metrics().total >= out.metrics().search);

        let best = out.best_edge().unwrap();
        assert_eq!(out.derivation(best).rules(), vec!["<", "lex", "lex"]);
    }

    #[test]
    fn unknown_policy_is_a_config_error() {
        let grammar = lexicon!["rain" => "s" : "it rains"].unwrap();
        let lf: Lf = "rain(e)".parse().unwrap();
        let config = RealizerConfig { pruning_strategy: Some("nope".into()), ..RealizerConfig::default() };

        let err = realize(&grammar, &lf, &config).unwrap_err();
        assert_eq!(err, RealizeError::Config(ConfigError::UnknownPruningStrategy("nope".into())));
    }

    #[test]
    fn empty_registry_rejects_builtin_names() {
        let grammar = lexicon!["rain" => "s" : "it rains"].unwrap();
        let lf: Lf = "rain(e)".parse().unwrap();
        let config = RealizerConfig { hypertagger: Some("beta-best".into()), ..RealizerConfig::default() };

        let err = realize_with(&grammar, &lf, &config, &PolicyRegistry::empty()).unwrap_err();
        assert!(matches!(err, RealizeError::Config(ConfigError::UnknownHypertagger(_))));
    }
}
