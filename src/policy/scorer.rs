//! Edge scoring.
//!
//! A scorer maps an edge to a number, higher is better. Combined with the
//! chart's insertion-order tie-break this gives a total order over edges, so
//! scorers must be deterministic and must not return NaN.
//!
//! The same scorer ranks joined edges; it then sees the concatenated surface
//! and the union coverage.

use crate::Edge;
use std::collections::HashMap;

pub trait Scorer: Send + Sync {
    fn score(&self, edge: &Edge) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&Edge) -> f64 + Send + Sync,
{
    fn score(&self, edge: &Edge) -> f64 {
        self(edge)
    }
}

/// Default scorer: one point per covered EP, minus a small brevity penalty per
/// word so that among equal coverage the shorter realization wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageScorer;

impl CoverageScorer {
    const WORD_PENALTY: f64 = 0.01;
}

impl Scorer for CoverageScorer {
    fn score(&self, edge: &Edge) -> f64 {
        edge.coverage().len() as f64 - Self::WORD_PENALTY * edge.words().len() as f64
    }
}

/// Unigram language-model scorer: sum of log10 word probabilities.
///
/// Words are lowercased before lookup; unknown words get the `oov` log
/// probability.
#[derive(Debug, Clone)]
pub struct UnigramScorer {
    log_probs: HashMap<String, f64>,
    oov: f64,
}

impl UnigramScorer {
    pub fn new(oov_log_prob: f64) -> Self {
        UnigramScorer { log_probs: HashMap::new(), oov: oov_log_prob }
    }

    /// Estimate probabilities from raw counts (maximum likelihood).
    pub fn from_counts<'a>(counts: impl IntoIterator<Item = (&'a str, u64)>, oov_log_prob: f64) -> Self {
        let counts: Vec<(&str, u64)> = counts.into_iter().filter(|(_, c)| *c > 0).collect();
        let total: u64 = counts.iter().map(|(_, c)| c).sum();
        let mut scorer = Self::new(oov_log_prob);
        for (word, count) in counts {
            scorer.log_probs.insert(word.to_lowercase(), (count as f64 / total as f64).log10());
        }
        scorer
    }

    pub fn log_prob(&self, word: &str) -> f64 {
        self.log_probs.get(&word.to_lowercase()).copied().unwrap_or(self.oov)
    }
}

impl Scorer for UnigramScorer {
    fn score(&self, edge: &Edge) -> f64 {
        edge.words().iter().map(|w| self.log_prob(w)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, Coverage, Derivation, Sign};

    fn edge(words: &str, eps: &[usize]) -> Edge {
        Edge::new(
            Sign::lexical(Category::atom("np"), words),
            Coverage::from_ids(4, eps.iter().copied()),
            Derivation::Lexical { ep: eps[0] },
        )
    }

    #[test]
    fn coverage_scorer_prefers_coverage_then_brevity() {
        let scorer = CoverageScorer;
        assert!(scorer.score(&edge("a b c", &[0, 1])) > scorer.score(&edge("a", &[0])));
        assert!(scorer.score(&edge("a", &[0])) > scorer.score(&edge("a b", &[1])));
    }

    #[test]
    fn unigram_scorer_uses_counts_and_oov_floor() {
        let scorer = UnigramScorer::from_counts([("the", 5), ("dog", 4), ("cat", 1)], -6.0);
        assert!((scorer.log_prob("The") - 0.5f64.log10()).abs() < 1e-12);
        assert_eq!(scorer.log_prob("zebra"), -6.0);
        assert!(scorer.score(&edge("the dog", &[0])) > scorer.score(&edge("the cat", &[0])));
    }

    #[test]
    fn closures_are_scorers() {
        let by_len = |e: &Edge| -(e.words().len() as f64);
        assert_eq!(by_len.score(&edge("a b", &[0])), -2.0);
    }
}
