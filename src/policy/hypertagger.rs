//! Hypertaggers.
//!
//! A hypertagger looks at one lexical item (an EP and the categories the
//! grammar can seed for it) and returns a ranked subset of those categories
//! with confidences. The realizer seeds only the returned categories and adds
//! `ln(confidence)` to the agenda priority of every edge built on them.
//! Hypertaggers never change which combinations are legal.
//!
//! Two modes:
//!
//! - [`HypertagMode::Static`]: consulted once per item before search; the chart
//!   it sees is the seeding-time chart.
//! - [`HypertagMode::ChartAware`]: additionally re-consulted whenever an edge
//!   is queued, so partial derivations can re-rank ambiguous items.
//!
//! An empty answer means "no opinion": every seed is kept at confidence 1.

use crate::{Category, Chart, Ep, EpId};

/// The lexical item a hypertagger ranks.
#[derive(Debug, Clone, Copy)]
pub struct LexicalItem<'a> {
    pub ep_id: EpId,
    pub ep: &'a Ep,
    /// Distinct categories the grammar seeded for this EP, in seed order.
    pub candidates: &'a [Category],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedCategory {
    pub category: Category,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HypertagMode {
    Static,
    ChartAware,
}

pub trait Hypertagger: Send + Sync {
    /// Ranked categories for `item`, best first.
    fn candidate_categories(&self, item: &LexicalItem<'_>, chart: &Chart) -> Vec<TaggedCategory>;

    fn mode(&self) -> HypertagMode {
        HypertagMode::Static
    }
}

/// Keeps the `beta` structurally simplest categories of each item.
///
/// Simplicity is atom count, then arity; remaining ties keep seed order.
/// Confidence is `1 / (rank + 1)`.
#[derive(Debug, Clone, Copy)]
pub struct BetaBestHypertagger {
    pub beta: usize,
}

impl BetaBestHypertagger {
    pub const DEFAULT_BETA: usize = 2;
}

impl Hypertagger for BetaBestHypertagger {
    fn candidate_categories(&self, item: &LexicalItem<'_>, _chart: &Chart) -> Vec<TaggedCategory> {
        let mut ranked: Vec<&Category> = item.candidates.iter().collect();
        ranked.sort_by_key(|c| (c.size(), c.arity()));
        ranked
            .into_iter()
            .take(self.beta)
            .enumerate()
            .map(|(rank, c)| TaggedCategory { category: c.clone(), confidence: 1.0 / (rank as f64 + 1.0) })
            .collect()
    }
}

/// Chart-aware ranking by argument demand.
///
/// A category scores higher the more live chart edges currently carry a
/// category one of its arguments asks for, i.e. the more immediately it can
/// combine. All candidates are returned; confidence is
/// `(1 + demand) / (1 + max_demand)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentDemandHypertagger;

impl Hypertagger for ArgumentDemandHypertagger {
    fn candidate_categories(&self, item: &LexicalItem<'_>, chart: &Chart) -> Vec<TaggedCategory> {
        let demand: Vec<usize> = item
            .candidates
            .iter()
            .map(|cat| {
                let args = cat.arguments();
                chart.live_edges().filter(|(_, e)| args.contains(&e.category())).count()
            })
            .collect();
        let max = demand.iter().copied().max().unwrap_or(0) as f64;

        let mut tagged: Vec<TaggedCategory> = item
            .candidates
            .iter()
            .zip(&demand)
            .map(|(cat, &d)| TaggedCategory { category: cat.clone(), confidence: (1.0 + d as f64) / (1.0 + max) })
            .collect();
        tagged.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        tagged
    }

    fn mode(&self) -> HypertagMode {
        HypertagMode::ChartAware
    }
}
