//! Name-keyed policy registry.
//!
//! Configuration names policies by string identifier: `name` or
//! `name:argument` (for example `n-best:3`). The registry maps each name to a
//! factory function; an unregistered name is a [`ConfigError`], raised before
//! any search starts.
//!
//! Built-in entries:
//!
//! | kind        | name              | argument          |
//! |-------------|-------------------|-------------------|
//! | pruning     | `keep-all`        | none              |
//! | pruning     | `n-best`          | N (default 5)     |
//! | pruning     | `size-beam`       | width (default 20)|
//! | hypertagger | `beta-best`       | beta (default 2)  |
//! | hypertagger | `argument-demand` | none              |

use super::hypertagger::{ArgumentDemandHypertagger, BetaBestHypertagger, Hypertagger};
use super::pruning::{KeepAll, NBestPruning, PruningStrategy, SizeBeamPruning};
use crate::ConfigError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

pub type PruningFactory = fn(Option<&str>) -> Result<Arc<dyn PruningStrategy>, ConfigError>;
pub type HypertaggerFactory = fn(Option<&str>) -> Result<Arc<dyn Hypertagger>, ConfigError>;

static DEFAULT_REGISTRY: Lazy<PolicyRegistry> = Lazy::new(PolicyRegistry::builtin);

#[derive(Clone, Default)]
pub struct PolicyRegistry {
    pruning: HashMap<&'static str, PruningFactory>,
    hypertaggers: HashMap<&'static str, HypertaggerFactory>,
}

impl std::fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("pruning", &self.pruning_names())
            .field("hypertaggers", &self.hypertagger_names())
            .finish()
    }
}

impl PolicyRegistry {
    /// A registry with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the built-in policies.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register_pruning("keep-all", |arg| {
            no_argument("keep-all", arg)?;
            Ok(Arc::new(KeepAll))
        });
        registry.register_pruning("n-best", |arg| {
            Ok(Arc::new(NBestPruning { n: count_argument("n-best", arg, NBestPruning::DEFAULT_N)? }))
        });
        registry.register_pruning("size-beam", |arg| {
            Ok(Arc::new(SizeBeamPruning { width: count_argument("size-beam", arg, SizeBeamPruning::DEFAULT_WIDTH)? }))
        });
        registry.register_hypertagger("beta-best", |arg| {
            Ok(Arc::new(BetaBestHypertagger {
                beta: count_argument("beta-best", arg, BetaBestHypertagger::DEFAULT_BETA)?,
            }))
        });
        registry.register_hypertagger("argument-demand", |arg| {
            no_argument("argument-demand", arg)?;
            Ok(Arc::new(ArgumentDemandHypertagger))
        });
        registry
    }

    /// The process-wide registry of built-in policies.
    pub fn global() -> &'static PolicyRegistry {
        &DEFAULT_REGISTRY
    }

    pub fn register_pruning(&mut self, name: &'static str, factory: PruningFactory) {
        self.pruning.insert(name, factory);
    }

    pub fn register_hypertagger(&mut self, name: &'static str, factory: HypertaggerFactory) {
        self.hypertaggers.insert(name, factory);
    }

    pub fn pruning_strategy(&self, id: &str) -> Result<Arc<dyn PruningStrategy>, ConfigError> {
        let (name, arg) = split_id(id);
        let factory = self.pruning.get(name).ok_or_else(|| ConfigError::UnknownPruningStrategy(id.to_string()))?;
        factory(arg)
    }

    pub fn hypertagger(&self, id: &str) -> Result<Arc<dyn Hypertagger>, ConfigError> {
        let (name, arg) = split_id(id);
        let factory = self.hypertaggers.get(name).ok_or_else(|| ConfigError::UnknownHypertagger(id.to_string()))?;
        factory(arg)
    }

    /// Registered pruning strategy names, sorted.
    pub fn pruning_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.pruning.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Registered hypertagger names, sorted.
    pub fn hypertagger_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.hypertaggers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

fn split_id(id: &str) -> (&str, Option<&str>) {
    match id.trim().split_once(':') {
        Some((name, arg)) => (name.trim(), Some(arg.trim())),
        None => (id.trim(), None),
    }
}

fn no_argument(policy: &str, arg: Option<&str>) -> Result<(), ConfigError> {
    match arg {
        None => Ok(()),
        Some(arg) => Err(ConfigError::InvalidArgument {
            policy: policy.to_string(),
            argument: arg.to_string(),
            reason: "takes no argument".to_string(),
        }),
    }
}

fn count_argument(policy: &str, arg: Option<&str>, default: usize) -> Result<usize, ConfigError> {
    let Some(arg) = arg else { return Ok(default) };
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidArgument {
            policy: policy.to_string(),
            argument: arg.to_string(),
            reason: "expected a positive integer".to_string(),
        }),
    }
}
