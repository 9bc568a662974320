//! Logical forms.
//!
//! An [`Lf`] is the immutable semantic input of one realization request: a
//! list of elementary predications (EPs) in LF order, plus chunk groupings.
//!
//! - **Obligatory chunks** group EPs that must be realized together: an edge
//!   that starts a chunk has to complete it before it can absorb anything
//!   outside the chunk.
//! - **Optional chunks** may be realized or left out, but only as a whole.
//!
//! EP ids are positions in [`Lf::eps`]. That order is the LF's linear order and
//! is the order joined edges are concatenated in.
//!
//! ## Text notation
//!
//! ```text
//! { buy(e,x,y) john(x) } [ red(y) ] car(y)
//! ```
//!
//! `pred(args)` or bare `pred` EPs, optionally separated by `^` or `&`;
//! `{ ... }` marks an obligatory chunk, `[ ... ]` an optional one. Chunks do not
//! nest. A request file may also carry `@` directive lines (see [`Directive`])
//! and `#` comments.

use crate::EpId;
use crate::coverage::Coverage;
use crate::error::{GrammarError, LfParseError};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Elementary predication: a predicate with its argument variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ep {
    pub pred: String,
    pub args: Vec<String>,
}

impl Ep {
    pub fn new(pred: impl Into<String>, args: &[&str]) -> Self {
        Ep { pred: pred.into(), args: args.iter().map(|a| a.to_string()).collect() }
    }

    /// True when both EPs mention at least one common argument variable.
    pub fn shares_argument(&self, other: &Ep) -> bool {
        self.args.iter().any(|a| other.args.contains(a))
    }
}

impl fmt::Display for Ep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() { write!(f, "{}", self.pred) } else { write!(f, "{}({})", self.pred, self.args.join(",")) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lf {
    eps: Vec<Ep>,
    chunks: Vec<Vec<EpId>>,
    optional: Vec<Vec<EpId>>,
}

impl Lf {
    pub fn new(eps: Vec<Ep>) -> Self {
        Lf { eps, chunks: Vec::new(), optional: Vec::new() }
    }

    /// Add an obligatory chunk.
    pub fn with_chunk(mut self, ids: impl IntoIterator<Item = EpId>) -> Self {
        self.chunks.push(ids.into_iter().collect());
        self
    }

    /// Add an optional chunk.
    pub fn with_optional(mut self, ids: impl IntoIterator<Item = EpId>) -> Self {
        self.optional.push(ids.into_iter().collect());
        self
    }

    pub fn eps(&self) -> &[Ep] {
        &self.eps
    }

    pub fn ep(&self, id: EpId) -> Option<&Ep> {
        self.eps.get(id)
    }

    pub fn len(&self) -> usize {
        self.eps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eps.is_empty()
    }

    pub fn chunks(&self) -> &[Vec<EpId>] {
        &self.chunks
    }

    pub fn optional_chunks(&self) -> &[Vec<EpId>] {
        &self.optional
    }

    /// Rewrite every EP in place, keeping ids and chunk structure.
    pub fn map_eps(mut self, f: impl FnMut(Ep) -> Ep) -> Self {
        self.eps = self.eps.into_iter().map(f).collect();
        self
    }

    pub fn all(&self) -> Coverage {
        Coverage::full(self.len())
    }

    /// EPs that any complete realization must cover.
    pub fn required(&self) -> Coverage {
        self.optional_chunk_coverages().iter().fold(self.all(), |acc, opt| acc.difference(opt))
    }

    pub fn chunk_coverages(&self) -> Vec<Coverage> {
        self.chunks.iter().map(|ids| Coverage::from_ids(self.len(), ids.iter().copied())).collect()
    }

    pub fn optional_chunk_coverages(&self) -> Vec<Coverage> {
        self.optional.iter().map(|ids| Coverage::from_ids(self.len(), ids.iter().copied())).collect()
    }

    /// Structural checks: non-empty, chunk ids in range, no empty chunks and
    /// pairwise-disjoint optional chunks.
    pub fn validate(&self) -> Result<(), GrammarError> {
        if self.eps.is_empty() {
            return Err(GrammarError::MalformedLf("no predications".to_string()));
        }
        for (kind, groups) in [("chunk", &self.chunks), ("optional chunk", &self.optional)] {
            for ids in groups {
                if ids.is_empty() {
                    return Err(GrammarError::MalformedLf(format!("empty {kind}")));
                }
                if let Some(bad) = ids.iter().find(|&&id| id >= self.eps.len()) {
                    return Err(GrammarError::MalformedLf(format!("{kind} refers to missing EP {bad}")));
                }
            }
        }
        let opts = self.optional_chunk_coverages();
        for (i, a) in opts.iter().enumerate() {
            if opts[i + 1..].iter().any(|b| a.intersects(b)) {
                return Err(GrammarError::MalformedLf("optional chunks overlap".to_string()));
            }
        }
        let chunks = self.chunk_coverages();
        for (i, a) in chunks.iter().enumerate() {
            let crossing = |b: &Coverage| a.intersects(b) && !a.is_subset(b) && !b.is_subset(a);
            if chunks[i + 1..].iter().any(crossing) {
                return Err(GrammarError::MalformedLf("chunks overlap without nesting".to_string()));
            }
            if opts.iter().any(|b| a.intersects(b)) {
                return Err(GrammarError::MalformedLf("chunk overlaps an optional chunk".to_string()));
            }
        }
        if self.eps.iter().any(|ep| ep.pred.trim().is_empty()) {
            return Err(GrammarError::MalformedLf("empty predicate name".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Lf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chunk_of = |id: EpId| self.chunks.iter().position(|c| c.contains(&id));
        let opt_of = |id: EpId| self.optional.iter().position(|c| c.contains(&id));
        let mut open: Option<(char, usize)> = None;
        let mut first = true;
        for (id, ep) in self.eps.iter().enumerate() {
            let group = opt_of(id).map(|g| ('[', g)).or_else(|| chunk_of(id).map(|g| ('{', g)));
            if group != open {
                if let Some((kind, _)) = open {
                    write!(f, " {}", if kind == '[' { ']' } else { '}' })?;
                }
                if let Some((kind, _)) = group {
                    write!(f, "{}{kind}", if first { "" } else { " " })?;
                    first = false;
                }
                open = group;
            }
            write!(f, "{}{ep}", if first { "" } else { " " })?;
            first = false;
        }
        if let Some((kind, _)) = open {
            write!(f, " {}", if kind == '[' { ']' } else { '}' })?;
        }
        Ok(())
    }
}

impl FromStr for Lf {
    type Err = LfParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let re = regex!(
            r"(?P<open>[\{\[])|(?P<close>[\}\]])|(?P<sep>[\^&])|(?P<pred>[A-Za-z_][\w.:'-]*)(?:\s*\((?P<args>[^()]*)\))?|(?P<bad>\S)"
        );
        let mut eps = Vec::new();
        let mut chunks = Vec::new();
        let mut optional = Vec::new();
        // (opening char, byte offset, members)
        let mut open: Option<(char, usize, Vec<EpId>)> = None;

        for caps in re.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if let Some(m) = caps.name("open") {
                if open.is_some() {
                    return Err(LfParseError::NestedChunk(m.start()));
                }
                let kind = m.as_str().chars().next().unwrap_or('{');
                open = Some((kind, m.start(), Vec::new()));
            } else if let Some(m) = caps.name("close") {
                let close = m.as_str().chars().next().unwrap_or('}');
                match open.take() {
                    Some(('{', _, ids)) if close == '}' => chunks.push(ids),
                    Some(('[', _, ids)) if close == ']' => optional.push(ids),
                    _ => return Err(LfParseError::Unbalanced(close)),
                }
            } else if let Some(m) = caps.name("pred") {
                let args = caps
                    .name("args")
                    .map(|a| a.as_str().split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
                    .unwrap_or_default();
                let id = eps.len();
                eps.push(Ep { pred: m.as_str().to_string(), args });
                if let Some((_, _, ids)) = open.as_mut() {
                    ids.push(id);
                }
            } else if caps.name("sep").is_none() {
                let snippet: String = text[whole.start()..].chars().take(12).collect();
                return Err(LfParseError::Unexpected { offset: whole.start(), snippet });
            }
        }
        if let Some((kind, _, _)) = open {
            return Err(LfParseError::Unbalanced(kind));
        }
        if eps.is_empty() {
            return Err(LfParseError::Empty);
        }
        Ok(Lf { eps, chunks, optional })
    }
}

/// Per-request overrides carried by `@` lines of a request file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `@pruning-strategy <id|none>`
    PruningStrategy(Option<String>),
    /// `@hypertagger <id|none>`
    Hypertagger(Option<String>),
    /// `@edge-budget <n|unlimited>`
    EdgeBudget(Option<usize>),
    /// `@time-budget-ms <n|unlimited>`
    TimeBudget(Option<Duration>),
}

/// A parsed request: the LF plus any directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub lf: Lf,
    pub directives: Vec<Directive>,
}

impl FromStr for Request {
    type Err = LfParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut directives = Vec::new();
        let mut body = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix('@') {
                directives.push(parse_directive(rest)?);
            } else {
                body.push_str(trimmed);
                body.push('\n');
            }
        }
        Ok(Request { lf: body.parse()?, directives })
    }
}

fn parse_directive(text: &str) -> Result<Directive, LfParseError> {
    let (name, value) = text.split_once(char::is_whitespace).map(|(n, v)| (n, v.trim())).unwrap_or((text, ""));
    let invalid = || LfParseError::InvalidDirective { name: name.to_string(), value: value.to_string() };
    let policy = |value: &str| match value {
        "" => Err(invalid()),
        "none" => Ok(None),
        id => Ok(Some(id.to_string())),
    };
    let limit = |value: &str| match value {
        "unlimited" => Ok(None),
        n => n.parse::<u64>().map(Some).map_err(|_| invalid()),
    };

    match name {
        "pruning-strategy" => policy(value).map(Directive::PruningStrategy),
        "hypertagger" => policy(value).map(Directive::Hypertagger),
        "edge-budget" => limit(value).map(|n| Directive::EdgeBudget(n.map(|n| n as usize))),
        "time-budget-ms" => limit(value).map(|n| Directive::TimeBudget(n.map(Duration::from_millis))),
        other => Err(LfParseError::UnknownDirective(other.to_string())),
    }
}
