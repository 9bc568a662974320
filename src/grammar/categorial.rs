//! A small categorial grammar.
//!
//! Lexical entries map predicates to signs; four combinatory rules build larger
//! signs. Rules are tried in a fixed order and the first licensed one wins:
//!
//! ```text
//! >   X/Y  Y    => X
//! <   Y    X\Y  => X
//! >B  X/Y  Y/Z  => X/Z
//! <B  Y\Z  X\Y  => X\Z
//! ```
//!
//! ## Lexicon format
//!
//! One entry per line, `#` starts a comment:
//!
//! ```text
//! john            : np        : John
//! buy             : s\np/np   : bought
//! car + def       : np        : the car
//! ```
//!
//! The first predicate anchors the entry. Extra predicates (`+ def`) are taken
//! from the LF at seeding time: the first EP in LF order with that predicate
//! sharing an argument with the anchor. If one is missing the entry does not
//! apply.

use super::{Combination, Grammar, LexicalSign};
use crate::lf::Lf;
use crate::{Category, EpId, GrammarError, Sign, Slash};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Static description of an entry, as written in the `lexicon!` macro.
#[derive(Debug, Clone, Copy)]
pub struct LexEntrySpec {
    pub preds: &'static [&'static str],
    pub category: &'static str,
    pub words: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexEntry {
    pub anchor: String,
    pub extra: Vec<String>,
    pub category: Category,
    pub words: String,
}

#[derive(Debug, Clone, Default)]
pub struct CategorialGrammar {
    entries: Vec<LexEntry>,
    by_anchor: HashMap<String, Vec<usize>>,
    /// Every predicate mentioned by some entry, anchor or extra.
    known: HashSet<String>,
}

impl CategorialGrammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: LexEntry) {
        self.known.insert(entry.anchor.clone());
        self.known.extend(entry.extra.iter().cloned());
        self.by_anchor.entry(entry.anchor.clone()).or_default().push(self.entries.len());
        self.entries.push(entry);
    }

    pub fn from_entries(specs: impl IntoIterator<Item = LexEntrySpec>) -> Result<Self, GrammarError> {
        let mut grammar = Self::new();
        for (idx, spec) in specs.into_iter().enumerate() {
            let Some((anchor, extra)) = spec.preds.split_first() else {
                return Err(GrammarError::Lexicon { line: idx + 1, message: "entry has no predicate".to_string() });
            };
            grammar.add_entry(LexEntry {
                anchor: anchor.to_lowercase(),
                extra: extra.iter().map(|p| p.to_lowercase()).collect(),
                category: spec.category.parse()?,
                words: spec.words.to_string(),
            });
        }
        Ok(grammar)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[LexEntry] {
        &self.entries
    }

    /// Resolve the extra predicates of `entry` against `lf`, anchored at `ep`.
    fn absorb(entry: &LexEntry, lf: &Lf, ep: EpId) -> Option<Vec<EpId>> {
        let anchor = lf.ep(ep)?;
        let mut coverage = vec![ep];
        for pred in &entry.extra {
            let found = lf.eps().iter().enumerate().find(|(id, cand)| {
                !coverage.contains(id)
                    && cand.pred == *pred
                    && (anchor.args.is_empty() || cand.shares_argument(anchor))
            })?;
            coverage.push(found.0);
        }
        Some(coverage)
    }
}

impl FromStr for CategorialGrammar {
    type Err = GrammarError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let line_re = regex!(r"^\s*([^:]+?)\s*:\s*([^:]+?)\s*:\s*(.+?)\s*$");
        let mut grammar = Self::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let lexicon_error = |message: String| GrammarError::Lexicon { line: idx + 1, message };
            let caps = line_re
                .captures(line)
                .ok_or_else(|| lexicon_error("expected 'pred[+pred] : category : words'".to_string()))?;
            let preds: Vec<String> = caps[1].split('+').map(|p| p.trim().to_lowercase()).collect();
            if preds.iter().any(|p| p.is_empty()) {
                return Err(lexicon_error("empty predicate".to_string()));
            }
            let category = caps[2].parse::<Category>().map_err(|e| lexicon_error(e.to_string()))?;
            grammar.add_entry(LexEntry {
                anchor: preds[0].clone(),
                extra: preds[1..].to_vec(),
                category,
                words: caps[3].to_string(),
            });
        }
        Ok(grammar)
    }
}

impl Grammar for CategorialGrammar {
    fn transform(&self, lf: Lf) -> Result<Lf, GrammarError> {
        lf.validate()?;
        Ok(lf.map_eps(|mut ep| {
            ep.pred = ep.pred.trim().to_lowercase();
            ep
        }))
    }

    fn seed_edges(&self, lf: &Lf, ep: EpId) -> Result<Vec<LexicalSign>, GrammarError> {
        let pred = &lf.ep(ep).ok_or_else(|| GrammarError::MalformedLf(format!("no EP with id {ep}")))?.pred;
        if !self.known.contains(pred) {
            return Err(GrammarError::UnknownPredicate { pred: pred.clone() });
        }
        let seeds = self
            .by_anchor
            .get(pred)
            .into_iter()
            .flatten()
            .filter_map(|&idx| {
                let entry = &self.entries[idx];
                let coverage = Self::absorb(entry, lf, ep)?;
                Some(LexicalSign { sign: Sign::lexical(entry.category.clone(), &entry.words), coverage })
            })
            .collect();
        Ok(seeds)
    }

    fn combine(&self, left: &Sign, right: &Sign) -> Option<Combination> {
        let (category, rule) = apply_rules(&left.category, &right.category)?;
        let mut words = left.words.clone();
        words.extend(right.words.iter().cloned());
        Some(Combination { sign: Sign::new(category, words), rule })
    }
}

fn apply_rules(left: &Category, right: &Category) -> Option<(Category, &'static str)> {
    use Category::Functor;

    // >  X/Y Y => X
    if let Functor { result, slash: Slash::Forward, arg } = left {
        if **arg == *right {
            return Some(((**result).clone(), ">"));
        }
    }
    // <  Y X\Y => X
    if let Functor { result, slash: Slash::Backward, arg } = right {
        if **arg == *left {
            return Some(((**result).clone(), "<"));
        }
    }
    // >B  X/Y Y/Z => X/Z
    if let (Functor { result: x, slash: Slash::Forward, arg: y }, Functor { result: y2, slash: Slash::Forward, arg: z }) =
        (left, right)
    {
        if y == y2 {
            return Some((Category::functor((**x).clone(), Slash::Forward, (**z).clone()), ">B"));
        }
    }
    // <B  Y\Z X\Y => X\Z
    if let (Functor { result: y2, slash: Slash::Backward, arg: z }, Functor { result: x, slash: Slash::Backward, arg: y }) =
        (left, right)
    {
        if y == y2 {
            return Some((Category::functor((**x).clone(), Slash::Backward, (**z).clone()), "<B"));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lf::Ep;

    fn cat(text: &str) -> Category {
        text.parse().unwrap()
    }

    fn sign(category: &str, words: &str) -> Sign {
        Sign::lexical(cat(category), words)
    }

    #[test]
    fn application_and_composition() {
        assert_eq!(apply_rules(&cat("s/np"), &cat("np")), Some((cat("s"), ">")));
        assert_eq!(apply_rules(&cat("np"), &cat("s\\np")), Some((cat("s"), "<")));
        assert_eq!(apply_rules(&cat("s/vp"), &cat("vp/np")), Some((cat("s/np"), ">B")));
        assert_eq!(apply_rules(&cat("np\\n"), &cat("s\\np")), Some((cat("s\\n"), "<B")));
        assert_eq!(apply_rules(&cat("np"), &cat("np")), None);
        assert_eq!(apply_rules(&cat("s\\np"), &cat("np")), None);
    }

    #[test]
    fn combine_concatenates_left_then_right() {
        let grammar = CategorialGrammar::new();
        let out = grammar.combine(&sign("np", "the dog"), &sign("s\\np", "sleeps")).unwrap();
        assert_eq!(out.sign.surface(), "the dog sleeps");
        assert_eq!(out.rule, "<");
        assert!(grammar.combine(&sign("s\\np", "sleeps"), &sign("np", "the dog")).is_none());
    }

    #[test]
    fn parses_lexicon_text() {
        let text = "# toy\njohn : np : John\nbuy : s\\np/np : bought  # past\ncar + def : np : the car\n";
        let grammar: CategorialGrammar = text.parse().unwrap();

        assert_eq!(grammar.entry_count(), 3);
        assert_eq!(grammar.entries()[1].category, cat("s\\np/np"));
        assert_eq!(grammar.entries()[2].extra, vec!["def"]);
        assert!(matches!("john np".parse::<CategorialGrammar>(), Err(GrammarError::Lexicon { line: 1, .. })));
        assert!(matches!("\n\njohn : s/ : x".parse::<CategorialGrammar>(), Err(GrammarError::Lexicon { line: 3, .. })));
    }

    #[test]
    fn seeding_absorbs_extra_predicates_sharing_an_argument() {
        let grammar = lexicon!["car" + "def" => "np" : "the car", "car" => "n" : "car", "def" => "np/n" : "the"].unwrap();
        let lf = Lf::new(vec![Ep::new("def", &["z"]), Ep::new("car", &["y"]), Ep::new("def", &["y"])]);

        let seeds = grammar.seed_edges(&lf, 1).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].coverage, vec![1, 2]);
        assert_eq!(seeds[0].sign.surface(), "the car");
        assert_eq!(seeds[1].coverage, vec![1]);
    }

    #[test]
    fn unknown_predicates_are_grammar_errors() {
        let grammar = lexicon!["john" => "np" : "John"].unwrap();
        let lf = Lf::new(vec![Ep::new("mary", &[])]);
        assert_eq!(grammar.seed_edges(&lf, 0), Err(GrammarError::UnknownPredicate { pred: "mary".to_string() }));
    }

    #[test]
    fn transform_normalizes_predicates() {
        let grammar = CategorialGrammar::new();
        let lf = grammar.transform(Lf::new(vec![Ep::new(" John ", &["x"])])).unwrap();
        assert_eq!(lf.eps()[0].pred, "john");
        assert!(grammar.transform(Lf::new(Vec::new())).is_err());
    }
}
