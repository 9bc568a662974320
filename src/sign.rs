//! Signs and categories.
//!
//! A [`Sign`] pairs a syntactic [`Category`] with the words it realizes. Signs
//! come from the grammar (lexical insertion and combination) and are immutable
//! once created; the chart only ever wraps them in new edges.
//!
//! Categories use the usual categorial notation: atoms (`np`, `s`) and
//! functors `X/Y` (wants `Y` to the right) and `X\Y` (wants `Y` to the left).
//! Slashes associate to the left, so `s\np/np` is `(s\np)/np`.

use crate::error::GrammarError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slash {
    /// `/`: argument on the right.
    Forward,
    /// `\`: argument on the left.
    Backward,
}

impl Slash {
    fn symbol(self) -> char {
        match self {
            Slash::Forward => '/',
            Slash::Backward => '\\',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Atom(String),
    Functor { result: Box<Category>, slash: Slash, arg: Box<Category> },
}

impl Category {
    pub fn atom(name: impl Into<String>) -> Self {
        Category::Atom(name.into())
    }

    pub fn functor(result: Category, slash: Slash, arg: Category) -> Self {
        Category::Functor { result: Box::new(result), slash, arg: Box::new(arg) }
    }

    pub fn is_atomic(&self) -> bool {
        matches!(self, Category::Atom(_))
    }

    /// Number of arguments along the result spine (`s\np/np` has two).
    pub fn arity(&self) -> usize {
        match self {
            Category::Atom(_) => 0,
            Category::Functor { result, .. } => 1 + result.arity(),
        }
    }

    /// Arguments along the result spine, outermost first.
    pub fn arguments(&self) -> Vec<&Category> {
        let mut args = Vec::new();
        let mut cur = self;
        while let Category::Functor { result, arg, .. } = cur {
            args.push(arg.as_ref());
            cur = result;
        }
        args
    }

    /// Total number of atoms, used as a structural complexity measure.
    pub fn size(&self) -> usize {
        match self {
            Category::Atom(_) => 1,
            Category::Functor { result, arg, .. } => result.size() + arg.size(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Atom(name) => write!(f, "{name}"),
            Category::Functor { result, slash, arg } => {
                // Left associativity lets the result print bare.
                write!(f, "{result}{}", slash.symbol())?;
                if arg.is_atomic() { write!(f, "{arg}") } else { write!(f, "({arg})") }
            }
        }
    }
}

impl FromStr for Category {
    type Err = GrammarError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut tokens = Vec::new();
        for m in regex!(r"[A-Za-z_][A-Za-z0-9_\[\]=]*|[/\\()]|\S").find_iter(text) {
            tokens.push(m.as_str());
        }
        let mut parser = CategoryParser { text, tokens, pos: 0 };
        let cat = parser.category()?;
        if parser.pos != parser.tokens.len() {
            return Err(parser.error(format!("trailing '{}'", parser.tokens[parser.pos])));
        }
        Ok(cat)
    }
}

/// Recursive-descent parser over pre-split tokens.
///
/// ```text
/// category := primary (slash primary)*
/// primary  := ATOM | '(' category ')'
/// ```
struct CategoryParser<'a> {
    text: &'a str,
    tokens: Vec<&'a str>,
    pos: usize,
}

impl CategoryParser<'_> {
    fn error(&self, message: impl Into<String>) -> GrammarError {
        GrammarError::Category { text: self.text.to_string(), message: message.into() }
    }

    fn category(&mut self) -> Result<Category, GrammarError> {
        let mut cat = self.primary()?;
        while let Some(&tok) = self.tokens.get(self.pos) {
            let slash = match tok {
                "/" => Slash::Forward,
                "\\" => Slash::Backward,
                _ => break,
            };
            self.pos += 1;
            let arg = self.primary()?;
            cat = Category::functor(cat, slash, arg);
        }
        Ok(cat)
    }

    fn primary(&mut self) -> Result<Category, GrammarError> {
        let Some(&tok) = self.tokens.get(self.pos) else {
            return Err(self.error("unexpected end"));
        };
        self.pos += 1;
        match tok {
            "(" => {
                let inner = self.category()?;
                if self.tokens.get(self.pos) != Some(&")") {
                    return Err(self.error("missing ')'"));
                }
                self.pos += 1;
                Ok(inner)
            }
            _ if tok.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') => Ok(Category::atom(tok)),
            _ => Err(self.error(format!("unexpected '{tok}'"))),
        }
    }
}

/// A category paired with the words it realizes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sign {
    pub category: Category,
    pub words: Vec<String>,
}

impl Sign {
    pub fn new(category: Category, words: Vec<String>) -> Self {
        Sign { category, words }
    }

    /// Build a lexical sign, splitting `surface` on whitespace.
    pub fn lexical(category: Category, surface: &str) -> Self {
        Sign { category, words: surface.split_whitespace().map(str::to_string).collect() }
    }

    /// Words joined by single spaces.
    pub fn surface(&self) -> String {
        self.words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slashes_associate_left() {
        let cat: Category = "s\\np/np".parse().unwrap();
        let expected = Category::functor(
            Category::functor(Category::atom("s"), Slash::Backward, Category::atom("np")),
            Slash::Forward,
            Category::atom("np"),
        );
        assert_eq!(cat, expected);
        assert_eq!(cat.arity(), 2);
        assert_eq!(cat.to_string(), "s\\np/np");
    }

    #[test]
    fn parenthesised_arguments_round_trip() {
        let cat: Category = "(s\\np)\\(s\\np)".parse().unwrap();
        assert_eq!(cat.arity(), 2);
        assert_eq!(cat.size(), 4);
        assert_eq!(cat.to_string(), "s\\np\\(s\\np)");
        assert_eq!(cat.to_string().parse::<Category>().unwrap(), cat);
    }

    #[test]
    fn malformed_categories_are_rejected() {
        for bad in ["", "s/", "(s\\np", "s np", "/np", "s\\np)"] {
            assert!(bad.parse::<Category>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn lexical_sign_splits_words() {
        let sign = Sign::lexical(Category::atom("np"), "  the   old dog ");
        assert_eq!(sign.words, vec!["the", "old", "dog"]);
        assert_eq!(sign.surface(), "the old dog");
    }
}
