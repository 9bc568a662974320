//! Error types.
//!
//! Only genuine faults are errors. A search that ends without a complete edge,
//! or one that stops on its budget, is a normal outcome and is reported through
//! [`crate::RealizationStatus`] instead.

use thiserror::Error;

/// Policy configuration faults, raised before any search begins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown pruning strategy '{0}'")]
    UnknownPruningStrategy(String),
    #[error("unknown hypertagger '{0}'")]
    UnknownHypertagger(String),
    #[error("invalid argument '{argument}' for policy '{policy}': {reason}")]
    InvalidArgument { policy: String, argument: String, reason: String },
}

/// Grammar faults: malformed input or lexicon, raised during transform/seeding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("malformed logical form: {0}")]
    MalformedLf(String),
    #[error("no lexical entry for predicate '{pred}'")]
    UnknownPredicate { pred: String },
    #[error("lexicon line {line}: {message}")]
    Lexicon { line: usize, message: String },
    #[error("malformed category '{text}': {message}")]
    Category { text: String, message: String },
}

/// Errors from the LF text notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LfParseError {
    #[error("unexpected input at byte {offset}: '{snippet}'")]
    Unexpected { offset: usize, snippet: String },
    #[error("unbalanced '{0}'")]
    Unbalanced(char),
    #[error("chunks cannot nest (byte {0})")]
    NestedChunk(usize),
    #[error("unknown directive '@{0}'")]
    UnknownDirective(String),
    #[error("directive '@{name}' has an invalid value '{value}'")]
    InvalidDirective { name: String, value: String },
    #[error("logical form has no predications")]
    Empty,
}

/// Fatal realization faults. Both variants abort the request before seeding
/// completes, so no partial result exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RealizeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grammar(#[from] GrammarError),
}
