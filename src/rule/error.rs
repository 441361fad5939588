use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::expr::{SexpError, SyntaxError};
use crate::predicate::PredicateError;

/// The rule line does not have the layout its notation requires.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Expected 2 or 3 segments, found {0}")]
    SegmentCount(usize),
    #[error("Delimiter `{delimiter}` out of place at offset {offset}")]
    MisplacedDelimiter {
        delimiter: &'static str,
        offset: usize,
    },
    #[error("Empty segment at offset {0}")]
    EmptySegment(usize),
    #[error("No quoted string in segment: {0}")]
    MissingQuote(String),
    #[error("Unterminated quote starting at offset {0}")]
    UnterminatedQuote(usize),
    #[error("Unbalanced parenthesis at offset {0}")]
    UnbalancedParen(usize),
    #[error("Not a macro call: {0}")]
    MissingWrapper(String),
    #[error("Malformed condition: {0}")]
    MalformedCondition(String),
    #[error("Unknown rule notation: {0}")]
    UnknownNotation(String),
}

/// Which part of a rule a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Lhs,
    Rhs,
    Condition,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lhs => write!(f, "lhs"),
            Self::Rhs => write!(f, "rhs"),
            Self::Condition => write!(f, "condition"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Syntax error in {side}: {source}")]
    Syntax { side: Side, source: SyntaxError },
    #[error("Bad prefix expression in {side}: {source}")]
    Sexp { side: Side, source: SexpError },
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Predicate(#[from] PredicateError),
}

/// Failure to translate one rule, carrying the offending line and its
/// position in the batch.
#[derive(Debug, Error)]
#[error("Could not translate rule {index} `{line}`: {source}")]
pub struct RuleError {
    pub index: usize,
    pub line: String,
    pub source: TranslateError,
}

impl RuleError {
    pub fn new<E: Into<TranslateError>>(index: usize, line: &str, source: E) -> Self {
        Self {
            index,
            line: line.to_owned(),
            source: source.into(),
        }
    }
}
