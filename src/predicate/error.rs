use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    #[error("Unknown predicate: {0}")]
    UnknownPredicate(String),
    #[error("Unknown comparison code: {0:?}")]
    UnknownComparison(String),
    #[error("Predicate {predicate} takes {expected} arguments, got {found}")]
    Arity {
        predicate: String,
        expected: usize,
        found: usize,
    },
    #[error("Argument {index} of predicate {predicate} is empty")]
    EmptyArgument { predicate: String, index: usize },
    #[error("Argument {index} of predicate {predicate} is not a single token: {arg:?}")]
    MalformedArgument {
        predicate: String,
        index: usize,
        arg: String,
    },
}
