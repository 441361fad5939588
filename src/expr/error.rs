use thiserror::Error;

/// Failure to parse an infix expression. Offsets are byte offsets into the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("Unexpected token `{token}` at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },
    #[error("Unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },
    #[error("Unmatched parenthesis at offset {offset}")]
    UnmatchedParen { offset: usize },
    #[error("Chained comparison at offset {offset}")]
    ChainedComparison { offset: usize },
    #[error("Unconsumed input starting with `{token}` at offset {offset}")]
    TrailingInput { token: String, offset: usize },
}

/// An error type for failures when attempting to read an s-expression as an
/// [`Expression`].
///
/// [`Expression`]: super::Expression
#[derive(Debug, Error)]
pub enum SexpError {
    /// An empty s-expression was found. Usually this is caused by an
    /// empty list "()" somewhere in the input.
    #[error("found empty s-expression")]
    EmptySexp,

    /// A list was found where an operator was expected. This is caused by
    /// s-expressions of the form "((a b c) d e f)."
    #[error("found a list in the head position: {0}")]
    HeadList(symbolic_expressions::Sexp),

    /// Parentheses do not pair up. The offset points at the first stray
    /// closing parenthesis, or at the end of input if one is left open.
    #[error("unbalanced parentheses at offset {0}")]
    Unbalanced(usize),

    /// More than one form. The offset points at the start of the second.
    #[error("unexpected input after the expression at offset {0}")]
    TrailingInput(usize),

    /// An error occurred while parsing the s-expression itself.
    #[error(transparent)]
    BadSexp(symbolic_expressions::SexpError),
}
