mod comparison;
mod error;

use std::fmt::{Display, Formatter};

use log::debug;
use serde::Serialize;

pub use comparison::Comparison;
pub use error::PredicateError;

use crate::expr::{BinOp, Expression, UnOp};
use crate::rule::{split_top_level, FormatError};

/// The catalogue of named side-condition predicates rule sources may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PredicateKind {
    /// `c0 > 0`
    IsConstPos,
    /// `c0 < 0`
    IsConstNeg,
    IsNotZero,
    /// Comparison between two constants, selected by a [`Comparison`] code
    CompareConstants,
}

impl PredicateKind {
    /// Looks a predicate up by name. Only the last path segment counts, so
    /// `crate::trs::is_const_pos` and `halide::is_const_pos` are the same.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.rsplit("::").next().unwrap_or(name).trim();
        match name {
            "is_const_pos" | "is-const-positive" => Some(Self::IsConstPos),
            "is_const_neg" | "is-const-negative" => Some(Self::IsConstNeg),
            "is_not_zero" | "is-not-zero" => Some(Self::IsNotZero),
            "compare_c0_c1" | "compare_constants" | "compare-constants" => {
                Some(Self::CompareConstants)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::IsConstPos | Self::IsConstNeg | Self::IsNotZero => 1,
            Self::CompareConstants => 3,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::IsConstPos => "is-const-positive",
            Self::IsConstNeg => "is-const-negative",
            Self::IsNotZero => "is-not-zero",
            Self::CompareConstants => "compare-constants",
        }
    }
}

impl Display for PredicateKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A predicate call as written in a rule source: `halide::is_const_pos("?y")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateCall {
    pub name: String,
    pub args: Vec<String>,
}

impl PredicateCall {
    /// Splits condition text into the function name and its raw arguments.
    ///
    /// # Errors
    ///
    /// This function will return an error if the text is not of the form
    /// `name(arg, ...)`.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let malformed = || FormatError::MalformedCondition(text.to_owned());
        let text = text.trim();
        let (name, rest) = text.split_once('(').ok_or_else(malformed)?;
        let inner = rest.strip_suffix(')').ok_or_else(malformed)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(malformed());
        }
        let args = if inner.trim().is_empty() {
            Vec::new()
        } else {
            split_top_level(inner, ",")?
                .into_iter()
                .map(|arg| arg.to_owned())
                .collect()
        };
        Ok(Self {
            name: name.to_owned(),
            args,
        })
    }

    /// Translates this call into its canonical predicate.
    ///
    /// # Errors
    ///
    /// See [`translate`].
    pub fn translate(&self) -> Result<Expression, PredicateError> {
        translate(&self.name, &self.args)
    }
}

/// Arguments arrive as quoted strings: `"?x"` and ` ?x ` are the same argument.
fn clean_arg(raw: &str) -> &str {
    raw.trim().trim_matches('"').trim()
}

/// Translates a named predicate call into an equivalent predicate expression.
///
/// # Errors
///
/// This function will return an error if the predicate is not in the
/// catalogue, the argument count does not match its arity, an argument is
/// empty or has inner whitespace, or the comparison code of `compare_constants` is unknown.
pub fn translate<S: AsRef<str>>(name: &str, args: &[S]) -> Result<Expression, PredicateError> {
    let kind = PredicateKind::from_name(name)
        .ok_or_else(|| PredicateError::UnknownPredicate(name.to_owned()))?;
    if args.len() != kind.arity() {
        return Err(PredicateError::Arity {
            predicate: name.to_owned(),
            expected: kind.arity(),
            found: args.len(),
        });
    }
    let args = args
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let arg = clean_arg(raw.as_ref());
            if arg.is_empty() {
                Err(PredicateError::EmptyArgument {
                    predicate: name.to_owned(),
                    index,
                })
            } else if arg.contains(char::is_whitespace) {
                Err(PredicateError::MalformedArgument {
                    predicate: name.to_owned(),
                    index,
                    arg: arg.to_owned(),
                })
            } else {
                Ok(arg)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let zero = || Expression::number("0");

    let predicate = match (kind, args.as_slice()) {
        (PredicateKind::IsConstPos, [c0]) => {
            Expression::binary(BinOp::Gt, Expression::atom(c0), zero())
        }
        (PredicateKind::IsConstNeg, [c0]) => {
            Expression::binary(BinOp::Lt, Expression::atom(c0), zero())
        }
        // Emitted with a bare `=`, which is what the consuming rule format expects here
        (PredicateKind::IsNotZero, [c0]) => Expression::unary(
            UnOp::Not,
            Expression::call("=", vec![Expression::atom(c0), zero()]),
        ),
        (PredicateKind::CompareConstants, [c0, c1, code]) => code
            .parse::<Comparison>()?
            .apply(Expression::atom(c0), Expression::atom(c1)),
        _ => {
            return Err(PredicateError::Arity {
                predicate: name.to_owned(),
                expected: kind.arity(),
                found: args.len(),
            })
        }
    };
    debug!("Translated {kind}({}) to {predicate}", args.join(", "));
    Ok(predicate)
}
