mod error;
mod split;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

pub use error::{FormatError, RuleError, Side, TranslateError};
pub use split::{split_rule, split_top_level, RuleParts};

use crate::expr::{parse_infix, read_sexp, Expression};
use crate::predicate::PredicateCall;

/// The source notations rules can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Notation {
    /// `lhs ==> rhs if cond`, everything infix
    Halide,
    /// `rw!("name"; "lhs" => "rhs" if predicate(..))`, prefix sides and named predicates
    Caviar,
}

impl Notation {
    fn read_side(self, text: &str, side: Side) -> Result<Expression, TranslateError> {
        match self {
            Self::Halide => {
                parse_infix(text).map_err(|source| TranslateError::Syntax { side, source })
            }
            Self::Caviar => read_sexp(text).map_err(|source| TranslateError::Sexp { side, source }),
        }
    }

    fn read_condition(self, text: &str) -> Result<Expression, TranslateError> {
        match self {
            Self::Halide => self.read_side(text, Side::Condition),
            Self::Caviar => Ok(PredicateCall::parse(text)?.translate()?),
        }
    }
}

impl Display for Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Halide => write!(f, "halide"),
            Self::Caviar => write!(f, "caviar"),
        }
    }
}

impl FromStr for Notation {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "halide" | "infix" => Ok(Self::Halide),
            "caviar" | "macro" => Ok(Self::Caviar),
            _ => Err(FormatError::UnknownNotation(s.to_owned())),
        }
    }
}

/// A translated rewrite rule. Its [`Display`] is the canonical rule line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RewriteRule {
    pub name: String,
    pub lhs: Expression,
    pub rhs: Expression,
    pub condition: Option<Expression>,
}

impl RewriteRule {
    #[must_use]
    pub fn new(
        name: String,
        lhs: Expression,
        rhs: Expression,
        condition: Option<Expression>,
    ) -> Self {
        Self {
            name,
            lhs,
            rhs,
            condition,
        }
    }

    /// Builds a rule from its separate source texts.
    ///
    /// # Errors
    ///
    /// This function will return an error if a side or the condition cannot
    /// be read in the given notation.
    pub fn from_texts(
        name: &str,
        lhs: &str,
        rhs: &str,
        condition: Option<&str>,
        notation: Notation,
    ) -> Result<Self, TranslateError> {
        let lhs = notation.read_side(lhs, Side::Lhs)?;
        let rhs = notation.read_side(rhs, Side::Rhs)?;
        let condition = condition
            .map(|cond| notation.read_condition(cond))
            .transpose()?;
        Ok(Self::new(name.to_owned(), lhs, rhs, condition))
    }

    /// Translates one raw rule line. `index` is the line's position in its
    /// batch: errors carry it, and lines without a name of their own (infix
    /// rules) are named `rule{index}`.
    ///
    /// # Errors
    ///
    /// This function will return an error, carrying the line, if the line
    /// cannot be split or any of its parts cannot be translated.
    pub fn from_line(line: &str, notation: Notation, index: usize) -> Result<Self, RuleError> {
        let parts = split_rule(line, notation).map_err(|e| RuleError::new(index, line, e))?;
        let name = parts.name.unwrap_or_else(|| format!("rule{index}"));
        let rule = Self::from_texts(
            &name,
            &parts.lhs,
            &parts.rhs,
            parts.condition.as_deref(),
            notation,
        )
        .map_err(|e| RuleError::new(index, line, e))?;
        debug!("{}: {rule}", rule.name);
        Ok(rule)
    }
}

impl Display for RewriteRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.condition {
            Some(cond) => write!(f, "{} ==> {} if {cond}", self.lhs, self.rhs),
            None => write!(f, "{} ==> {}", self.lhs, self.rhs),
        }
    }
}

/// Formats already serialized parts into a canonical rule line.
#[must_use]
pub fn assemble(lhs: &str, rhs: &str, condition: Option<&str>) -> String {
    match condition {
        Some(cond) => format!("{lhs} ==> {rhs} if {cond}"),
        None => format!("{lhs} ==> {rhs}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::SyntaxError;
    use crate::predicate::PredicateError;

    #[test]
    fn assemble_unconditional() {
        let rule = RewriteRule::from_texts("rule1", "a+b", "b+a", None, Notation::Halide).unwrap();
        assert_eq!(rule.name, "rule1");
        assert_eq!(rule.to_string(), "(+ a b) ==> (+ b a)");
    }

    #[test]
    fn assemble_matches_display() {
        let rule =
            RewriteRule::from_texts("r", "x / x", "1", Some("x != 0"), Notation::Halide).unwrap();
        let cond = rule.condition.as_ref().map(ToString::to_string);
        assert_eq!(
            assemble(&rule.lhs.to_string(), &rule.rhs.to_string(), cond.as_deref()),
            rule.to_string()
        );
        assert_eq!(rule.to_string(), "(/ x x) ==> 1 if (!= x 0)");
    }

    #[test]
    fn infix_line() {
        let rule =
            RewriteRule::from_line("max(a, b) - a ==> 0 if b <= a", Notation::Halide, 7).unwrap();
        assert_eq!(rule.name, "rule7");
        assert_eq!(rule.to_string(), "(- (max a b) a) ==> 0 if (<= b a)");
    }

    #[test]
    fn macro_line() {
        let line = r#"rw!("div-consts-div"; "( / ( * ?x ?a ) ?b )" => "( / ?x ( / ?b ?a ) )" if super::compare_constants("?b", "?a", "%0<")),"#;
        let rule = RewriteRule::from_line(line, Notation::Caviar, 0).unwrap();
        assert_eq!(rule.name, "div-consts-div");
        assert_eq!(
            rule.to_string(),
            "(/ (* ?x ?a) ?b) ==> (/ ?x (/ ?b ?a)) if (&& (> ?a 0) (== (% ?b ?a) 0))"
        );
    }

    #[test]
    fn errors_carry_the_line() {
        let line = "a + (b ==> c";
        let err = RewriteRule::from_line(line, Notation::Halide, 4).unwrap_err();
        assert_eq!(err.index, 4);
        assert_eq!(err.line, line);
        assert!(matches!(
            err.source,
            TranslateError::Format(FormatError::UnbalancedParen(_))
        ));

        let err = RewriteRule::from_line("a + ==> b", Notation::Halide, 0).unwrap_err();
        assert!(matches!(
            err.source,
            TranslateError::Syntax {
                side: Side::Lhs,
                source: SyntaxError::UnexpectedEnd { .. }
            }
        ));
        assert!(err.to_string().contains("a + ==> b"));
    }

    #[test]
    fn unknown_predicate_fails_the_rule() {
        let line = r#"rw!("x"; "(< ?a ?b)" => "true" if crate::trs::is_even("?a")),"#;
        let err = RewriteRule::from_line(line, Notation::Caviar, 0).unwrap_err();
        assert!(matches!(
            err.source,
            TranslateError::Predicate(PredicateError::UnknownPredicate(_))
        ));
    }

    #[test]
    fn notation_names() {
        assert_eq!("Halide".parse::<Notation>(), Ok(Notation::Halide));
        assert_eq!("caviar".parse::<Notation>(), Ok(Notation::Caviar));
        assert!("lisp".parse::<Notation>().is_err());
    }
}
