use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use super::error::PredicateError;
use crate::expr::{BinOp, Expression, UnOp};

/// The closed set of comparison codes `compare_constants` understands.
/// Each one is a fixed shape over the two compared constants `c0` and `c1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Comparison {
    /// `c0 < c1`
    Lt,
    /// `c0 < |c1|`
    LtAbs,
    /// `c0 <= c1`
    Le,
    /// `c0 <= c1 + 1`
    LePlusOne,
    /// `c0 <= |c1|`
    LeAbs,
    /// `c0 <= -|c1|`
    LeNegAbs,
    /// `c0 <= -|c1 + 1|`
    LeNegAbsPlusOne,
    /// `c0 > c1`
    Gt,
    /// `c0 > |c1|`
    GtAbs,
    /// `c0 >= c1`
    Ge,
    /// `c0 >= |c1|`
    GeAbs,
    /// `c0 >= |c1| - 1`
    GeAbsMinusOne,
    /// `c0 != c1`
    Ne,
    /// `c1` divides `c0`
    Divisible,
    /// `c1` is non-zero and does not divide `c0`
    NotDivisible,
    /// `c1` is positive and divides `c0`
    DivisiblePos,
    /// `c1` is negative and divides `c0`
    DivisibleNeg,
}

impl Comparison {
    pub const ALL: [Comparison; 17] = [
        Self::Lt,
        Self::LtAbs,
        Self::Le,
        Self::LePlusOne,
        Self::LeAbs,
        Self::LeNegAbs,
        Self::LeNegAbsPlusOne,
        Self::Gt,
        Self::GtAbs,
        Self::Ge,
        Self::GeAbs,
        Self::GeAbsMinusOne,
        Self::Ne,
        Self::Divisible,
        Self::NotDivisible,
        Self::DivisiblePos,
        Self::DivisibleNeg,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::LtAbs => "<a",
            Self::Le => "<=",
            Self::LePlusOne => "<=+1",
            Self::LeAbs => "<=a",
            Self::LeNegAbs => "<=-a",
            Self::LeNegAbsPlusOne => "<=-a+1",
            Self::Gt => ">",
            Self::GtAbs => ">a",
            Self::Ge => ">=",
            Self::GeAbs => ">=a",
            Self::GeAbsMinusOne => ">=a-1",
            Self::Ne => "!=",
            Self::Divisible => "%0",
            Self::NotDivisible => "!%0",
            Self::DivisiblePos => "%0<",
            Self::DivisibleNeg => "%0>",
        }
    }

    /// Builds the predicate this comparison stands for over `c0` and `c1`.
    #[must_use]
    pub fn apply(self, c0: Expression, c1: Expression) -> Expression {
        let abs = |e: Expression| Expression::call("abs", vec![e]);
        let one = || Expression::number("1");
        let zero = || Expression::number("0");
        let cmp = |op, l, r| Expression::binary(op, l, r);
        // c1 guards the modulo, so the divisor is never zero in the second conjunct
        let divisible = |guard: BinOp, rem: BinOp, c0: Expression, c1: Expression| {
            cmp(
                BinOp::And,
                cmp(guard, c1.clone(), zero()),
                cmp(rem, cmp(BinOp::Mod, c0, c1), zero()),
            )
        };

        match self {
            Self::Lt => cmp(BinOp::Lt, c0, c1),
            Self::LtAbs => cmp(BinOp::Lt, c0, abs(c1)),
            Self::Le => cmp(BinOp::Le, c0, c1),
            Self::LePlusOne => cmp(BinOp::Le, c0, cmp(BinOp::Add, c1, one())),
            Self::LeAbs => cmp(BinOp::Le, c0, abs(c1)),
            Self::LeNegAbs => cmp(BinOp::Le, c0, Expression::unary(UnOp::Neg, abs(c1))),
            Self::LeNegAbsPlusOne => cmp(
                BinOp::Le,
                c0,
                Expression::unary(UnOp::Neg, abs(cmp(BinOp::Add, c1, one()))),
            ),
            Self::Gt => cmp(BinOp::Gt, c0, c1),
            Self::GtAbs => cmp(BinOp::Gt, c0, abs(c1)),
            Self::Ge => cmp(BinOp::Ge, c0, c1),
            Self::GeAbs => cmp(BinOp::Ge, c0, abs(c1)),
            Self::GeAbsMinusOne => cmp(BinOp::Ge, c0, cmp(BinOp::Sub, abs(c1), one())),
            Self::Ne => cmp(BinOp::Ne, c0, c1),
            Self::Divisible => divisible(BinOp::Ne, BinOp::Eq, c0, c1),
            Self::NotDivisible => divisible(BinOp::Ne, BinOp::Ne, c0, c1),
            Self::DivisiblePos => divisible(BinOp::Gt, BinOp::Eq, c0, c1),
            Self::DivisibleNeg => divisible(BinOp::Lt, BinOp::Eq, c0, c1),
        }
    }
}

impl FromStr for Comparison {
    type Err = PredicateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "<" => Self::Lt,
            "<a" => Self::LtAbs,
            "<=" => Self::Le,
            "<=+1" => Self::LePlusOne,
            "<=a" => Self::LeAbs,
            "<=-a" => Self::LeNegAbs,
            "<=-a+1" => Self::LeNegAbsPlusOne,
            ">" => Self::Gt,
            ">a" => Self::GtAbs,
            ">=" => Self::Ge,
            ">=a" => Self::GeAbs,
            ">=a-1" => Self::GeAbsMinusOne,
            "!=" => Self::Ne,
            "%0" => Self::Divisible,
            "!%0" => Self::NotDivisible,
            "%0<" => Self::DivisiblePos,
            "%0>" => Self::DivisibleNeg,
            _ => return Err(PredicateError::UnknownComparison(s.to_owned())),
        })
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(code: &str) -> String {
        code.parse::<Comparison>()
            .unwrap()
            .apply(Expression::var("c0"), Expression::var("c1"))
            .to_string()
    }

    #[test]
    fn codes_are_consistent() {
        for comparison in Comparison::ALL {
            assert_eq!(comparison.code().parse::<Comparison>(), Ok(comparison));
        }
    }

    #[test]
    fn plain_comparisons() {
        assert_eq!(shape("<"), "(< c0 c1)");
        assert_eq!(shape("<="), "(<= c0 c1)");
        assert_eq!(shape(">"), "(> c0 c1)");
        assert_eq!(shape(">="), "(>= c0 c1)");
        assert_eq!(shape("!="), "(!= c0 c1)");
    }

    #[test]
    fn adjusted_comparisons() {
        assert_eq!(shape("<a"), "(< c0 (abs c1))");
        assert_eq!(shape("<=+1"), "(<= c0 (+ c1 1))");
        assert_eq!(shape("<=a"), "(<= c0 (abs c1))");
        assert_eq!(shape("<=-a"), "(<= c0 (- (abs c1)))");
        assert_eq!(shape("<=-a+1"), "(<= c0 (- (abs (+ c1 1))))");
        assert_eq!(shape(">a"), "(> c0 (abs c1))");
        assert_eq!(shape(">=a"), "(>= c0 (abs c1))");
        assert_eq!(shape(">=a-1"), "(>= c0 (- (abs c1) 1))");
    }

    #[test]
    fn divisibility_is_balanced() {
        assert_eq!(shape("%0"), "(&& (!= c1 0) (== (% c0 c1) 0))");
        assert_eq!(shape("!%0"), "(&& (!= c1 0) (!= (% c0 c1) 0))");
        assert_eq!(shape("%0<"), "(&& (> c1 0) (== (% c0 c1) 0))");
        assert_eq!(shape("%0>"), "(&& (< c1 0) (== (% c0 c1) 0))");
    }

    #[test]
    fn unknown_codes() {
        for code in ["", "=", "<=a+1", "%1", " <", "LT"] {
            assert_eq!(
                code.parse::<Comparison>(),
                Err(PredicateError::UnknownComparison(code.to_owned()))
            );
        }
    }
}
