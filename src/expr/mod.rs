mod error;
mod parse;
mod sexp;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

pub use error::{SexpError, SyntaxError};
pub use parse::parse_infix;
pub use sexp::read_sexp;

/// Expression tree shared by the infix parser, the prefix reader and the
/// canonical serializer.
///
/// Every node owns its children. The [`Display`] implementation is the
/// canonical serializer: fully parenthesized prefix notation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Expression {
    /// Numeric literal, kept as written
    Number(String),
    Variable(String),
    Unary {
        op: UnOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Application of any named operator without a dedicated tag (`abs`, `min`, ...)
    Call { name: String, args: Vec<Expression> },
}

impl Expression {
    #[must_use]
    pub fn number<S: Into<String>>(literal: S) -> Self {
        Self::Number(literal.into())
    }

    #[must_use]
    pub fn var<S: Into<String>>(name: S) -> Self {
        Self::Variable(name.into())
    }

    /// Builds a leaf, deciding between [`Expression::Number`] and
    /// [`Expression::Variable`] by the shape of the text.
    #[must_use]
    pub fn atom(text: &str) -> Self {
        if is_numeric_literal(text) {
            Self::number(text)
        } else {
            Self::var(text)
        }
    }

    #[must_use]
    pub fn unary(op: UnOp, operand: Expression) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    #[must_use]
    pub fn binary(op: BinOp, left: Expression, right: Expression) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn call<S: Into<String>>(name: S, args: Vec<Expression>) -> Self {
        Self::Call {
            name: name.into(),
            args,
        }
    }

    /// Rebuilds a node from a prefix head symbol and its children.
    /// Operator symbols only get their dedicated tag at their natural arity,
    /// everything else becomes a [`Expression::Call`].
    #[must_use]
    pub fn from_head(head: &str, mut args: Vec<Expression>) -> Self {
        match args.len() {
            1 => {
                if let Some(op) = UnOp::from_symbol(head) {
                    if let Some(operand) = args.pop() {
                        return Self::unary(op, operand);
                    }
                }
            }
            2 => {
                if let Some(op) = BinOp::from_symbol(head) {
                    if let (Some(right), Some(left)) = (args.pop(), args.pop()) {
                        return Self::binary(op, left, right);
                    }
                }
            }
            _ => (),
        }
        Self::call(head, args)
    }

    /// Number of nodes in the tree
    #[must_use]
    pub fn size(&self) -> usize {
        match self {
            Self::Number(_) | Self::Variable(_) => 1,
            Self::Unary { operand, .. } => 1 + operand.size(),
            Self::Binary { left, right, .. } => 1 + left.size() + right.size(),
            Self::Call { args, .. } => 1 + args.iter().map(Expression::size).sum::<usize>(),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(text) | Self::Variable(text) => write!(f, "{text}"),
            Self::Unary { op, operand } => write!(f, "({op} {operand})"),
            Self::Binary { op, left, right } => write!(f, "({op} {left} {right})"),
            Self::Call { name, args } => {
                write!(f, "({name}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl FromStr for Expression {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_infix(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnOp {
    Neg,
    Not,
}

impl UnOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "-" => Some(Self::Neg),
            "!" => Some(Self::Not),
            _ => None,
        }
    }
}

impl Display for UnOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::And => "&&",
            Self::Or => "||",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "&&" => Self::And,
            "||" => Self::Or,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            _ => return None,
        })
    }

    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }
}

impl Display for BinOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Numeric literals start with a digit, or a `.` followed by one.
/// A leading `-` is allowed since prefix sources write negative constants inline.
fn is_numeric_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix('-').unwrap_or(text);
    let mut chars = unsigned.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_leaves_verbatim() {
        assert_eq!(Expression::number("007").to_string(), "007");
        assert_eq!(Expression::var("?x").to_string(), "?x");
    }

    #[test]
    fn serialize_nested() {
        let expr = Expression::binary(
            BinOp::And,
            Expression::binary(BinOp::Ne, Expression::var("c1"), Expression::number("0")),
            Expression::binary(
                BinOp::Eq,
                Expression::binary(BinOp::Mod, Expression::var("c0"), Expression::var("c1")),
                Expression::number("0"),
            ),
        );
        assert_eq!(expr.to_string(), "(&& (!= c1 0) (== (% c0 c1) 0))");
        assert_eq!(expr.size(), 9);
    }

    #[test]
    fn serialize_calls() {
        assert_eq!(Expression::call("f", vec![]).to_string(), "(f)");
        let abs = Expression::call("abs", vec![Expression::unary(UnOp::Neg, Expression::var("x"))]);
        assert_eq!(abs.to_string(), "(abs (- x))");
    }

    #[test]
    fn atoms() {
        assert_eq!(Expression::atom("-1"), Expression::number("-1"));
        assert_eq!(Expression::atom(".5"), Expression::number(".5"));
        assert_eq!(Expression::atom("-"), Expression::var("-"));
        assert_eq!(Expression::atom("true"), Expression::var("true"));
    }

    #[test]
    fn from_head_arity() {
        let neg = Expression::from_head("-", vec![Expression::var("a")]);
        assert_eq!(neg, Expression::unary(UnOp::Neg, Expression::var("a")));

        let sub = Expression::from_head("-", vec![Expression::var("a"), Expression::var("b")]);
        assert_eq!(
            sub,
            Expression::binary(BinOp::Sub, Expression::var("a"), Expression::var("b"))
        );

        let three = Expression::from_head(
            "+",
            vec![Expression::var("a"), Expression::var("b"), Expression::var("c")],
        );
        assert!(matches!(three, Expression::Call { ref name, ref args } if name == "+" && args.len() == 3));
    }
}
