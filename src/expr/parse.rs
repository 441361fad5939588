use std::fmt::{Display, Formatter};

use super::error::SyntaxError;
use super::{BinOp, Expression, UnOp};

/// Longest symbols first so that `<=` is never lexed as `<` followed by `=`.
const PUNCTUATION: [&str; 17] = [
    "||", "&&", "==", "!=", "<=", ">=", "<", ">", "!", "+", "-", "*", "/", "%", "(", ")", ",",
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    Number(String),
    Ident(String),
    Punct(&'static str),
}

impl Display for Tok {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Number(s) | Tok::Ident(s) => write!(f, "{s}"),
            Tok::Punct(p) => write!(f, "{p}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    tok: Tok,
    offset: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        if c.is_ascii_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || (c == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            i = scan_number(bytes, i);
            tokens.push(Token {
                tok: Tok::Number(input[start..i].to_owned()),
                offset: start,
            });
        } else if c.is_ascii_alphabetic() || c == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token {
                tok: Tok::Ident(input[start..i].to_owned()),
                offset: start,
            });
        } else if let Some(punct) = PUNCTUATION.iter().find(|p| input[i..].starts_with(**p)) {
            i += punct.len();
            tokens.push(Token {
                tok: Tok::Punct(*punct),
                offset: start,
            });
        } else {
            // Only ascii is ever consumed, so `i` sits on a char boundary
            let ch = input[i..].chars().next().unwrap_or('\0');
            return Err(SyntaxError::UnexpectedChar { ch, offset: i });
        }
    }
    Ok(tokens)
}

/// Digits, an optional fraction and an optional exponent. Returns the end offset.
fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    let digits = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    i = digits(i);
    if bytes.get(i) == Some(&b'.') && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
        i = digits(i + 1);
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(i + 1), Some(b'+' | b'-')));
        if bytes.get(i + 1 + sign).is_some_and(u8::is_ascii_digit) {
            i = digits(i + 1 + sign);
        }
    }
    i
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_punct(&self) -> Option<&'static str> {
        match self.peek() {
            Some(Token {
                tok: Tok::Punct(p), ..
            }) => Some(*p),
            _ => None,
        }
    }

    fn eat(&mut self, punct: &str) -> bool {
        if self.peek_punct() == Some(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consumes a binary operator of this precedence level, if one is next.
    fn eat_op(&mut self, level: &[(&str, BinOp)]) -> Option<BinOp> {
        let punct = self.peek_punct()?;
        let (_, op) = level.iter().find(|(symbol, _)| *symbol == punct)?;
        self.pos += 1;
        Some(*op)
    }

    fn unexpected(&self, token: Token) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            token: token.tok.to_string(),
            offset: token.offset,
        }
    }

    fn expect_close(&mut self, open_offset: usize) -> Result<(), SyntaxError> {
        match self.next() {
            Some(Token {
                tok: Tok::Punct(")"),
                ..
            }) => Ok(()),
            Some(token) => Err(self.unexpected(token)),
            None => Err(SyntaxError::UnmatchedParen {
                offset: open_offset,
            }),
        }
    }

    fn left_assoc(
        &mut self,
        level: &[(&str, BinOp)],
        operand: fn(&mut Self) -> Result<Expression, SyntaxError>,
    ) -> Result<Expression, SyntaxError> {
        let mut left = operand(self)?;
        while let Some(op) = self.eat_op(level) {
            let right = operand(self)?;
            left = Expression::binary(op, left, right);
        }
        Ok(left)
    }

    fn or_expr(&mut self) -> Result<Expression, SyntaxError> {
        self.left_assoc(&[("||", BinOp::Or)], Self::and_expr)
    }

    fn and_expr(&mut self) -> Result<Expression, SyntaxError> {
        self.left_assoc(&[("&&", BinOp::And)], Self::not_expr)
    }

    fn not_expr(&mut self) -> Result<Expression, SyntaxError> {
        if self.eat("!") {
            let operand = self.not_expr()?;
            return Ok(Expression::unary(UnOp::Not, operand));
        }
        self.comparison()
    }

    /// The comparison operator next in line, if any
    fn peek_comparison(&self) -> Option<BinOp> {
        self.peek_punct()
            .and_then(BinOp::from_symbol)
            .filter(|op| op.is_comparison())
    }

    fn comparison(&mut self) -> Result<Expression, SyntaxError> {
        let left = self.sum()?;
        let Some(op) = self.peek_comparison() else {
            return Ok(left);
        };
        self.pos += 1;
        let right = self.sum()?;
        if self.peek_comparison().is_some() {
            let offset = self.peek().map_or(self.end, |token| token.offset);
            return Err(SyntaxError::ChainedComparison { offset });
        }
        Ok(Expression::binary(op, left, right))
    }

    fn sum(&mut self) -> Result<Expression, SyntaxError> {
        self.left_assoc(&[("+", BinOp::Add), ("-", BinOp::Sub)], Self::term)
    }

    fn term(&mut self) -> Result<Expression, SyntaxError> {
        self.left_assoc(
            &[("*", BinOp::Mul), ("/", BinOp::Div), ("%", BinOp::Mod)],
            Self::negation,
        )
    }

    fn negation(&mut self) -> Result<Expression, SyntaxError> {
        if self.eat("-") {
            let operand = self.negation()?;
            return Ok(Expression::unary(UnOp::Neg, operand));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expression, SyntaxError> {
        let Some(token) = self.next() else {
            return Err(SyntaxError::UnexpectedEnd { offset: self.end });
        };
        match token.tok {
            Tok::Number(literal) => Ok(Expression::Number(literal)),
            Tok::Ident(name) => {
                let open_offset = match self.peek() {
                    Some(Token {
                        tok: Tok::Punct("("),
                        offset,
                    }) => *offset,
                    _ => return Ok(Expression::Variable(name)),
                };
                self.pos += 1;
                let args = self.arguments(open_offset)?;
                Ok(Expression::Call { name, args })
            }
            Tok::Punct("(") => {
                let inner = self.or_expr()?;
                self.expect_close(token.offset)?;
                Ok(inner)
            }
            Tok::Punct(_) => Err(self.unexpected(token)),
        }
    }

    fn arguments(&mut self, open_offset: usize) -> Result<Vec<Expression>, SyntaxError> {
        let mut args = Vec::new();
        if self.eat(")") {
            return Ok(args);
        }
        loop {
            args.push(self.or_expr()?);
            if !self.eat(",") {
                self.expect_close(open_offset)?;
                return Ok(args);
            }
        }
    }
}

/// Parses a single-line infix expression into an [`Expression`].
///
/// # Errors
///
/// This function will return an error if the input is not a complete
/// expression: an unknown character or misplaced token, premature end of
/// input, unmatched parentheses, a chained comparison or leftover input.
pub fn parse_infix(input: &str) -> Result<Expression, SyntaxError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
    };
    let expr = parser.or_expr()?;
    match parser.next() {
        None => Ok(expr),
        Some(Token {
            tok: Tok::Punct(")"),
            offset,
        }) => Err(SyntaxError::UnmatchedParen { offset }),
        Some(token) => Err(SyntaxError::TrailingInput {
            token: token.tok.to_string(),
            offset: token.offset,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sexp(input: &str) -> String {
        parse_infix(input).unwrap().to_string()
    }

    #[test]
    fn precedence() {
        let expr = parse_infix("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expression::binary(
                BinOp::Add,
                Expression::number("1"),
                Expression::binary(BinOp::Mul, Expression::number("2"), Expression::number("3"))
            )
        );
        assert_eq!(expr.to_string(), "(+ 1 (* 2 3))");
    }

    #[test]
    fn left_associative() {
        assert_eq!(sexp("a - b - c"), "(- (- a b) c)");
        assert_eq!(sexp("a / b * c % d"), "(% (* (/ a b) c) d)");
        assert_eq!(sexp("a || b || c"), "(|| (|| a b) c)");
    }

    #[test]
    fn negation_binds_tight() {
        assert_eq!(sexp("-x + 1"), "(+ (- x) 1)");
        assert_eq!(sexp("--x * y"), "(* (- (- x)) y)");
        assert_eq!(sexp("a - -3"), "(- a (- 3))");
    }

    #[test]
    fn function_calls() {
        assert_eq!(sexp("f(1, 2+3)"), "(f 1 (+ 2 3))");
        assert_eq!(sexp("f()"), "(f)");
        assert_eq!(
            sexp("add(mul(2, 3), div(4, 2))"),
            "(add (mul 2 3) (div 4 2))"
        );
        assert_eq!(
            sexp("outer(inner1(1), inner2(2, 3), 4)"),
            "(outer (inner1 1) (inner2 2 3) 4)"
        );
    }

    #[test]
    fn logical_composition() {
        assert_eq!(
            sexp("!(x == 2 || f(3) > 1) && y < 5"),
            "(&& (! (|| (== x 2) (> (f 3) 1))) (< y 5))"
        );
        assert_eq!(sexp("a || b && c"), "(|| a (&& b c))");
        assert_eq!(sexp("!x == 2"), "(! (== x 2))");
        assert_eq!(sexp("!!a"), "(! (! a))");
    }

    #[test]
    fn comparisons() {
        assert_eq!(sexp("a <= b + 1"), "(<= a (+ b 1))");
        assert_eq!(sexp("max(x, y) != min(x,y)"), "(!= (max x y) (min x y))");
        assert_eq!(sexp("(a < b) == (c >= d)"), "(== (< a b) (>= c d))");
    }

    #[test]
    fn numbers_are_opaque() {
        assert_eq!(sexp("007 + 1.50"), "(+ 007 1.50)");
        assert_eq!(sexp("2e10 * .5"), "(* 2e10 .5)");
    }

    #[test]
    fn whitespace_is_insignificant() {
        assert_eq!(sexp("  f (  a ,b )*2 "), "(* (f a b) 2)");
        assert_eq!(sexp("a\t&&\tb"), "(&& a b)");
    }

    #[test]
    fn chained_comparison() {
        assert_eq!(
            parse_infix("a<b<c"),
            Err(SyntaxError::ChainedComparison { offset: 3 })
        );
        assert_eq!(
            parse_infix("x + 1 >= y != z"),
            Err(SyntaxError::ChainedComparison { offset: 11 })
        );
        assert_eq!(
            parse_infix("(a < b) == (c % 2 < d)").unwrap().to_string(),
            "(== (< a b) (< (% c 2) d))"
        );
    }

    #[test]
    fn unmatched_parens() {
        assert_eq!(
            parse_infix("(a + b"),
            Err(SyntaxError::UnmatchedParen { offset: 0 })
        );
        assert_eq!(
            parse_infix("f(a, (b)"),
            Err(SyntaxError::UnmatchedParen { offset: 1 })
        );
        assert_eq!(
            parse_infix("a + b)"),
            Err(SyntaxError::UnmatchedParen { offset: 5 })
        );
    }

    #[test]
    fn trailing_input() {
        assert_eq!(
            parse_infix("a b"),
            Err(SyntaxError::TrailingInput {
                token: "b".into(),
                offset: 2
            })
        );
        assert!(matches!(
            parse_infix("f(1) 2"),
            Err(SyntaxError::TrailingInput { offset: 5, .. })
        ));
    }

    #[test]
    fn premature_end() {
        assert_eq!(
            parse_infix("a +"),
            Err(SyntaxError::UnexpectedEnd { offset: 3 })
        );
        assert_eq!(parse_infix(""), Err(SyntaxError::UnexpectedEnd { offset: 0 }));
    }

    #[test]
    fn bad_tokens() {
        assert_eq!(
            parse_infix("a = b"),
            Err(SyntaxError::UnexpectedChar { ch: '=', offset: 2 })
        );
        assert_eq!(
            parse_infix("f(a,)"),
            Err(SyntaxError::UnexpectedToken {
                token: ")".into(),
                offset: 4
            })
        );
        assert_eq!(
            parse_infix("* a"),
            Err(SyntaxError::UnexpectedToken {
                token: "*".into(),
                offset: 0
            })
        );
    }
}
