use symbolic_expressions::Sexp;

use super::error::SexpError;
use super::Expression;

/// Reads a canonical prefix expression, like the ones the serializer emits
/// or the quoted rule sides of macro-call rule sources (`"(< ?x (+ ?y 1))"`).
///
/// # Errors
///
/// This function will return an error if the parentheses do not pair up,
/// anything follows the first form, a list is empty or a list sits in head
/// position.
pub fn read_sexp(input: &str) -> Result<Expression, SexpError> {
    fn rec(sexp: &Sexp) -> Result<Expression, SexpError> {
        match sexp {
            Sexp::Empty => Err(SexpError::EmptySexp),
            Sexp::String(s) => Ok(Expression::atom(s)),
            Sexp::List(list) => match list.split_first() {
                None => Err(SexpError::EmptySexp),
                Some((Sexp::String(head), rest)) => {
                    let args = rest.iter().map(rec).collect::<Result<Vec<_>, _>>()?;
                    Ok(Expression::from_head(head, args))
                }
                Some((head, _)) => Err(SexpError::HeadList(head.to_owned())),
            },
        }
    }

    let input = input.trim();
    check_shape(input)?;
    let sexp = symbolic_expressions::parser::parse_str(input).map_err(SexpError::BadSexp)?;
    rec(&sexp)
}

/// Parentheses must pair up and the input must hold exactly one form.
fn check_shape(input: &str) -> Result<(), SexpError> {
    let mut depth = 0usize;
    let mut in_atom = false;
    let mut closed = false;
    for (offset, c) in input.char_indices() {
        match c {
            ')' if closed => return Err(SexpError::Unbalanced(offset)),
            _ if closed && !c.is_whitespace() => return Err(SexpError::TrailingInput(offset)),
            '(' if in_atom && depth == 0 => return Err(SexpError::TrailingInput(offset)),
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1).ok_or(SexpError::Unbalanced(offset))?;
                closed = depth == 0;
            }
            _ if c.is_whitespace() => closed = closed || (in_atom && depth == 0),
            _ if depth == 0 => in_atom = true,
            _ => (),
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(SexpError::Unbalanced(input.len()))
    }
}
