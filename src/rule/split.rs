use serde::Serialize;

use super::error::FormatError;
use super::Notation;

/// One piece of a line, cut at a delimiter that sits outside quotes and parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub text: &'a str,
    /// Byte offset of the segment in the scanned line
    pub offset: usize,
    /// Delimiter that ended this segment, `None` for the last one
    pub delimiter: Option<&'static str>,
}

impl Segment<'_> {
    fn end(&self) -> usize {
        self.offset + self.text.len()
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Code,
    Quoted { start: usize },
    Escaped { start: usize },
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Keyword delimiters (`if`) only match as whole words.
fn delimiter_at(bytes: &[u8], i: usize, delimiter: &str) -> bool {
    if !bytes[i..].starts_with(delimiter.as_bytes()) {
        return false;
    }
    if delimiter.bytes().all(|b| b.is_ascii_alphabetic()) {
        let before = i.checked_sub(1).map(|j| bytes[j]);
        let after = bytes.get(i + delimiter.len()).copied();
        return !before.is_some_and(is_ident_byte) && !after.is_some_and(is_ident_byte);
    }
    true
}

/// Cuts `text` at every top-level occurrence of one of `delimiters`.
/// Offsets are reported relative to `base`.
pub(crate) fn scan<'a>(
    text: &'a str,
    base: usize,
    delimiters: &[&'static str],
) -> Result<Vec<Segment<'a>>, FormatError> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut state = State::Code;
    let mut depth = 0usize;
    let mut segment_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match state {
            State::Escaped { start } => state = State::Quoted { start },
            State::Quoted { start } => match b {
                b'\\' => state = State::Escaped { start },
                b'"' => state = State::Code,
                _ => (),
            },
            State::Code => match b {
                b'"' => state = State::Quoted { start: i },
                b'(' => depth += 1,
                b')' => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(FormatError::UnbalancedParen(base + i))?;
                }
                _ if depth == 0 => {
                    if let Some(delimiter) = delimiters.iter().find(|d| delimiter_at(bytes, i, d)) {
                        segments.push(Segment {
                            text: &text[segment_start..i],
                            offset: base + segment_start,
                            delimiter: Some(*delimiter),
                        });
                        i += delimiter.len();
                        segment_start = i;
                        continue;
                    }
                }
                _ => (),
            },
        }
        i += 1;
    }

    match state {
        State::Quoted { start } | State::Escaped { start } => {
            Err(FormatError::UnterminatedQuote(base + start))
        }
        State::Code if depth > 0 => Err(FormatError::UnbalancedParen(base + text.len())),
        State::Code => {
            segments.push(Segment {
                text: &text[segment_start..],
                offset: base + segment_start,
                delimiter: None,
            });
            Ok(segments)
        }
    }
}

/// Splits on a single delimiter at top level, keeping the pieces untrimmed.
///
/// # Errors
///
/// This function will return an error if a quote is left open or the
/// parentheses do not pair up.
pub fn split_top_level<'a>(text: &'a str, delimiter: &'static str) -> Result<Vec<&'a str>, FormatError> {
    Ok(scan(text, 0, &[delimiter])?
        .into_iter()
        .map(|segment| segment.text)
        .collect())
}

/// Contents of the first quoted string in `text`, with `\"` and `\\` unescaped.
fn first_quoted(text: &str, base: usize) -> Result<String, FormatError> {
    let Some(open) = text.find('"') else {
        return Err(FormatError::MissingQuote(text.trim().to_owned()));
    };
    let mut content = String::new();
    let mut chars = text[open + 1..].chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Ok(content),
            '\\' => match chars.next() {
                Some(escaped @ ('"' | '\\')) => content.push(escaped),
                Some(other) => {
                    content.push('\\');
                    content.push(other);
                }
                None => break,
            },
            _ => content.push(c),
        }
    }
    Err(FormatError::UnterminatedQuote(base + open))
}

/// The raw text pieces of one rule line, before any expression is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleParts {
    /// Only macro-call lines carry a name
    pub name: Option<String>,
    pub lhs: String,
    pub rhs: String,
    pub condition: Option<String>,
}

/// Splits `text` into lhs, rhs and optional condition around `arrow` and `if`.
fn split_sides<'a>(
    text: &'a str,
    base: usize,
    arrow: &'static str,
) -> Result<(Segment<'a>, Segment<'a>, Option<Segment<'a>>), FormatError> {
    let segments = scan(text, base, &[arrow, "if"])?;
    let (lhs, rhs, condition) = match segments.as_slice() {
        [lhs, rhs] => (*lhs, *rhs, None),
        [lhs, rhs, condition] => (*lhs, *rhs, Some(*condition)),
        other => return Err(FormatError::SegmentCount(other.len())),
    };

    let expected = if condition.is_some() {
        [Some(arrow), Some("if")]
    } else {
        [Some(arrow), None]
    };
    for (segment, expected) in [lhs, rhs].iter().zip(expected) {
        if segment.delimiter != expected {
            return Err(FormatError::MisplacedDelimiter {
                delimiter: segment.delimiter.unwrap_or(arrow),
                offset: segment.end(),
            });
        }
    }

    for segment in [Some(lhs), Some(rhs), condition].into_iter().flatten() {
        if segment.text.trim().is_empty() {
            return Err(FormatError::EmptySegment(segment.offset));
        }
    }
    Ok((lhs, rhs, condition))
}

/// `lhs ==> rhs` or `lhs ==> rhs if cond`, all three in infix notation.
fn split_infix(line: &str) -> Result<RuleParts, FormatError> {
    let (lhs, rhs, condition) = split_sides(line, 0, "==>")?;
    Ok(RuleParts {
        name: None,
        lhs: lhs.text.trim().to_owned(),
        rhs: rhs.text.trim().to_owned(),
        condition: condition.map(|c| c.text.trim().to_owned()),
    })
}

/// Cuts a trailing `//` comment that starts outside quotes.
fn strip_line_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut state = State::Code;
    for (i, &b) in bytes.iter().enumerate() {
        state = match (state, b) {
            (State::Code, b'/') if bytes.get(i + 1) == Some(&b'/') => return &line[..i],
            (State::Code, b'"') => State::Quoted { start: i },
            (State::Quoted { start }, b'\\') => State::Escaped { start },
            (State::Quoted { .. }, b'"') => State::Code,
            (State::Escaped { start }, _) => State::Quoted { start },
            (state, _) => state,
        };
    }
    line
}

/// `rw!("name"; "lhs" => "rhs" if predicate(args)),` with prefix-notation sides.
fn split_macro(line: &str) -> Result<RuleParts, FormatError> {
    let missing_wrapper = || FormatError::MissingWrapper(line.trim().to_owned());
    let trimmed = strip_line_comment(line).trim_end();
    let body = trimmed.strip_suffix(',').unwrap_or(trimmed).trim_end();
    let open = body.find('(').ok_or_else(missing_wrapper)?;
    if !body[..open].trim().ends_with('!') || !body.ends_with(')') {
        return Err(missing_wrapper());
    }
    let inner = &body[open + 1..body.len() - 1];
    let base = open + 1;

    let parts = scan(inner, base, &[";"])?;
    let [name, rule] = parts.as_slice() else {
        return Err(FormatError::SegmentCount(parts.len()));
    };
    let (lhs, rhs, condition) = split_sides(rule.text, rule.offset, "=>")?;

    Ok(RuleParts {
        name: Some(first_quoted(name.text, name.offset)?),
        lhs: first_quoted(lhs.text, lhs.offset)?,
        rhs: first_quoted(rhs.text, rhs.offset)?,
        condition: condition.map(|c| c.text.trim().to_owned()),
    })
}

/// Locates the name, lhs, rhs and condition text of one raw rule line.
///
/// # Errors
///
/// This function will return an error if the line does not split into two
/// or three well-ordered segments, a quoted string is missing or left open,
/// or parentheses outside quotes do not pair up.
pub fn split_rule(line: &str, notation: Notation) -> Result<RuleParts, FormatError> {
    match notation {
        Notation::Halide => split_infix(line),
        Notation::Caviar => split_macro(line),
    }
}
