//! Scanning callbacks for literals and comments that need more than a regex

use chronovyan_ast::Literal;
use logos::{FilterResult, Lexer};

use crate::TokenKind;

/// Error produced by a scanning callback
///
/// An empty message means logos found no matching rule; the lexer turns
/// that into an "Unexpected character" message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexError {
    pub message: String,
}

impl LexError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Per-token state shared with callbacks
#[derive(Debug, Default)]
pub struct LexExtras {
    /// Decoded value of the literal just scanned
    pub literal: Option<Literal>,
}

type Lex<'s> = Lexer<'s, TokenKind>;

pub(crate) fn decimal(lex: &mut Lex<'_>) -> Result<(), LexError> {
    let digits = strip_separators(lex.slice());
    let value = if digits.len() > 1 && digits.starts_with('0') {
        parse_digits(&digits[1..], 8, "octal")?
    } else {
        parse_digits(&digits, 10, "decimal")?
    };
    lex.extras.literal = Some(Literal::Int(value));
    Ok(())
}

pub(crate) fn hex(lex: &mut Lex<'_>) -> Result<(), LexError> {
    prefixed(lex, 16, "hexadecimal")
}

pub(crate) fn binary(lex: &mut Lex<'_>) -> Result<(), LexError> {
    prefixed(lex, 2, "binary")
}

pub(crate) fn octal(lex: &mut Lex<'_>) -> Result<(), LexError> {
    prefixed(lex, 8, "octal")
}

fn prefixed(lex: &mut Lex<'_>, radix: u32, name: &str) -> Result<(), LexError> {
    let slice = lex.slice();
    let prefix = slice[..2].to_ascii_lowercase();
    let digits = strip_separators(&slice[2..]);
    if digits.is_empty() {
        return Err(LexError::new(format!("Missing digits after '{}' prefix", prefix)));
    }
    // Separators go between digits, not right after the prefix
    if slice[2..].starts_with('_') {
        return Err(LexError::new(format!("Invalid digit '_' in {} literal", name)));
    }
    let value = parse_digits(&digits, radix, name)?;
    lex.extras.literal = Some(Literal::Int(value));
    Ok(())
}

pub(crate) fn float(lex: &mut Lex<'_>) -> Result<(), LexError> {
    let text = strip_separators(lex.slice());
    let value: f64 = text
        .parse()
        .map_err(|_| LexError::new("Invalid float literal"))?;
    lex.extras.literal = Some(Literal::Float(value));
    Ok(())
}

fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| *c != '_').collect()
}

fn parse_digits(digits: &str, radix: u32, name: &str) -> Result<i64, LexError> {
    if let Some(bad) = digits.chars().find(|c| !c.is_digit(radix)) {
        return Err(LexError::new(format!("Invalid digit '{}' in {} literal", bad, name)));
    }
    i64::from_str_radix(digits, radix).map_err(|_| LexError::new("Integer literal out of range"))
}

/// A decoded escape: the byte value and how many bytes followed the backslash
type Escape = Result<(u32, usize), (LexError, usize)>;

/// Decode the escape sequence starting just after a backslash
fn escape(rest: &str) -> Escape {
    let mut chars = rest.chars();
    let Some(c) = chars.next() else {
        return Err((LexError::new("Incomplete escape sequence"), 0));
    };
    let value = match c {
        'n' => b'\n',
        't' => b'\t',
        'r' => b'\r',
        '0' => 0,
        '\\' => b'\\',
        '\'' => b'\'',
        '"' => b'"',
        'x' => {
            let digits: String = rest[1..]
                .chars()
                .take(2)
                .take_while(|d| d.is_ascii_hexdigit())
                .collect();
            if digits.is_empty() {
                return Err((LexError::new("Invalid hex escape sequence: missing digit"), 1));
            }
            let value = u32::from_str_radix(&digits, 16).unwrap_or(0);
            return Ok((value, 1 + digits.len()));
        }
        other => {
            return Err((
                LexError::new(format!("Unrecognized escape sequence: \\{}", other)),
                other.len_utf8(),
            ))
        }
    };
    Ok((u32::from(value), 1))
}

pub(crate) fn string(lex: &mut Lex<'_>) -> Result<(), LexError> {
    let rest = lex.remainder();
    let mut value = String::new();
    let mut error = None;
    let mut i = 0;

    while let Some(c) = rest[i..].chars().next() {
        match c {
            '"' => {
                lex.bump(i + 1);
                return match error {
                    Some(err) => Err(err),
                    None => {
                        lex.extras.literal = Some(Literal::String(value));
                        Ok(())
                    }
                };
            }
            '\\' => match escape(&rest[i + 1..]) {
                Ok((byte, used)) => {
                    value.push(char::from_u32(byte).unwrap_or('\u{FFFD}'));
                    i += 1 + used;
                }
                Err((err, used)) => {
                    error.get_or_insert(err);
                    i += 1 + used;
                }
            },
            _ => {
                value.push(c);
                i += c.len_utf8();
            }
        }
    }

    lex.bump(rest.len());
    Err(LexError::new("Unterminated string literal"))
}

pub(crate) fn character(lex: &mut Lex<'_>) -> Result<(), LexError> {
    let rest = lex.remainder();
    let Some(first) = rest.chars().next() else {
        return Err(LexError::new(
            "Unterminated character literal: missing closing quote",
        ));
    };

    if first == '\'' {
        lex.bump(1);
        return Err(LexError::new("Empty character literal"));
    }

    let (value, used) = if first == '\\' {
        match escape(&rest[1..]) {
            Ok((value, used)) => (value, 1 + used),
            Err((err, used)) => {
                let consumed = 1 + used;
                let closing = usize::from(rest[consumed..].starts_with('\''));
                lex.bump(consumed + closing);
                return Err(err);
            }
        }
    } else {
        (first as u32, first.len_utf8())
    };

    let after = &rest[used..];
    match after.chars().next() {
        Some('\'') => {
            lex.bump(used + 1);
            lex.extras.literal = Some(Literal::Int(i64::from(value)));
            Ok(())
        }
        None | Some('\n') => {
            lex.bump(used);
            Err(LexError::new("Missing closing quote in character literal"))
        }
        Some(_) => {
            // Resynchronise on the next quote of this line
            let line = after.split('\n').next().unwrap_or("");
            let skip = match line.find('\'') {
                Some(pos) => pos + 1,
                None => line.len(),
            };
            lex.bump(used + skip);
            Err(LexError::new(
                "Character literal must contain exactly one character",
            ))
        }
    }
}

/// Skip a `/* */` comment, honouring nesting
pub(crate) fn block_comment(lex: &mut Lex<'_>) -> FilterResult<(), LexError> {
    let bytes = lex.remainder().as_bytes();
    let mut depth = 1usize;
    let mut i = 0;

    while i < bytes.len() {
        match (bytes[i], bytes.get(i + 1)) {
            (b'/', Some(b'*')) => {
                depth += 1;
                i += 2;
            }
            (b'*', Some(b'/')) => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    lex.bump(i);
                    return FilterResult::Skip;
                }
            }
            _ => i += 1,
        }
    }

    lex.bump(bytes.len());
    FilterResult::Error(LexError::new("Unterminated block comment"))
}
