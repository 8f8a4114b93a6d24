//! Literal scanning: numeric bases, separators, character literals

use chronovyan_ast::Literal;
use chronovyan_diagnostics::Diagnostics;
use chronovyan_lexer::{tokenize, Token, TokenKind};
use proptest::prelude::*;

fn lex(source: &str) -> (Vec<Token>, Diagnostics) {
    let mut diags = Diagnostics::new();
    let file = diags.register_file("literals.cvy");
    let tokens = tokenize(source, file, &mut diags);
    (tokens, diags)
}

/// Lex a source expected to hold exactly one token before end-of-file
fn single(source: &str) -> Token {
    let (tokens, _) = lex(source);
    assert!(
        tokens.len() == 2 || tokens[0].kind == TokenKind::Error,
        "expected one token for {:?}, got {:?}",
        source,
        tokens
    );
    tokens.into_iter().next().unwrap()
}

#[test]
fn test_prefixed_integers_with_separators() {
    let cases = [
        ("0x1A_3F", 0x1A3F),
        ("0b1010_0101", 0b1010_0101),
        ("0o1_2_3", 0o123),
        ("0XFF", 255),
        ("1_000_000", 1_000_000),
        ("017", 15),
        ("0", 0),
    ];
    for (source, expected) in cases {
        let token = single(source);
        assert_eq!(token.kind, TokenKind::Integer, "{}", source);
        assert_eq!(token.literal, Some(Literal::Int(expected)), "{}", source);
    }
}

#[test]
fn test_bare_prefix_is_single_error() {
    for prefix in ["0x", "0b", "0o"] {
        let (tokens, diags) = lex(prefix);
        assert_eq!(tokens.len(), 1, "{}", prefix);
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].lexeme, format!("Missing digits after '{}' prefix", prefix));
        assert_eq!(diags.error_count(), 1);
    }
}

#[test]
fn test_invalid_digits() {
    assert_eq!(single("0b102").lexeme, "Invalid digit '2' in binary literal");
    assert_eq!(single("0o8").lexeme, "Invalid digit '8' in octal literal");
    assert_eq!(single("09").lexeme, "Invalid digit '9' in octal literal");
    assert_eq!(single("0xFG").lexeme, "Invalid digit 'G' in hexadecimal literal");
    assert_eq!(single("99999999999999999999").lexeme, "Integer literal out of range");
}

#[test]
fn test_separator_after_prefix_is_rejected() {
    assert_eq!(single("0x_1").lexeme, "Invalid digit '_' in hexadecimal literal");
    assert_eq!(single("0b_10").lexeme, "Invalid digit '_' in binary literal");
    assert_eq!(single("0O_7").lexeme, "Invalid digit '_' in octal literal");
    assert_eq!(single("0x1_F").literal, Some(Literal::Int(0x1F)));
}

#[test]
fn test_character_literal_values() {
    let cases = [
        ("'a'", b'a'),
        ("'\\n'", b'\n'),
        ("'\\t'", b'\t'),
        ("'\\\\'", b'\\'),
        ("'\\''", b'\''),
        ("'\\0'", 0),
        ("'\\x41'", 0x41),
        ("'\\x7'", 0x07),
    ];
    for (source, expected) in cases {
        let token = single(source);
        assert_eq!(token.kind, TokenKind::Character, "{}", source);
        assert_eq!(token.literal, Some(Literal::Int(i64::from(expected))), "{}", source);
        assert_eq!(token.lexeme, source);
    }
}

#[test]
fn test_character_literal_errors() {
    assert_eq!(single("''").lexeme, "Empty character literal");
    assert!(single("'ab'").lexeme.contains("exactly one character"));
    assert!(single("'a").lexeme.contains("Missing closing quote"));
    assert_eq!(
        single("'").lexeme,
        "Unterminated character literal: missing closing quote"
    );
    assert_eq!(single("'\\x'").lexeme, "Invalid hex escape sequence: missing digit");
    assert_eq!(single("'\\q'").lexeme, "Unrecognized escape sequence: \\q");
    assert_eq!(single("'\\").lexeme, "Incomplete escape sequence");
}

#[test]
fn test_lexer_resyncs_after_long_char_literal() {
    let mut diags = Diagnostics::new();
    let mut lexer = chronovyan_lexer::Lexer::new("'abc' + 1", diags.register_file("t.cvy"));
    assert_eq!(lexer.next_token(&mut diags).kind, TokenKind::Error);
    assert_eq!(lexer.next_token(&mut diags).kind, TokenKind::Plus);
    assert_eq!(lexer.next_token(&mut diags).literal, Some(Literal::Int(1)));
}

#[test]
fn test_unterminated_string() {
    let token = single("\"never closed");
    assert_eq!(token.kind, TokenKind::Error);
    assert_eq!(token.lexeme, "Unterminated string literal");
}

#[test]
fn test_string_spans_lines() {
    let (tokens, diags) = lex("\"one\ntwo\" x");
    assert!(diags.is_empty());
    assert_eq!(tokens[0].literal, Some(Literal::String("one\ntwo".to_string())));
    assert_eq!(tokens[1].location.line, 2);
}

proptest! {
    #[test]
    fn prop_separators_do_not_change_value(value in 0u32..u32::MAX, every in 1usize..4) {
        for (prefix, digits) in [
            ("", format!("{}", value)),
            ("0x", format!("{:x}", value)),
            ("0b", format!("{:b}", value)),
            ("0o", format!("{:o}", value)),
        ] {
            // An underscore after every `every` digits, never leading
            let mut separated = String::new();
            for (i, c) in digits.chars().enumerate() {
                if i > 0 && i % every == 0 {
                    separated.push('_');
                }
                separated.push(c);
            }
            if prefix.is_empty() && separated.starts_with('0') && separated.len() > 1 {
                continue;
            }
            let source = format!("{}{}", prefix, separated);
            let token = single(&source);
            prop_assert_eq!(token.kind, TokenKind::Integer);
            prop_assert_eq!(token.literal, Some(Literal::Int(i64::from(value))));
        }
    }
}
