//! Chronovyan Lexer - Tokenization using logos
//!
//! Handles the parts of the language a plain regex table cannot:
//! - integer literals in four bases with `_` separators
//! - string and character escapes (`\n \t \\ \' \0 \xHH`)
//! - nested `/* */` comments
//! - case-insensitive keywords that may be written with or without `_`

mod lexer;
mod scan;
mod token;

pub use lexer::*;
pub use scan::{LexError, LexExtras};
pub use token::*;

use chronovyan_ast::Literal;
use chronovyan_diagnostics::SourceLocation;

/// A token with its text, location and decoded literal value
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text, or the message for error tokens
    pub lexeme: String,
    pub location: SourceLocation,
    pub literal: Option<Literal>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            location,
            literal: None,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Text used when quoting this token in a message
    pub fn display_text(&self) -> &str {
        match self.kind {
            TokenKind::EndOfFile => "end of file",
            _ => &self.lexeme,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronovyan_diagnostics::{Diagnostics, FileId};

    fn lex(source: &str) -> (Vec<Token>, Diagnostics) {
        let mut diags = Diagnostics::new();
        let file = diags.register_file("test.cvy");
        let tokens = tokenize(source, file, &mut diags);
        (tokens, diags)
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).0.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds("let x = 5;"),
            vec![
                TokenKind::Let,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Integer,
                TokenKind::Semicolon,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_two_char_operators() {
        assert_eq!(
            kinds("== != <= >= && || -> ::"),
            vec![
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Arrow,
                TokenKind::ColonColon,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(keyword("while"), Some(TokenKind::While));
        assert_eq!(keyword("WHILE"), Some(TokenKind::While));
        assert_eq!(keyword("Branch_Timeline"), Some(TokenKind::BranchTimeline));
        assert_eq!(keyword("BRANCHTIMELINE"), Some(TokenKind::BranchTimeline));
        assert_eq!(keyword("allocate_resources"), Some(TokenKind::AllocateResources));
        assert_eq!(keyword("timeline"), None);
        assert_eq!(keyword("my_var"), None);
    }

    #[test]
    fn test_boolean_and_null_values() {
        let (tokens, _) = lex("true FALSE null");
        assert_eq!(tokens[0].literal, Some(Literal::Bool(true)));
        assert_eq!(tokens[1].literal, Some(Literal::Bool(false)));
        assert_eq!(tokens[2].literal, Some(Literal::Null));
    }

    #[test]
    fn test_float_and_string_values() {
        let (tokens, diags) = lex("3.25 1_000.5 2e3 \"a\\tb\"");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].literal, Some(Literal::Float(3.25)));
        assert_eq!(tokens[1].literal, Some(Literal::Float(1000.5)));
        assert_eq!(tokens[2].literal, Some(Literal::Float(2000.0)));
        assert_eq!(tokens[3].kind, TokenKind::String);
        assert_eq!(tokens[3].literal, Some(Literal::String("a\tb".to_string())));
    }

    #[test]
    fn test_locations() {
        let (tokens, _) = lex("let\n  x = 1;");
        assert_eq!((tokens[0].location.line, tokens[0].location.column), (1, 1));
        assert_eq!((tokens[1].location.line, tokens[1].location.column), (2, 3));
        assert_eq!((tokens[3].location.line, tokens[3].location.column), (2, 7));
    }

    #[test]
    fn test_bom_is_skipped() {
        let (tokens, diags) = lex("\u{FEFF}let");
        assert!(diags.is_empty());
        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!(tokens[0].location.column, 1);
    }

    #[test]
    fn test_nested_block_comments() {
        assert_eq!(
            kinds("a /* outer /* inner */ still comment */ b"),
            vec![TokenKind::Identifier, TokenKind::Identifier, TokenKind::EndOfFile]
        );
    }

    #[test]
    fn test_unterminated_block_comment() {
        let (tokens, diags) = lex("a /* open /* nested */");
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Error);
        assert_eq!(tokens.last().unwrap().lexeme, "Unterminated block comment");
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_unexpected_character() {
        let (tokens, diags) = lex("a @ b");
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].lexeme, "Unexpected character '@'");
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut diags = Diagnostics::new();
        let mut lexer = Lexer::new("x y", FileId(0));
        assert_eq!(lexer.peek_token(&mut diags).lexeme, "x");
        assert_eq!(lexer.peek_token(&mut diags).lexeme, "x");
        assert_eq!(lexer.next_token(&mut diags).lexeme, "x");
        assert_eq!(lexer.next_token(&mut diags).lexeme, "y");
        assert_eq!(lexer.next_token(&mut diags).kind, TokenKind::EndOfFile);
        assert_eq!(lexer.next_token(&mut diags).kind, TokenKind::EndOfFile);
    }

    #[test]
    fn test_peeked_error_reported_once() {
        let mut diags = Diagnostics::new();
        let mut lexer = Lexer::new("''", FileId(0));
        assert_eq!(lexer.peek_token(&mut diags).kind, TokenKind::Error);
        assert_eq!(lexer.next_token(&mut diags).kind, TokenKind::Error);
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn test_lexing_continues_after_error() {
        let mut diags = Diagnostics::new();
        let mut lexer = Lexer::new("0x + 1", FileId(0));
        assert_eq!(lexer.next_token(&mut diags).kind, TokenKind::Error);
        assert_eq!(lexer.next_token(&mut diags).kind, TokenKind::Plus);
        assert_eq!(lexer.next_token(&mut diags).kind, TokenKind::Integer);
    }
}
