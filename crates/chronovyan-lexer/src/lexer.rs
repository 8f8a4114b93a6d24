//! Lazy token stream over a source string

use chronovyan_ast::Literal;
use chronovyan_diagnostics::{Diagnostics, FileId, SourceLocation};
use logos::Logos;
use tracing::trace;

use crate::{keyword, Token, TokenKind};

const BOM: &str = "\u{FEFF}";

/// Pull-based lexer
///
/// Malformed input never stops the lexer: it yields a single
/// [`TokenKind::Error`] token whose lexeme is the message, reports it to the
/// diagnostics sink, and keeps going from a consistent position.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    /// Bytes skipped before `inner` starts (a leading BOM)
    offset: usize,
    file: FileId,
    line_starts: Vec<usize>,
    peeked: Option<Token>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, file: FileId) -> Self {
        let offset = if source.starts_with(BOM) { BOM.len() } else { 0 };
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            inner: TokenKind::lexer(&source[offset..]),
            source,
            offset,
            file,
            line_starts,
            peeked: None,
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    /// Consume and return the next token
    pub fn next_token(&mut self, diagnostics: &mut Diagnostics) -> Token {
        match self.peeked.take() {
            Some(token) => token,
            None => self.scan(diagnostics),
        }
    }

    /// Look at the next token without consuming it
    pub fn peek_token(&mut self, diagnostics: &mut Diagnostics) -> &Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan(diagnostics),
        };
        self.peeked.insert(token)
    }

    /// Collect tokens up to and including the first end-of-file or error
    pub fn tokenize(&mut self, diagnostics: &mut Diagnostics) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token(diagnostics);
            let stop = matches!(token.kind, TokenKind::EndOfFile | TokenKind::Error);
            tokens.push(token);
            if stop {
                return tokens;
            }
        }
    }

    fn scan(&mut self, diagnostics: &mut Diagnostics) -> Token {
        self.inner.extras.literal = None;

        let Some(result) = self.inner.next() else {
            let location = self.location_at(self.source.len());
            return Token::new(TokenKind::EndOfFile, "", location);
        };

        let span = self.inner.span();
        let text = self.inner.slice();
        let location = self.location_at(self.offset + span.start);

        match result {
            Ok(kind) => {
                let kind = match kind {
                    TokenKind::Identifier => keyword(text).unwrap_or(TokenKind::Identifier),
                    other => other,
                };
                let literal = match kind {
                    TokenKind::True => Some(Literal::Bool(true)),
                    TokenKind::False => Some(Literal::Bool(false)),
                    TokenKind::Null => Some(Literal::Null),
                    _ => self.inner.extras.literal.take(),
                };
                trace!(kind = kind.describe(), lexeme = text, line = location.line, "token");
                Token {
                    kind,
                    lexeme: text.to_string(),
                    location,
                    literal,
                }
            }
            Err(err) => {
                let message = if err.message.is_empty() {
                    let c = text.chars().next().unwrap_or('\0');
                    format!("Unexpected character '{}'", c)
                } else {
                    err.message
                };
                diagnostics.error(location, message.clone());
                Token::new(TokenKind::Error, message, location)
            }
        }
    }

    /// Convert a byte offset into a 1-based line and character column
    fn location_at(&self, offset: usize) -> SourceLocation {
        let line_idx = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[line_idx];
        let mut column = self.source[line_start..offset].chars().count() + 1;
        if line_idx == 0 && self.offset > 0 {
            column -= 1;
        }
        SourceLocation::new(self.file, line_idx as u32 + 1, column as u32)
    }
}

/// Tokenize a whole source string
pub fn tokenize(source: &str, file: FileId, diagnostics: &mut Diagnostics) -> Vec<Token> {
    Lexer::new(source, file).tokenize(diagnostics)
}
