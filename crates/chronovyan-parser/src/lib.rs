//! Chronovyan Parser - Recursive descent parser
//!
//! Parses Chronovyan source into an AST. The parser never fails: syntax
//! errors are reported to the diagnostics sink, the parser resynchronizes
//! at the next statement boundary, and missing conditions or bodies are
//! replaced with placeholders so the returned tree is always well formed.

mod error;
mod parser;

pub use error::*;
pub use parser::*;

use chronovyan_ast::Program;
use chronovyan_diagnostics::{Diagnostics, FileId};

/// Parse a source string into a Program AST
pub fn parse(source: &str, file: FileId, diagnostics: &mut Diagnostics) -> Program {
    Parser::new(source, file, diagnostics).parse()
}
