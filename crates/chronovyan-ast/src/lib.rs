//! Chronovyan AST - Core types for the abstract syntax tree
//!
//! The node set is closed: every consumer (analyzer, IR lowering, module
//! encoder) walks the tree with an exhaustive `match`. Each node owns its
//! children and carries the location of the token that introduced it.

mod decl;
mod expr;
mod stmt;
mod types;

pub use decl::*;
pub use expr::*;
pub use stmt::*;
pub use types::*;

pub use chronovyan_diagnostics::{FileId, SourceLocation};

use serde::{Deserialize, Serialize};

/// Deepest nesting of statements and expressions the parser will build
///
/// Tree walkers recurse without a limit of their own and rely on this bound.
pub const MAX_NESTING: usize = 128;

/// A complete Chronovyan compilation unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub declarations: Vec<Decl>,
    pub location: SourceLocation,
}

impl Program {
    pub fn new(declarations: Vec<Decl>, location: SourceLocation) -> Self {
        Self {
            declarations,
            location,
        }
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.declarations.iter().filter_map(|d| match d {
            Decl::Function(f) => Some(f),
            _ => None,
        })
    }
}
