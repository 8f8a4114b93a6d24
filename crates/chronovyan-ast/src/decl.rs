//! Declaration AST nodes

use serde::{Deserialize, Serialize};
use crate::{Block, Expr, SourceLocation, Stmt, TypeAnnotation};

/// A top-level or block-level declaration
///
/// Any statement can stand where a declaration is expected; it is wrapped
/// in [`Decl::Stmt`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decl {
    Var(VarDecl),
    Function(FunctionDecl),
    Stmt(Stmt),
}

impl Decl {
    pub fn location(&self) -> SourceLocation {
        match self {
            Decl::Var(v) => v.location,
            Decl::Function(f) => f.location,
            Decl::Stmt(s) => s.location,
        }
    }
}

/// `let x: int = 5;` or `const y = 2;`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub is_const: bool,
    pub type_annotation: Option<TypeAnnotation>,
    pub initializer: Option<Expr>,
    pub location: SourceLocation,
    /// Location of the variable name
    pub name_location: SourceLocation,
}

/// `FUNCTION name(a, b) { ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Block,
    pub location: SourceLocation,
}

impl FunctionDecl {
    pub fn param_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub location: SourceLocation,
}
