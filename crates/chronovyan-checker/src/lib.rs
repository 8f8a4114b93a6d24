//! Chronovyan Semantic Checker
//!
//! Resolves names through nested scopes, infers expression types, and
//! reports semantic errors to the shared diagnostics sink.

mod analyzer;
mod symbols;
mod types;

pub use analyzer::*;
pub use symbols::*;
pub use types::*;

use chronovyan_ast::Program;
use chronovyan_diagnostics::Diagnostics;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("Undefined function '{name}'")]
    UndefinedFunction { name: String },

    #[error("'{name}' is not a function")]
    NotAFunction { name: String },

    #[error("Call target must be a function name")]
    UnsupportedCallTarget,

    #[error("Variable '{name}' may be used before initialization")]
    UninitializedUse { name: String },

    #[error("Redeclaration of variable '{name}'")]
    RedeclaredVariable { name: String },

    #[error("Redeclaration of function '{name}'")]
    RedeclaredFunction { name: String },

    #[error("Cannot assign value of type '{found}' to variable '{name}' of type '{expected}'")]
    AssignMismatch {
        name: String,
        expected: Type,
        found: Type,
    },

    #[error("Cannot initialize variable of type '{expected}' with value of type '{found}'")]
    InitMismatch { expected: Type, found: Type },

    #[error("Cannot assign to constant '{name}'")]
    AssignToConstant { name: String },

    #[error("Constant '{name}' must be initialized")]
    UninitializedConstant { name: String },

    #[error("Function '{name}' expects {expected} arguments but got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Condition must be a boolean expression")]
    NonBooleanCondition,

    /// An integer was required; `what` names the value, e.g. "Thread count"
    #[error("{what} must be an integer")]
    NonIntegerCount { what: &'static str },

    #[error("Cannot return from top-level code")]
    TopLevelReturn,

    #[error("Invalid operand types for '{op}': '{left}' and '{right}'")]
    InvalidBinaryOperands {
        op: &'static str,
        left: Type,
        right: Type,
    },

    #[error("Invalid operand type for '{op}': '{operand}'")]
    InvalidUnaryOperand { op: &'static str, operand: Type },
}

/// Analyze a parsed program, returning the inferred expression types
pub fn analyze(program: &Program, diagnostics: &mut Diagnostics) -> ExprTypes {
    SemanticAnalyzer::new(diagnostics).analyze(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chronovyan_ast::{BinaryOp, UnaryOp};
    use chronovyan_diagnostics::SourceLocation;

    #[test]
    fn test_error_messages() {
        let err = SemanticError::AssignMismatch {
            name: "x".into(),
            expected: Type::integer(),
            found: Type::string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot assign value of type 'string' to variable 'x' of type 'int'"
        );
        let err = SemanticError::NonIntegerCount {
            what: "Chronons value",
        };
        assert_eq!(err.to_string(), "Chronons value must be an integer");
        let err = SemanticError::UninitializedUse { name: "z".into() };
        assert_eq!(err.to_string(), "Variable 'z' may be used before initialization");
        let err = SemanticError::NotAFunction { name: "v".into() };
        assert_eq!(err.to_string(), "'v' is not a function");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Type::from_name("INT"), Type::integer());
        assert_eq!(Type::from_name("Bool"), Type::boolean());
        assert_eq!(Type::from_name("chronon").to_string(), "chronon");
        assert_eq!(Type::from_name("Timeline").to_string(), "Timeline");
        assert_eq!(Type::from_name("Timeline").base, BaseType::Custom);
    }

    #[test]
    fn test_compatibility() {
        let chronon = Type::from_name("chronon");
        assert!(Type::integer().is_compatible_with(&Type::float()));
        assert!(chronon.is_compatible_with(&Type::integer()));
        assert!(Type::unknown().is_compatible_with(&Type::string()));
        assert!(!Type::string().is_compatible_with(&Type::integer()));
        assert!(!Type::custom("A").is_compatible_with(&Type::custom("B")));
    }

    #[test]
    fn test_binary_results() {
        let int = Type::integer();
        let float = Type::float();
        assert_eq!(Type::binary_result(BinaryOp::Add, &int, &int), Some(Type::integer()));
        assert_eq!(Type::binary_result(BinaryOp::Mul, &int, &float), Some(Type::float()));
        assert_eq!(
            Type::binary_result(BinaryOp::Add, &Type::string(), &int),
            Some(Type::string())
        );
        assert_eq!(Type::binary_result(BinaryOp::Lt, &int, &float), Some(Type::boolean()));
        assert_eq!(Type::binary_result(BinaryOp::Sub, &Type::string(), &int), None);
        assert_eq!(Type::binary_result(BinaryOp::And, &int, &Type::boolean()), None);
        assert_eq!(
            Type::binary_result(BinaryOp::Sub, &Type::unknown(), &int),
            Some(Type::unknown())
        );
    }

    #[test]
    fn test_unary_results() {
        assert_eq!(Type::unary_result(UnaryOp::Neg, &Type::float()), Some(Type::float()));
        assert_eq!(Type::unary_result(UnaryOp::Not, &Type::boolean()), Some(Type::boolean()));
        assert_eq!(Type::unary_result(UnaryOp::Not, &Type::integer()), None);
    }

    #[test]
    fn test_scope_chain() {
        let mut table = SymbolTable::new();
        let loc = SourceLocation::invalid();
        assert!(table.add_symbol(Symbol::variable("x", Type::integer(), loc)));
        assert!(!table.add_symbol(Symbol::variable("x", Type::float(), loc)));

        table.enter_scope();
        assert_eq!(table.depth(), 1);
        assert!(table.lookup_symbol_in_current_scope("x").is_none());
        assert_eq!(table.lookup_symbol("x").unwrap().declared_type, Type::integer());

        // Shadowing is allowed in an inner scope
        assert!(table.add_symbol(Symbol::variable("x", Type::string(), loc)));
        assert_eq!(table.lookup_symbol("x").unwrap().declared_type, Type::string());

        table.exit_scope();
        assert!(table.is_global());
        assert_eq!(table.lookup_symbol("x").unwrap().declared_type, Type::integer());
    }

    #[test]
    #[should_panic(expected = "global scope")]
    fn test_exit_global_scope_panics() {
        let mut table = SymbolTable::new();
        table.exit_scope();
    }
}
