//! Resolved types and operator typing rules

use std::fmt;

use chronovyan_ast::{BinaryOp, Literal, UnaryOp};
use serde::{Deserialize, Serialize};

/// Base category of a resolved type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseType {
    Unknown,
    Void,
    Boolean,
    Integer,
    Float,
    String,
    Chronon,
    Aethel,
    Array,
    Map,
    Function,
    Custom,
}

/// A resolved type
///
/// `Unknown` is compatible with everything so that one failure does not
/// produce a chain of follow-on mismatches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Type {
    pub base: BaseType,
    pub custom_name: Option<String>,
}

impl Type {
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            custom_name: None,
        }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        Self {
            base: BaseType::Custom,
            custom_name: Some(name.into()),
        }
    }

    pub fn unknown() -> Self {
        Self::new(BaseType::Unknown)
    }

    pub fn boolean() -> Self {
        Self::new(BaseType::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(BaseType::Integer)
    }

    pub fn float() -> Self {
        Self::new(BaseType::Float)
    }

    pub fn string() -> Self {
        Self::new(BaseType::String)
    }

    /// Map a type name as written in source
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "void" => Self::new(BaseType::Void),
            "boolean" | "bool" => Self::boolean(),
            "int" | "integer" => Self::integer(),
            "float" => Self::float(),
            "string" => Self::string(),
            "chronon" => Self::new(BaseType::Chronon),
            "aethel" => Self::new(BaseType::Aethel),
            _ => Self::custom(name),
        }
    }

    pub fn of_literal(literal: &Literal) -> Self {
        match literal {
            Literal::Int(_) => Self::integer(),
            Literal::Float(_) => Self::float(),
            Literal::String(_) => Self::string(),
            Literal::Bool(_) => Self::boolean(),
            Literal::Null => Self::unknown(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.base == BaseType::Unknown
    }

    pub fn is_boolean(&self) -> bool {
        self.base == BaseType::Boolean
    }

    pub fn is_string(&self) -> bool {
        self.base == BaseType::String
    }

    pub fn is_float(&self) -> bool {
        self.base == BaseType::Float
    }

    /// Integers and the two resource quantities, which are counted in whole units
    pub fn is_integer_like(&self) -> bool {
        matches!(
            self.base,
            BaseType::Integer | BaseType::Chronon | BaseType::Aethel
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer_like() || self.is_float()
    }

    pub fn is_compatible_with(&self, other: &Type) -> bool {
        if self.is_unknown() || other.is_unknown() {
            return true;
        }
        if self.is_numeric() && other.is_numeric() {
            return true;
        }
        match (self.base, other.base) {
            (BaseType::Custom, BaseType::Custom) => self.custom_name == other.custom_name,
            (a, b) => a == b,
        }
    }

    /// Result type of a binary operator, or `None` if the operands are invalid
    pub fn binary_result(op: BinaryOp, left: &Type, right: &Type) -> Option<Type> {
        if op.is_comparison() {
            return left.is_compatible_with(right).then(Type::boolean);
        }
        if left.is_unknown() || right.is_unknown() {
            return Some(Type::unknown());
        }
        if op.is_logical() {
            return (left.is_boolean() && right.is_boolean()).then(Type::boolean);
        }
        if op == BinaryOp::Add && (left.is_string() || right.is_string()) {
            let concatenable = |t: &Type| t.is_string() || t.is_numeric();
            return (concatenable(left) && concatenable(right)).then(Type::string);
        }
        if left.is_numeric() && right.is_numeric() {
            if left.is_float() || right.is_float() {
                return Some(Type::float());
            }
            return Some(Type::integer());
        }
        None
    }

    /// Result type of a unary operator, or `None` if the operand is invalid
    pub fn unary_result(op: UnaryOp, operand: &Type) -> Option<Type> {
        if operand.is_unknown() {
            return Some(Type::unknown());
        }
        match op {
            UnaryOp::Neg => operand.is_numeric().then(|| operand.clone()),
            UnaryOp::Not => operand.is_boolean().then(Type::boolean),
        }
    }
}

impl Default for Type {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.base {
            BaseType::Unknown => "unknown",
            BaseType::Void => "void",
            BaseType::Boolean => "boolean",
            BaseType::Integer => "int",
            BaseType::Float => "float",
            BaseType::String => "string",
            BaseType::Chronon => "chronon",
            BaseType::Aethel => "aethel",
            BaseType::Array => "array",
            BaseType::Map => "map",
            BaseType::Function => "function",
            BaseType::Custom => self.custom_name.as_deref().unwrap_or("custom"),
        };
        f.write_str(name)
    }
}
