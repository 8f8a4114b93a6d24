//! Parser error types

use chronovyan_diagnostics::SourceLocation;
use thiserror::Error;

/// A syntax error
///
/// The display text is exactly the diagnostic message reported for it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{message}")]
    Expected {
        message: String,
        location: SourceLocation,
    },

    #[error("Expected expression, got '{found}'")]
    ExpectedExpression {
        found: String,
        location: SourceLocation,
    },

    #[error("Invalid assignment target. Left side must be a variable.")]
    InvalidAssignmentTarget { location: SourceLocation },

    #[error("{what} nesting too deep")]
    NestingTooDeep {
        what: &'static str,
        location: SourceLocation,
    },
}

impl ParseError {
    pub fn location(&self) -> SourceLocation {
        match self {
            ParseError::Expected { location, .. } => *location,
            ParseError::ExpectedExpression { location, .. } => *location,
            ParseError::InvalidAssignmentTarget { location } => *location,
            ParseError::NestingTooDeep { location, .. } => *location,
        }
    }

    pub fn expected(message: impl Into<String>, location: SourceLocation) -> Self {
        ParseError::Expected {
            message: message.into(),
            location,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
