//! Type annotation nodes

use serde::{Deserialize, Serialize};
use crate::SourceLocation;

/// A named type as written after `:` in a declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAnnotation {
    pub name: String,
    pub location: SourceLocation,
}

impl TypeAnnotation {
    pub fn new(name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}
