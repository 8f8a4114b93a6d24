//! Source location tracking

use serde::{Deserialize, Serialize};

/// Interned handle to a file name registered with [`crate::Diagnostics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FileId(pub u32);

/// A position in source code
///
/// Lines and columns are 1-based. A location with line or column 0 is
/// invalid and is used where no meaningful position exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: FileId,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: FileId, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    pub fn invalid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.line > 0 && self.column > 0
    }
}
