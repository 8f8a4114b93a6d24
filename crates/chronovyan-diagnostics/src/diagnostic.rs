//! Diagnostic messages and the per-compilation sink

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{FileId, SourceLocation};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Hint => "HINT",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single severity-tagged message anchored at a source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: SourceLocation,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, location: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            severity,
            location,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Append-only diagnostic sink shared by every stage of one compilation
///
/// Messages keep their emission order. INFO and HINT messages are only
/// recorded when debug output is enabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    files: Vec<String>,
    entries: Vec<Diagnostic>,
    debug_output: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug_output(debug_output: bool) -> Self {
        Self {
            debug_output,
            ..Self::default()
        }
    }

    /// Intern a file name, returning the id stored in locations
    pub fn register_file(&mut self, name: impl Into<String>) -> FileId {
        let name = name.into();
        if let Some(idx) = self.files.iter().position(|f| *f == name) {
            return FileId(idx as u32);
        }
        self.files.push(name);
        FileId((self.files.len() - 1) as u32)
    }

    pub fn file_name(&self, file: FileId) -> &str {
        self.files
            .get(file.0 as usize)
            .map(String::as_str)
            .unwrap_or("<unknown>")
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.debug_output && matches!(diagnostic.severity, Severity::Info | Severity::Hint) {
            return;
        }
        trace!(severity = %diagnostic.severity, message = %diagnostic.message, "diagnostic");
        self.entries.push(diagnostic);
    }

    pub fn error(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Error, location, message));
    }

    pub fn warning(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Warning, location, message));
    }

    pub fn info(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Info, location, message));
    }

    pub fn hint(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.push(Diagnostic::new(Severity::Hint, location, message));
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_error())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Format as `[SEVERITY] file:line:column: message`
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        let file = self.file_name(diagnostic.location.file);
        if diagnostic.location.is_valid() {
            format!(
                "[{}] {}:{}:{}: {}",
                diagnostic.severity,
                file,
                diagnostic.location.line,
                diagnostic.location.column,
                diagnostic.message
            )
        } else {
            format!("[{}] {}: {}", diagnostic.severity, file, diagnostic.message)
        }
    }

    pub fn render_all(&self) -> String {
        self.entries
            .iter()
            .map(|d| self.render(d))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
