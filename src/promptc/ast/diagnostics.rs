//! Diagnostics produced while compiling a prompt
//!
//! Every phase reports problems by appending to a [`Diagnostics`] collector
//! rather than returning early. The collector is append-only: entries keep
//! the order in which they were detected and are never rewritten.

use super::location::SourceLocation;
use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is. Only errors make a compile fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Which phase of the compile found the problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// Tabs in indentation, spacing that is not a multiple of 4, bad outdents
    Indentation,
    /// Malformed keyword lines, bad directive arguments, stray text
    Syntax,
    /// Missing or duplicate blocks and illegal nesting
    Structure,
    /// Unreadable, circular or too deeply nested `Include:` directives
    Include,
    /// Unreadable `Embed:` targets
    Embed,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::Indentation => "IndentationError",
            DiagnosticKind::Syntax => "SyntaxError",
            DiagnosticKind::Structure => "StructureError",
            DiagnosticKind::Include => "IncludeError",
            DiagnosticKind::Embed => "EmbedError",
        };
        write!(f, "{}", name)
    }
}

/// A single location-tagged finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: SourceLocation,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            location,
        }
    }

    pub fn warning(
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            location,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.message, self.location)
    }
}

/// Append-only, ordered list of diagnostics for one compile call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Shorthand for pushing an error-severity diagnostic
    pub fn error(&mut self, kind: DiagnosticKind, message: impl Into<String>, location: SourceLocation) {
        self.push(Diagnostic::error(kind, message, location));
    }

    /// Shorthand for pushing a warning-severity diagnostic
    pub fn warning(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        location: SourceLocation,
    ) {
        self.push(Diagnostic::warning(kind, message, location));
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_error()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(entries: Vec<Diagnostic>) -> Self {
        Self { entries }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.entries {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}
