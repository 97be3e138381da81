//! Source locations attached to tokens, nodes and diagnostics

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// A 1-based line/column position inside a named source file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// The first character of `file`, used for whole-document diagnostics
    pub fn start_of(file: &Path) -> Self {
        Self::new(file, 1, 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}, file {}",
            self.line,
            self.column,
            self.file.display()
        )
    }
}
