//! Test helpers shared by unit tests
//!
//! Prefer [`memory_files`] over writing to disk: it keeps fixtures next to the
//! assertions that use them. [`CountingProvider`] wraps any provider and counts
//! reads, which is how include recursion is shown to be bounded.

use crate::promptc::ast::Diagnostics;
use crate::promptc::source::{MemorySourceProvider, SourceError, SourceProvider};
use std::cell::Cell;
use std::path::{Path, PathBuf};

/// In-memory provider seeded with `(path, contents)` pairs
pub fn memory_files(files: &[(&str, &str)]) -> MemorySourceProvider {
    files
        .iter()
        .fold(MemorySourceProvider::new(), |provider, (path, contents)| {
            provider.with_file(path, *contents)
        })
}

/// Diagnostics rendered in their exact user-facing form
pub fn messages(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics.iter().map(|d| d.to_string()).collect()
}

/// Provider wrapper that counts every read
pub struct CountingProvider<P> {
    inner: P,
    reads: Cell<usize>,
}

impl<P: SourceProvider> CountingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            reads: Cell::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl<P: SourceProvider> SourceProvider for CountingProvider<P> {
    fn read(&self, path: &Path) -> Result<String, SourceError> {
        self.reads.set(self.reads.get() + 1);
        self.inner.read(path)
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        self.inner.canonicalize(path)
    }
}
