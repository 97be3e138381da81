//! The chain of files currently being expanded

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
struct Entry {
    canonical: PathBuf,
    shown: PathBuf,
}

/// Ordered stack of open files for one compile call
///
/// Entries are compared by canonical identity; the shown path is the one
/// the user wrote (after joining with its base directory) and is only used
/// for messages. The bottom entry is the root document, which does not
/// count towards the include depth.
#[derive(Debug, Clone)]
pub struct IncludeStack {
    entries: Vec<Entry>,
    max_depth: usize,
}

impl IncludeStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_depth,
        }
    }

    pub fn with_root(canonical: PathBuf, shown: PathBuf, max_depth: usize) -> Self {
        let mut stack = Self::new(max_depth);
        stack.push(canonical, shown);
        stack
    }

    pub fn push(&mut self, canonical: PathBuf, shown: PathBuf) {
        self.entries.push(Entry { canonical, shown });
    }

    pub fn pop(&mut self) -> Option<PathBuf> {
        self.entries.pop().map(|entry| entry.canonical)
    }

    pub fn contains(&self, canonical: &Path) -> bool {
        self.entries.iter().any(|entry| entry.canonical == canonical)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of nested includes below the root document
    pub fn depth(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// True when one more include would go past the maximum depth
    pub fn is_full(&self) -> bool {
        self.depth() >= self.max_depth
    }

    /// Render the cycle closed by re-entering `canonical`, e.g. `a -> b -> a`
    pub fn cycle_chain(&self, canonical: &Path, shown: &Path) -> String {
        let start = self
            .entries
            .iter()
            .position(|entry| entry.canonical == canonical)
            .unwrap_or(0);
        self.entries[start..]
            .iter()
            .map(|entry| entry.shown.display().to_string())
            .chain(std::iter::once(shown.display().to_string()))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(files: &[&str]) -> IncludeStack {
        let mut stack = IncludeStack::new(8);
        for file in files {
            stack.push(PathBuf::from(file), PathBuf::from(file));
        }
        stack
    }

    #[test]
    fn test_depth_excludes_root() {
        let stack = stack_of(&["main.m6r"]);
        assert_eq!(stack.depth(), 0);
        assert!(!stack.is_full());
        assert!(IncludeStack::with_root("m".into(), "m".into(), 0).is_full());
    }

    #[test]
    fn test_cycle_chain_starts_at_reentered_file() {
        let stack = stack_of(&["main.m6r", "a.m6r", "b.m6r"]);
        assert!(stack.contains(Path::new("a.m6r")));
        assert_eq!(
            stack.cycle_chain(Path::new("a.m6r"), Path::new("a.m6r")),
            "a.m6r -> b.m6r -> a.m6r"
        );
    }

    #[test]
    fn test_push_pop() {
        let mut stack = stack_of(&["main.m6r"]);
        stack.push("x".into(), "x".into());
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(PathBuf::from("x")));
        assert!(!stack.contains(Path::new("x")));
    }
}
