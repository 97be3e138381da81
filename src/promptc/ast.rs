//! Data model shared by every compiler phase
//!
//! Locations, diagnostics and the document tree live here so that the lexer,
//! resolver, parser and emitter can all speak the same vocabulary without
//! depending on each other.

pub mod diagnostics;
pub mod location;
pub mod node;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use location::SourceLocation;
pub use node::{Block, BlockKind, Document, Embedded, Node, Root};
