//! Lexer for prompt sources
//!
//! Tokenization happens one line at a time: every significant line becomes
//! exactly one token tagged with its absolute indentation level. Indentation
//! is validated as lines are placed, and a final pass inserts Indent/Dedent
//! markers so that block structure is visible in the flat stream.
//!
//! The lexer never fails. Problems are appended to the caller's diagnostics
//! and the offending line is recovered (snapped to a valid level) so that the
//! rest of the file is still checked.

pub mod indentation;
pub mod lexer_impl;
pub mod tokens;

pub use indentation::insert_markers;
pub use lexer_impl::scan_lines;
pub use tokens::{Token, TokenKind};

use crate::promptc::ast::{Diagnostic, Diagnostics, SourceLocation};
use std::path::Path;

/// Tokenize one file, returning its tokens and any diagnostics found
pub fn tokenize(source: &str, file: &Path) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut diagnostics = Diagnostics::new();
    let tokens = lex(source, file, &mut diagnostics);
    (tokens, diagnostics.into_vec())
}

/// Tokenize into an existing diagnostics collector
///
/// The stream always ends with balanced Dedent markers and EndOfStream.
pub fn lex(source: &str, file: &Path, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let tokens = scan_lines(source, file, diagnostics);
    let end = SourceLocation::new(file, source.lines().count() + 1, 1);
    tracing::trace!(file = %file.display(), tokens = tokens.len(), "scanned source");
    insert_markers(tokens, end)
}
