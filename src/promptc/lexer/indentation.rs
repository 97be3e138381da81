//! Indentation measurement, validation and Indent/Dedent marker insertion
//!
//! Indentation is handled in two steps. While scanning, every significant
//! line is placed on an absolute level by [`IndentTracker`], which validates
//! the leading whitespace and snaps broken indentation to a usable level.
//! Afterwards [`insert_markers`] turns level changes between consecutive
//! tokens into Indent/Dedent markers, much like brace tokens in other syntaxes.

use super::tokens::{Indentation, Token, TokenKind, INDENT_WIDTH};
use crate::promptc::ast::{DiagnosticKind, Diagnostics, SourceLocation};
use logos::Logos;
use std::cmp::Ordering;
use std::path::Path;

pub const TAB_MESSAGE: &str = "[Tab] Tab character used in indentation";
pub const BAD_INDENT_MESSAGE: &str = "[Bad Indent] Indentation must be a multiple of 4 spaces";
pub const BAD_OUTDENT_MESSAGE: &str =
    "[Bad Outdent] Outdent does not match any enclosing indentation level";

/// Result of measuring a line's leading whitespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measured {
    /// Total width, with tabs counted as a full level
    pub width: usize,
    /// 1-based column of the first tab, if any
    pub first_tab: Option<usize>,
}

/// Measure leading whitespace (spaces and tabs only)
pub fn measure(leading: &str) -> Measured {
    let mut lexer = Indentation::lexer(leading);
    let mut width = 0;
    let mut first_tab = None;

    while let Some(result) = lexer.next() {
        if let Ok(step) = result {
            width += step.width(lexer.slice());
            if step == Indentation::Tab && first_tab.is_none() {
                first_tab = Some(lexer.span().start + 1);
            }
        }
    }

    Measured { width, first_tab }
}

/// Tracks the stack of open indentation levels for one file
#[derive(Debug)]
pub struct IndentTracker {
    open: Vec<usize>,
}

impl IndentTracker {
    pub fn new() -> Self {
        Self { open: vec![0] }
    }

    pub fn current(&self) -> usize {
        self.open.last().copied().unwrap_or(0)
    }

    /// Report tabs on a line that does not take part in indentation
    /// (blank or comment lines). Returns true when a tab was found.
    pub fn report_tabs(
        &self,
        leading: &str,
        line: usize,
        file: &Path,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        match measure(leading).first_tab {
            Some(column) => {
                diagnostics.error(
                    DiagnosticKind::Indentation,
                    TAB_MESSAGE,
                    SourceLocation::new(file, line, column),
                );
                true
            }
            None => false,
        }
    }

    /// Validate a significant line's indentation and return the level it sits at.
    ///
    /// At most one diagnostic is reported per line. Recovery never fails:
    /// widths snap to the nearest multiple of 4 (halves round down) and a
    /// dedent that lands between open levels snaps to the enclosing one.
    pub fn place(
        &mut self,
        leading: &str,
        line: usize,
        file: &Path,
        diagnostics: &mut Diagnostics,
    ) -> usize {
        let measured = measure(leading);
        let content_column = leading.len() + 1;
        let current = self.current();
        let mut reported = false;

        if let Some(column) = measured.first_tab {
            diagnostics.error(
                DiagnosticKind::Indentation,
                TAB_MESSAGE,
                SourceLocation::new(file, line, column),
            );
            reported = true;
        } else if measured.width % INDENT_WIDTH != 0 {
            let message = if measured.width < current * INDENT_WIDTH {
                BAD_OUTDENT_MESSAGE
            } else {
                BAD_INDENT_MESSAGE
            };
            diagnostics.error(
                DiagnosticKind::Indentation,
                message,
                SourceLocation::new(file, line, content_column),
            );
            reported = true;
        }

        let target = (measured.width + 1) / INDENT_WIDTH;

        match target.cmp(&current) {
            Ordering::Greater => {
                self.open.push(target);
                target
            }
            Ordering::Equal => target,
            Ordering::Less => {
                while self.open.len() > 1 && self.current() > target {
                    self.open.pop();
                }
                let landed = self.current();
                if landed != target && !reported {
                    diagnostics.error(
                        DiagnosticKind::Indentation,
                        BAD_OUTDENT_MESSAGE,
                        SourceLocation::new(file, line, content_column),
                    );
                }
                landed
            }
        }
    }
}

impl Default for IndentTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert Indent/Dedent markers between tokens whose levels differ
///
/// One marker is emitted per level crossed, and the stream is closed with
/// enough Dedent markers to return to level 0 followed by EndOfStream.
///
/// # Example
///
/// Levels `[0, 1, 2, 0]` become
/// `[t0, Indent, t1, Indent, t2, Dedent, Dedent, t3, EndOfStream]`.
pub fn insert_markers(tokens: Vec<Token>, end: SourceLocation) -> Vec<Token> {
    let mut result = Vec::with_capacity(tokens.len() * 2 + 1);
    let mut current = 0;

    for token in tokens {
        match token.level.cmp(&current) {
            Ordering::Greater => {
                for level in current + 1..=token.level {
                    result.push(marker(TokenKind::Indent, level, &token.location));
                }
            }
            Ordering::Less => {
                for level in (token.level..current).rev() {
                    result.push(marker(TokenKind::Dedent, level, &token.location));
                }
            }
            Ordering::Equal => {}
        }
        current = token.level;
        result.push(token);
    }

    for level in (0..current).rev() {
        result.push(marker(TokenKind::Dedent, level, &end));
    }
    result.push(Token::new(TokenKind::EndOfStream, "", 0, end));

    result
}

fn marker(kind: TokenKind, level: usize, location: &SourceLocation) -> Token {
    Token::new(
        kind,
        "",
        level,
        SourceLocation::new(location.file.clone(), location.line, 1),
    )
}
