//! Line scanner for prompt sources
//!
//! Scans a file line by line, classifying each significant line as a keyword
//! or text token placed at an absolute indentation level. Blank lines and `#`
//! comment lines are skipped but still advance the line counter.
//!
//! Text may contain fenced code (three backticks). Inside a fence, lines are
//! kept verbatim below the fence's own indentation, so relative indentation
//! and tabs survive and keyword-looking lines stay plain text.

use super::indentation::IndentTracker;
use super::tokens::{Token, TokenKind, INDENT_WIDTH};
use crate::promptc::ast::{DiagnosticKind, Diagnostics, SourceLocation};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static KEYWORD_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Action|Context|Embed|Include|Role):( .*)?$").expect("keyword pattern compiles")
});

static KEYWORD_MISSING_SPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Action|Context|Embed|Include|Role):(\S.*)$").expect("keyword pattern compiles")
});

const FENCE: &str = "```";

/// An open code fence inside text
struct Fence {
    level: usize,
    base: String,
    opened_at: SourceLocation,
}

enum FenceLine<'a> {
    Body(&'a str),
    Close(&'a str),
    /// The line is shallower than the fence, so the fence was never closed
    Outside,
}

fn fence_line<'a>(line: &'a str, base: &str) -> FenceLine<'a> {
    if line.trim().is_empty() {
        return FenceLine::Body(line.strip_prefix(base).unwrap_or(""));
    }
    match line.strip_prefix(base) {
        Some(rest) if rest.trim_start().starts_with(FENCE) => FenceLine::Close(rest),
        Some(rest) => FenceLine::Body(rest),
        None => FenceLine::Outside,
    }
}

fn split_indentation(line: &str) -> (&str, &str) {
    let content = line.trim_start_matches(|c| c == ' ' || c == '\t');
    (&line[..line.len() - content.len()], content)
}

/// Scan `source` into level-tagged tokens, without Indent/Dedent markers
pub fn scan_lines(source: &str, file: &Path, diagnostics: &mut Diagnostics) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut tracker = IndentTracker::new();
    let mut fence: Option<Fence> = None;

    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;

        if let Some(open) = fence.take() {
            let column = open.base.len() + 1;
            match fence_line(line, &open.base) {
                FenceLine::Body(text) => {
                    tokens.push(Token::new(
                        TokenKind::Text,
                        text,
                        open.level,
                        SourceLocation::new(file, line_number, column),
                    ));
                    fence = Some(open);
                    continue;
                }
                FenceLine::Close(text) => {
                    tokens.push(Token::new(
                        TokenKind::Text,
                        text,
                        open.level,
                        SourceLocation::new(file, line_number, column),
                    ));
                    continue;
                }
                FenceLine::Outside => {
                    diagnostics.warning(
                        DiagnosticKind::Syntax,
                        "Unterminated code fence",
                        open.opened_at,
                    );
                }
            }
        }

        let (leading, content) = split_indentation(line);
        if content.is_empty() || content.starts_with('#') {
            tracker.report_tabs(leading, line_number, file, diagnostics);
            continue;
        }

        let reported = diagnostics.len();
        let level = tracker.place(leading, line_number, file, diagnostics);
        let snapped = diagnostics.len() > reported;
        let location = SourceLocation::new(file, line_number, leading.len() + 1);
        let mut token = classify(content, level, location, diagnostics);
        token.snapped = snapped;

        if token.kind == TokenKind::Text && content.starts_with(FENCE) {
            fence = Some(Fence {
                level,
                base: " ".repeat(level * INDENT_WIDTH),
                opened_at: token.location.clone(),
            });
        }
        tokens.push(token);
    }

    if let Some(open) = fence {
        diagnostics.warning(DiagnosticKind::Syntax, "Unterminated code fence", open.opened_at);
    }

    tokens
}

/// Turn one line's content (indentation already stripped) into a token
fn classify(
    content: &str,
    level: usize,
    location: SourceLocation,
    diagnostics: &mut Diagnostics,
) -> Token {
    if let Some((kind, label)) = keyword(&KEYWORD_LINE, content) {
        return Token::new(kind, label, level, location);
    }

    if let Some((kind, label)) = keyword(&KEYWORD_MISSING_SPACE, content) {
        let word = content.split(':').next().unwrap_or_default();
        diagnostics.error(
            DiagnosticKind::Syntax,
            format!("Expected a space after '{}:'", word),
            location.clone(),
        );
        return Token::new(kind, label, level, location);
    }

    Token::new(TokenKind::Text, content, level, location)
}

fn keyword(pattern: &Regex, content: &str) -> Option<(TokenKind, String)> {
    let captures = pattern.captures(content)?;
    let kind = TokenKind::keyword(captures.get(1)?.as_str())?;
    let label = captures
        .get(2)
        .map_or("", |m| m.as_str())
        .trim()
        .to_string();
    Some((kind, label))
}
