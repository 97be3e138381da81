//! Token definitions for prompt sources
//!
//! Two layers live here. [`Indentation`] is a logos lexer that classifies the
//! leading whitespace of a line one step at a time. [`Token`] is the
//! line-level token that the rest of the compiler consumes.

use crate::promptc::ast::{BlockKind, SourceLocation};
use logos::Logos;
use serde::Serialize;
use std::fmt;

/// Columns a single tab is counted as when recovering from a tab error
pub const TAB_WIDTH: usize = 4;

/// Spaces per indentation level
pub const INDENT_WIDTH: usize = 4;

/// Steps of leading whitespace
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
pub enum Indentation {
    // One full level - highest priority
    #[regex(r" {4}", priority = 3)]
    Unit,

    // 1-3 stray spaces, never a full level on their own
    #[regex(r" {1,3}", priority = 1)]
    Partial,

    // Never valid, but still measured so that we can recover
    #[token("\t")]
    Tab,
}

impl Indentation {
    /// Width this step contributes to the line's indentation
    pub fn width(&self, slice: &str) -> usize {
        match self {
            Indentation::Unit => INDENT_WIDTH,
            Indentation::Partial => slice.len(),
            Indentation::Tab => TAB_WIDTH,
        }
    }
}

/// Every kind of token the lexer and resolver can produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Action,
    Context,
    Role,
    Include,
    Embed,
    Indent,
    Dedent,
    Text,
    /// Resolved `Embed:` payload; the raw content is carried in the token text
    EmbeddedBlock {
        path: String,
        language: String,
    },
    EndOfStream,
}

impl TokenKind {
    /// Map a keyword as written in source to its token kind
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "Action" => Some(TokenKind::Action),
            "Context" => Some(TokenKind::Context),
            "Role" => Some(TokenKind::Role),
            "Include" => Some(TokenKind::Include),
            "Embed" => Some(TokenKind::Embed),
            _ => None,
        }
    }

    /// The structural block this token opens, if any
    pub fn block_kind(&self) -> Option<BlockKind> {
        match self {
            TokenKind::Action => Some(BlockKind::Action),
            TokenKind::Context => Some(BlockKind::Context),
            TokenKind::Role => Some(BlockKind::Role),
            _ => None,
        }
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, TokenKind::Include | TokenKind::Embed)
    }

    /// Indent/Dedent markers carry no content of their own
    pub fn is_marker(&self) -> bool {
        matches!(self, TokenKind::Indent | TokenKind::Dedent)
    }
}

/// A single line-level token
///
/// `text` holds the label for keyword tokens, the line content for text
/// tokens and the raw file content for embedded blocks. `level` is the
/// absolute indentation level the token sits at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub level: usize,
    pub location: SourceLocation,
    /// The line's indentation was invalid and `level` is a recovered guess
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub snapped: bool,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        level: usize,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            level,
            location,
            snapped: false,
        }
    }

    /// Keyword label, if the keyword line had one
    pub fn label(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match &self.kind {
            TokenKind::Action => "action",
            TokenKind::Context => "context",
            TokenKind::Role => "role",
            TokenKind::Include => "include",
            TokenKind::Embed => "embed",
            TokenKind::Indent => return write!(f, "<indent>"),
            TokenKind::Dedent => return write!(f, "<dedent>"),
            TokenKind::EndOfStream => return write!(f, "<eos>"),
            TokenKind::Text => return write!(f, "<text:{}>", self.text),
            TokenKind::EmbeddedBlock { path, language } => {
                return write!(f, "<embedded:{} ({})>", path, language)
            }
        };
        match self.label() {
            Some(label) => write!(f, "<{}:{}>", keyword, label),
            None => write!(f, "<{}>", keyword),
        }
    }
}
