//! Document builder
//!
//! Consumes a fully expanded token stream and builds the document tree.
//! Tokens are placed by their absolute level: a token closes every open block
//! at its own level or deeper and becomes a child of the innermost block that
//! remains. Indent/Dedent markers are therefore not needed for placement.
//!
//! Every problem is recorded and the build carries on, so the returned tree
//! is always a best-effort picture of the input:
//!
//! - a level that skips past its parent is attached to the innermost block;
//! - a line whose indentation the lexer already recovered is pulled back to
//!   the child level of the innermost block, with no second report;
//! - an illegally nested block is still attached where it appeared;
//! - stray top-level text and unresolved directives are dropped.
//!
//! Multiplicity checks (missing or duplicate Action, duplicate Role, missing
//! Context) run once the whole tree is built, after all ordering findings.

use crate::promptc::ast::{
    Block, BlockKind, Diagnostic, DiagnosticKind, Diagnostics, Embedded, Node, Root,
    SourceLocation,
};
use crate::promptc::lexer::{Token, TokenKind};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build a tree from an expanded token stream
///
/// The root file is taken from the closing EndOfStream token, which always
/// belongs to the root document.
pub fn build(tokens: Vec<Token>) -> (Root, Vec<Diagnostic>) {
    let file = tokens
        .iter()
        .rev()
        .find(|token| token.kind == TokenKind::EndOfStream)
        .or_else(|| tokens.first())
        .map(|token| token.location.file.clone())
        .unwrap_or_default();
    let mut diagnostics = Diagnostics::new();
    let root = Builder::new(file).build(tokens, &mut diagnostics);
    (root, diagnostics.into_vec())
}

struct Frame {
    kind: BlockKind,
    level: usize,
    block: Block,
}

/// Stateful tree builder for one document
pub struct Builder {
    root: Root,
    open: Vec<Frame>,
    seen_context_or_action: bool,
}

impl Builder {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            root: Root::new(file),
            open: Vec::new(),
            seen_context_or_action: false,
        }
    }

    pub fn build(mut self, tokens: Vec<Token>, diagnostics: &mut Diagnostics) -> Root {
        for token in tokens {
            self.place(token, diagnostics);
        }
        self.close_to(0);
        self.check_multiplicity(diagnostics);

        debug!(
            file = %self.root.file.display(),
            nodes = self.root.children.len(),
            "built document tree"
        );
        self.root
    }

    fn place(&mut self, token: Token, diagnostics: &mut Diagnostics) {
        match &token.kind {
            TokenKind::Indent | TokenKind::Dedent | TokenKind::EndOfStream => return,
            TokenKind::Include | TokenKind::Embed => {
                diagnostics.error(
                    DiagnosticKind::Syntax,
                    format!("Unresolved directive '{}'", keyword_name(&token.kind)),
                    token.location,
                );
                return;
            }
            _ => {}
        }

        self.close_to(token.level);

        let Token {
            kind,
            text,
            mut level,
            location,
            snapped,
        } = token;

        let expected = self.open.last().map_or(0, |frame| frame.level + 1);
        if level > expected {
            if snapped {
                // Already reported by the lexer
                level = expected;
            } else {
                diagnostics.error(
                    DiagnosticKind::Structure,
                    "Indentation skips a level",
                    location.clone(),
                );
            }
        }

        match kind {
            TokenKind::Action => self.open_block(BlockKind::Action, text, level, location, diagnostics),
            TokenKind::Context => {
                self.open_block(BlockKind::Context, text, level, location, diagnostics)
            }
            TokenKind::Role => self.open_block(BlockKind::Role, text, level, location, diagnostics),
            TokenKind::Text => self.add_content(Node::TextLine { text, location }, diagnostics),
            TokenKind::EmbeddedBlock { path, language } => self.add_content(
                Node::EmbeddedBlock(Embedded {
                    path,
                    language,
                    content: text,
                    location,
                }),
                diagnostics,
            ),
            TokenKind::Include
            | TokenKind::Embed
            | TokenKind::Indent
            | TokenKind::Dedent
            | TokenKind::EndOfStream => {}
        }
    }

    fn open_block(
        &mut self,
        kind: BlockKind,
        label: String,
        level: usize,
        location: SourceLocation,
        diagnostics: &mut Diagnostics,
    ) {
        match self.open.last() {
            Some(parent) if !parent.kind.accepts(kind) => {
                diagnostics.error(
                    DiagnosticKind::Structure,
                    format!("Unexpected '{}' in '{}' block", kind, parent.kind),
                    location.clone(),
                );
            }
            Some(_) => {}
            None => {
                if kind == BlockKind::Role && self.seen_context_or_action {
                    diagnostics.error(
                        DiagnosticKind::Structure,
                        "'Role' must precede all 'Context' and 'Action' blocks",
                        location.clone(),
                    );
                }
                if kind != BlockKind::Role {
                    self.seen_context_or_action = true;
                }
            }
        }

        let label = if label.is_empty() { None } else { Some(label) };
        self.open.push(Frame {
            kind,
            level,
            block: Block::new(label, location),
        });
    }

    fn add_content(&mut self, node: Node, diagnostics: &mut Diagnostics) {
        match self.open.last_mut() {
            Some(frame) => frame.block.children.push(node),
            None => diagnostics.error(
                DiagnosticKind::Syntax,
                "Unexpected text at top level",
                node.location().clone(),
            ),
        }
    }

    /// Close every open block at `level` or deeper
    fn close_to(&mut self, level: usize) {
        while self.open.last().map_or(false, |frame| frame.level >= level) {
            if let Some(frame) = self.open.pop() {
                let node = Node::block(frame.kind, frame.block);
                match self.open.last_mut() {
                    Some(parent) => parent.block.children.push(node),
                    None => self.root.children.push(node),
                }
            }
        }
    }

    fn check_multiplicity(&self, diagnostics: &mut Diagnostics) {
        let start = SourceLocation::start_of(Path::new(&self.root.file));

        let actions: Vec<&Block> = self.root.top_level(BlockKind::Action).collect();
        if actions.is_empty() {
            diagnostics.error(DiagnosticKind::Structure, "Missing 'Action' block", start.clone());
        }
        for extra in actions.iter().skip(1) {
            diagnostics.error(
                DiagnosticKind::Structure,
                "'Action' already defined",
                extra.location.clone(),
            );
        }

        for extra in self.root.top_level(BlockKind::Role).skip(1) {
            diagnostics.error(
                DiagnosticKind::Structure,
                "'Role' already defined",
                extra.location.clone(),
            );
        }

        if self.root.top_level(BlockKind::Context).next().is_none() {
            diagnostics.error(DiagnosticKind::Structure, "Missing 'Context' block", start);
        }
    }
}

fn keyword_name(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Include => "Include",
        TokenKind::Embed => "Embed",
        _ => "",
    }
}
