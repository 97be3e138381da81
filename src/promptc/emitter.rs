//! Emitter
//!
//! Linearizes a document tree into ordered sections and renders them as the
//! final prompt text. Top-level blocks come out as the Role, then every
//! Context, then the Action, whatever order they were written in. Below the
//! top level the walk is depth-first and pre-order, so nested sections keep
//! their source order. When a block has content after one of its nested
//! blocks, that content goes into a continuation section for the block.

use crate::promptc::ast::{Block, BlockKind, Node, Root, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const INDENT: &str = "    ";
const FENCE: &str = "```";

/// How embedded file content is framed in rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedFraming {
    /// A `File:` caption and a fenced code block tagged with the language
    #[default]
    Fenced,
    /// The content lines only
    Raw,
}

impl FromStr for EmbedFraming {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "fenced" => Ok(EmbedFraming::Fenced),
            "raw" => Ok(EmbedFraming::Raw),
            other => Err(format!(
                "Unknown embed framing '{}' (expected 'fenced' or 'raw')",
                other
            )),
        }
    }
}

impl fmt::Display for EmbedFraming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedFraming::Fenced => write!(f, "fenced"),
            EmbedFraming::Raw => write!(f, "raw"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmitOptions {
    pub framing: EmbedFraming,
}

/// One piece of section content, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionContent {
    Text {
        text: String,
    },
    Embedded {
        path: String,
        language: String,
        content: String,
    },
}

/// A labeled run of content belonging to one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: BlockKind,
    pub label: Option<String>,
    pub depth: usize,
    /// True when this section resumes a block after one of its nested blocks
    pub continued: bool,
    pub location: SourceLocation,
    pub body: Vec<SectionContent>,
}

impl Section {
    fn open(kind: BlockKind, block: &Block, depth: usize, continued: bool) -> Self {
        Self {
            kind,
            label: block.label.clone(),
            depth,
            continued,
            location: block.location.clone(),
            body: Vec::new(),
        }
    }

    /// `Kind:` or `Kind: label`, without indentation
    pub fn heading(&self) -> String {
        match &self.label {
            Some(label) => format!("{}: {}", self.kind, label),
            None => format!("{}:", self.kind),
        }
    }
}

const TOP_LEVEL_ORDER: [BlockKind; 3] = [BlockKind::Role, BlockKind::Context, BlockKind::Action];

/// Linearize a tree into sections: Role, Contexts, Action, each depth-first
pub fn emit(root: &Root) -> Vec<Section> {
    let mut sections = Vec::new();
    for kind in TOP_LEVEL_ORDER {
        for block in root.top_level(kind) {
            walk(kind, block, 0, &mut sections);
        }
    }
    sections
}

fn walk(kind: BlockKind, block: &Block, depth: usize, sections: &mut Vec<Section>) {
    let mut current = Section::open(kind, block, depth, false);

    for child in &block.children {
        let (nested_kind, nested) = match child {
            Node::TextLine { text, .. } => {
                current.body.push(SectionContent::Text { text: text.clone() });
                continue;
            }
            Node::EmbeddedBlock(embedded) => {
                current.body.push(SectionContent::Embedded {
                    path: embedded.path.clone(),
                    language: embedded.language.clone(),
                    content: embedded.content.clone(),
                });
                continue;
            }
            Node::Role(nested) => (BlockKind::Role, nested),
            Node::Context(nested) => (BlockKind::Context, nested),
            Node::Action(nested) => (BlockKind::Action, nested),
        };

        sections.push(current);
        walk(nested_kind, nested, depth + 1, sections);
        current = Section::open(kind, block, depth, true);
    }

    if !current.continued || !current.body.is_empty() {
        sections.push(current);
    }
}

/// Render sections as prompt text
///
/// Headings are indented 4 spaces per depth and content one level deeper.
/// Text lines are reproduced verbatim and embedded content is never altered
/// beyond that indentation. The output ends with a newline unless empty.
pub fn render(sections: &[Section], options: &EmitOptions) -> String {
    let mut lines: Vec<String> = Vec::new();

    for section in sections {
        if !section.continued {
            lines.push(format!("{}{}", INDENT.repeat(section.depth), section.heading()));
        }

        let indent = INDENT.repeat(section.depth + 1);
        for item in &section.body {
            match item {
                SectionContent::Text { text } => lines.push(indented(&indent, text)),
                SectionContent::Embedded {
                    path,
                    language,
                    content,
                } => {
                    let fenced = options.framing == EmbedFraming::Fenced;
                    if fenced {
                        lines.push(format!("{}File: {}", indent, path));
                        lines.push(format!("{}{}{}", indent, FENCE, language));
                    }
                    // Only '\n' separates lines; a '\r' stays part of the payload
                    lines.extend(
                        content
                            .split_terminator('\n')
                            .map(|line| indented(&indent, line)),
                    );
                    if fenced {
                        lines.push(format!("{}{}", indent, FENCE));
                    }
                }
            }
        }
    }

    if lines.is_empty() {
        String::new()
    } else {
        let mut output = lines.join("\n");
        output.push('\n');
        output
    }
}

fn indented(indent: &str, line: &str) -> String {
    if line.is_empty() {
        String::new()
    } else {
        format!("{}{}", indent, line)
    }
}
