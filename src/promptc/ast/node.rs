//! Document tree nodes
//!
//! The parser produces a best-effort [`Root`] even when the input is broken,
//! so tooling can inspect partial output. A [`Document`] is the validated
//! form: its shape alone guarantees exactly one Action, at most one Role
//! ahead of everything else, and at least one top-level Context.

use super::location::SourceLocation;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The three structural keywords that open a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BlockKind {
    Role,
    Context,
    Action,
}

impl BlockKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            BlockKind::Role => "Role",
            BlockKind::Context => "Context",
            BlockKind::Action => "Action",
        }
    }

    /// Whether a block of this kind may directly contain a block of `child` kind
    pub fn accepts(&self, child: BlockKind) -> bool {
        match self {
            BlockKind::Role => false,
            BlockKind::Context | BlockKind::Action => child == BlockKind::Context,
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// A keyword line plus everything nested under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub label: Option<String>,
    pub location: SourceLocation,
    pub children: Vec<Node>,
}

impl Block {
    pub fn new(label: Option<String>, location: SourceLocation) -> Self {
        Self {
            label,
            location,
            children: Vec::new(),
        }
    }
}

/// Opaque file content inserted by an `Embed:` directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embedded {
    pub path: String,
    pub language: String,
    pub content: String,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Role(Block),
    Context(Block),
    Action(Block),
    TextLine {
        text: String,
        location: SourceLocation,
    },
    EmbeddedBlock(Embedded),
}

impl Node {
    pub fn block(kind: BlockKind, block: Block) -> Self {
        match kind {
            BlockKind::Role => Node::Role(block),
            BlockKind::Context => Node::Context(block),
            BlockKind::Action => Node::Action(block),
        }
    }

    pub fn as_block(&self) -> Option<(BlockKind, &Block)> {
        match self {
            Node::Role(block) => Some((BlockKind::Role, block)),
            Node::Context(block) => Some((BlockKind::Context, block)),
            Node::Action(block) => Some((BlockKind::Action, block)),
            Node::TextLine { .. } | Node::EmbeddedBlock(_) => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            Node::Role(block) | Node::Context(block) | Node::Action(block) => Some(block),
            Node::TextLine { .. } | Node::EmbeddedBlock(_) => None,
        }
    }

    pub fn location(&self) -> &SourceLocation {
        match self {
            Node::Role(block) | Node::Context(block) | Node::Action(block) => &block.location,
            Node::TextLine { location, .. } => location,
            Node::EmbeddedBlock(embedded) => &embedded.location,
        }
    }
}

/// Best-effort document tree for one compile call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Root {
    pub file: PathBuf,
    pub children: Vec<Node>,
}

impl Root {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            children: Vec::new(),
        }
    }

    /// Top-level blocks of the given kind, in source order
    pub fn top_level(&self, kind: BlockKind) -> impl Iterator<Item = &Block> + '_ {
        self.children
            .iter()
            .filter_map(move |node| match node.as_block() {
                Some((found, block)) if found == kind => Some(block),
                _ => None,
            })
    }
}

/// A structurally valid prompt document
///
/// Contexts may sit on either side of the Action; `action_position` is the
/// number of contexts that come before it in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub file: PathBuf,
    pub role: Option<Block>,
    pub contexts: Vec<Block>,
    pub action: Block,
    pub action_position: usize,
}

/// `Role? (Context | Action)+` with exactly one Action, at least one Context
/// and nothing else at the top level
fn has_document_shape(children: &[Node]) -> bool {
    let body = match children.first() {
        Some(Node::Role(_)) => &children[1..],
        _ => children,
    };
    let mut actions = 0;
    let mut contexts = 0;
    for node in body {
        match node {
            Node::Action(_) => actions += 1,
            Node::Context(_) => contexts += 1,
            Node::Role(_) | Node::TextLine { .. } | Node::EmbeddedBlock(_) => return false,
        }
    }
    actions == 1 && contexts > 0
}

impl TryFrom<Root> for Document {
    /// The untouched tree is handed back when it does not have document shape
    type Error = Root;

    fn try_from(root: Root) -> Result<Self, Self::Error> {
        if !has_document_shape(&root.children) {
            return Err(root);
        }

        let Root { file, children } = root;
        let mut role = None;
        let mut contexts = Vec::with_capacity(children.len());
        let mut action = None;
        let mut action_position = 0;
        for child in children {
            match child {
                Node::Role(block) => role = Some(block),
                Node::Context(block) => contexts.push(block),
                Node::Action(block) => {
                    action_position = contexts.len();
                    action = Some(block);
                }
                Node::TextLine { .. } | Node::EmbeddedBlock(_) => {}
            }
        }

        match action {
            Some(action) => Ok(Document {
                file,
                role,
                contexts,
                action,
                action_position,
            }),
            None => {
                let mut children: Vec<Node> = role.into_iter().map(Node::Role).collect();
                children.extend(contexts.into_iter().map(Node::Context));
                Err(Root { file, children })
            }
        }
    }
}

impl From<Document> for Root {
    fn from(document: Document) -> Self {
        let mut children = Vec::with_capacity(document.contexts.len() + 2);
        children.extend(document.role.map(Node::Role));
        let mut contexts = document.contexts.into_iter();
        children.extend(contexts.by_ref().take(document.action_position).map(Node::Context));
        children.push(Node::Action(document.action));
        children.extend(contexts.map(Node::Context));
        Root {
            file: document.file,
            children,
        }
    }
}
