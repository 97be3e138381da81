//! Argument grammar for `Include:` and `Embed:` directives
//!
//! ```text
//! include-args := path
//! embed-args   := path (whitespace language)?
//! path         := '"' (escape | [^"\\])* '"' | [^\s"]+
//! ```

use chumsky::prelude::*;
use std::fmt;

type ParserError = Simple<char>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// Nothing follows the keyword
    MissingPath,
    /// Something follows the keyword but it does not fit the grammar
    Malformed,
}

impl fmt::Display for DirectiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectiveError::MissingPath => write!(f, "missing file name"),
            DirectiveError::Malformed => write!(f, "malformed argument"),
        }
    }
}

impl std::error::Error for DirectiveError {}

/// Parsed `Embed:` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedArgs {
    pub path: String,
    pub language: Option<String>,
}

fn path() -> impl Parser<char, String, Error = ParserError> {
    let escape = just('\\').ignore_then(one_of("\\\""));
    let quoted = just('"')
        .ignore_then(
            filter(|c: &char| *c != '\\' && *c != '"')
                .or(escape)
                .repeated(),
        )
        .then_ignore(just('"'))
        .collect::<String>();
    let bare = filter(|c: &char| !c.is_whitespace() && *c != '"')
        .repeated()
        .at_least(1)
        .collect::<String>();

    quoted.or(bare)
}

fn include_args() -> impl Parser<char, String, Error = ParserError> {
    path().padded().then_ignore(end())
}

fn embed_args() -> impl Parser<char, EmbedArgs, Error = ParserError> {
    let gap = filter(|c: &char| c.is_whitespace()).repeated().at_least(1);
    let language = filter(|c: &char| !c.is_whitespace())
        .repeated()
        .at_least(1)
        .collect::<String>();

    path()
        .then(gap.ignore_then(language).or_not())
        .padded()
        .then_ignore(end())
        .map(|(path, language)| EmbedArgs { path, language })
}

pub fn parse_include(argument: &str) -> Result<String, DirectiveError> {
    if argument.trim().is_empty() {
        return Err(DirectiveError::MissingPath);
    }
    include_args()
        .parse(argument)
        .map_err(|_| DirectiveError::Malformed)
}

pub fn parse_embed(argument: &str) -> Result<EmbedArgs, DirectiveError> {
    if argument.trim().is_empty() {
        return Err(DirectiveError::MissingPath);
    }
    embed_args()
        .parse(argument)
        .map_err(|_| DirectiveError::Malformed)
}
