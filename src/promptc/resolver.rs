//! Directive resolution
//!
//! Expands `Include:` and `Embed:` tokens in place:
//!
//! - An include is read through the [`SourceProvider`], lexed, expanded
//!   recursively and spliced into the stream with every token's level shifted
//!   by the directive's own level, so the included document nests where the
//!   directive stood.
//! - An embed becomes a single opaque EmbeddedBlock token at the directive's
//!   level. Its content is never lexed.
//!
//! Failed directives are reported and dropped; the rest of the stream is kept.
//! Recursion is bounded by the [`IncludeStack`]: re-entering a file already on
//! the stack is a cycle, and the stack also enforces a maximum nesting depth.

pub mod directive;
pub mod include_stack;
pub mod languages;

pub use directive::{parse_embed, parse_include, DirectiveError, EmbedArgs};
pub use include_stack::IncludeStack;
pub use languages::{LanguageMap, DEFAULT_LANGUAGE};

use crate::promptc::ast::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::promptc::lexer::{self, Token, TokenKind};
use crate::promptc::source::{locate, SourceProvider};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Expand every directive in `tokens`, using the built-in language map
pub fn expand<P: SourceProvider + ?Sized>(
    tokens: Vec<Token>,
    current_file: &Path,
    stack: &mut IncludeStack,
    search_paths: &[PathBuf],
    provider: &P,
) -> (Vec<Token>, Vec<Diagnostic>) {
    let languages = LanguageMap::default();
    let resolver = Resolver::new(provider, search_paths, &languages);
    let mut diagnostics = Diagnostics::new();
    let expanded = resolver.expand(tokens, current_file, stack, &mut diagnostics);
    (expanded, diagnostics.into_vec())
}

/// Per-call directive resolver
pub struct Resolver<'a, P: ?Sized> {
    provider: &'a P,
    search_paths: &'a [PathBuf],
    languages: &'a LanguageMap,
}

impl<'a, P: SourceProvider + ?Sized> Resolver<'a, P> {
    pub fn new(provider: &'a P, search_paths: &'a [PathBuf], languages: &'a LanguageMap) -> Self {
        Self {
            provider,
            search_paths,
            languages,
        }
    }

    /// Expand the directives of one file's token stream
    ///
    /// `current_file` is the file the tokens came from; relative directive
    /// paths are resolved against its directory first.
    pub fn expand(
        &self,
        tokens: Vec<Token>,
        current_file: &Path,
        stack: &mut IncludeStack,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Token> {
        let mut expanded = Vec::with_capacity(tokens.len());

        for token in tokens {
            match token.kind {
                TokenKind::Include => {
                    self.include(token, current_file, stack, diagnostics, &mut expanded)
                }
                TokenKind::Embed => self.embed(token, current_file, diagnostics, &mut expanded),
                _ => expanded.push(token),
            }
        }

        expanded
    }

    fn include(
        &self,
        directive: Token,
        current_file: &Path,
        stack: &mut IncludeStack,
        diagnostics: &mut Diagnostics,
        out: &mut Vec<Token>,
    ) {
        let target = match parse_include(&directive.text) {
            Ok(target) => target,
            Err(error) => {
                report_argument(error, "Include", &directive, diagnostics);
                return;
            }
        };

        let (path, source) =
            match locate(self.provider, &target, current_file, self.search_paths) {
                Ok(found) => found,
                Err(error) => {
                    diagnostics.error(DiagnosticKind::Include, error.to_string(), directive.location);
                    return;
                }
            };

        let canonical = self.provider.canonicalize(&path);
        if stack.contains(&canonical) {
            diagnostics.error(
                DiagnosticKind::Include,
                format!(
                    "Circular include detected: {}",
                    stack.cycle_chain(&canonical, &path)
                ),
                directive.location,
            );
            return;
        }
        if stack.is_full() {
            diagnostics.error(
                DiagnosticKind::Include,
                format!("Maximum include depth of {} exceeded", stack.max_depth()),
                directive.location,
            );
            return;
        }

        debug!(
            file = %path.display(),
            depth = stack.depth() + 1,
            level = directive.level,
            "expanding include"
        );

        stack.push(canonical, path.clone());
        let tokens = lexer::lex(&source, &path, diagnostics);
        let included = self.expand(tokens, &path, stack, diagnostics);
        stack.pop();

        out.extend(
            included
                .into_iter()
                .filter(|token| token.kind != TokenKind::EndOfStream)
                .map(|mut token| {
                    token.level += directive.level;
                    token
                }),
        );
    }

    fn embed(
        &self,
        directive: Token,
        current_file: &Path,
        diagnostics: &mut Diagnostics,
        out: &mut Vec<Token>,
    ) {
        let args = match parse_embed(&directive.text) {
            Ok(args) => args,
            Err(error) => {
                report_argument(error, "Embed", &directive, diagnostics);
                return;
            }
        };

        let content = match locate(self.provider, &args.path, current_file, self.search_paths) {
            Ok((_, content)) => content,
            Err(error) => {
                diagnostics.error(DiagnosticKind::Embed, error.to_string(), directive.location);
                return;
            }
        };

        let language = args
            .language
            .unwrap_or_else(|| self.languages.detect(&args.path));
        if content.is_empty() {
            diagnostics.warning(
                DiagnosticKind::Embed,
                format!("Embedded file '{}' is empty", args.path),
                directive.location.clone(),
            );
        }

        trace!(path = %args.path, language = %language, bytes = content.len(), "embedding file");

        out.push(Token::new(
            TokenKind::EmbeddedBlock {
                path: args.path,
                language,
            },
            content,
            directive.level,
            directive.location,
        ));
    }
}

fn report_argument(
    error: DirectiveError,
    keyword: &str,
    directive: &Token,
    diagnostics: &mut Diagnostics,
) {
    let message = match error {
        DirectiveError::MissingPath => format!("Expected file name for '{}'", keyword),
        DirectiveError::Malformed => format!("Malformed argument for '{}'", keyword),
    };
    diagnostics.error(DiagnosticKind::Syntax, message, directive.location.clone());
}
