//! Compile entry points
//!
//! A compile call runs the whole pipeline for one root document:
//!
//! ```text
//! source -> lexer -> resolver (recursing into included files) -> builder -> emitter
//! ```
//!
//! Diagnostics from every phase land in a single ordered list owned by the
//! call. Nothing survives between calls: every compile builds its own include
//! stack and collector, so one [`Compiler`] may be shared across threads when
//! its provider allows it.

use crate::promptc::ast::{
    Diagnostic, DiagnosticKind, Diagnostics, Document, Root, SourceLocation,
};
use crate::promptc::emitter::{self, EmitOptions, Section};
use crate::promptc::lexer::{self, Token};
use crate::promptc::parser::Builder;
use crate::promptc::resolver::{IncludeStack, LanguageMap, Resolver};
use crate::promptc::source::{FsSourceProvider, SourceProvider};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Deepest chain of nested includes before an IncludeError
    pub max_include_depth: usize,
    /// Searched after the including file's directory and any per-call paths
    pub search_paths: Vec<PathBuf>,
    pub languages: LanguageMap,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            search_paths: Vec::new(),
            languages: LanguageMap::default(),
        }
    }
}

/// Successful compile result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledPrompt {
    pub document: Document,
    pub sections: Vec<Section>,
    /// Warnings only; any error would have failed the compile
    pub diagnostics: Diagnostics,
}

impl CompiledPrompt {
    pub fn render(&self, options: &EmitOptions) -> String {
        emitter::render(&self.sections, options)
    }
}

/// Failed compile: every diagnostic found, in detection order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileFailure {
    pub diagnostics: Diagnostics,
}

impl From<Diagnostic> for CompileFailure {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: Diagnostics::from(vec![diagnostic]),
        }
    }
}

impl fmt::Display for CompileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for diagnostic in &self.diagnostics {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for CompileFailure {}

/// Best-effort output of every phase, whether or not the input is valid
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Fully expanded token stream
    pub tokens: Vec<Token>,
    pub root: Root,
    pub diagnostics: Diagnostics,
}

/// Reusable compiler configuration plus a source provider
#[derive(Debug, Clone)]
pub struct Compiler<P = FsSourceProvider> {
    options: CompileOptions,
    provider: P,
}

impl Compiler<FsSourceProvider> {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            provider: FsSourceProvider,
        }
    }
}

impl Default for Compiler<FsSourceProvider> {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl<P: SourceProvider> Compiler<P> {
    /// Swap the source provider, keeping the options
    pub fn with_provider<Q: SourceProvider>(self, provider: Q) -> Compiler<Q> {
        Compiler {
            options: self.options,
            provider,
        }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Compile `source` as if it were the contents of `path`
    pub fn compile(&self, source: &str, path: &Path) -> Result<CompiledPrompt, CompileFailure> {
        self.compile_with(source, path, &[])
    }

    /// Compile with extra search paths for this call only
    #[tracing::instrument(level = "debug", skip(self, source, search_paths), fields(file = %path.display()))]
    pub fn compile_with(
        &self,
        source: &str,
        path: &Path,
        search_paths: &[PathBuf],
    ) -> Result<CompiledPrompt, CompileFailure> {
        let Analysis {
            root, diagnostics, ..
        } = self.analyze(source, path, search_paths);
        finish(root, diagnostics)
    }

    /// Read `path` through the provider and compile it
    ///
    /// Failing to read the root document is the only immediate abort.
    pub fn compile_file(&self, path: &Path) -> Result<CompiledPrompt, CompileFailure> {
        self.compile_file_with(path, &[])
    }

    pub fn compile_file_with(
        &self,
        path: &Path,
        search_paths: &[PathBuf],
    ) -> Result<CompiledPrompt, CompileFailure> {
        let source = self.read_root(path)?;
        self.compile_with(&source, path, search_paths)
    }

    /// Read the root document, reporting a failure the way compile does
    pub fn read_root(&self, path: &Path) -> Result<String, CompileFailure> {
        self.provider.read(path).map_err(|error| {
            warn!(file = %path.display(), %error, "cannot read root document");
            CompileFailure::from(Diagnostic::error(
                DiagnosticKind::Include,
                error.to_string(),
                SourceLocation::start_of(path),
            ))
        })
    }

    /// Run every phase and return all intermediate results
    pub fn analyze(&self, source: &str, path: &Path, search_paths: &[PathBuf]) -> Analysis {
        let mut diagnostics = Diagnostics::new();
        let search_paths: Vec<PathBuf> = search_paths
            .iter()
            .chain(&self.options.search_paths)
            .cloned()
            .collect();

        let tokens = lexer::lex(source, path, &mut diagnostics);

        let mut stack = IncludeStack::with_root(
            self.provider.canonicalize(path),
            path.to_path_buf(),
            self.options.max_include_depth,
        );
        let resolver = Resolver::new(&self.provider, &search_paths, &self.options.languages);
        let tokens = resolver.expand(tokens, path, &mut stack, &mut diagnostics);

        let root = Builder::new(path).build(tokens.clone(), &mut diagnostics);

        debug!(
            tokens = tokens.len(),
            diagnostics = diagnostics.len(),
            "analysis complete"
        );
        Analysis {
            tokens,
            root,
            diagnostics,
        }
    }
}

fn finish(root: Root, mut diagnostics: Diagnostics) -> Result<CompiledPrompt, CompileFailure> {
    if diagnostics.has_errors() {
        info!(errors = diagnostics.error_count(), "compile failed");
        return Err(CompileFailure { diagnostics });
    }

    let sections = emitter::emit(&root);
    match Document::try_from(root) {
        Ok(document) => {
            info!(sections = sections.len(), warnings = diagnostics.len(), "compile succeeded");
            Ok(CompiledPrompt {
                document,
                sections,
                diagnostics,
            })
        }
        Err(root) => {
            diagnostics.error(
                DiagnosticKind::Structure,
                "Document does not match 'Role? Context+ Action'",
                SourceLocation::start_of(&root.file),
            );
            Err(CompileFailure { diagnostics })
        }
    }
}

/// Compile `source` (the contents of `path`) from the local file system
pub fn compile(
    source: &str,
    path: impl AsRef<Path>,
    search_paths: &[PathBuf],
) -> Result<CompiledPrompt, CompileFailure> {
    Compiler::default().compile_with(source, path.as_ref(), search_paths)
}
