//! # promptc
//!
//! A compiler for an indentation-sensitive markup language used to author
//! structured prompts for large language models.
//!
//! A prompt source is made of `Role:`, `Context:` and `Action:` blocks nested
//! by 4-space indentation, plus `Include:` and `Embed:` directives that pull
//! in other files. Compiling resolves the directives, validates indentation
//! and structure, and emits the prompt as ordered sections. Every problem in
//! the input is reported in one pass with an exact location.
//!
//! ```text
//! Context: Top
//!     Some notes
//!
//! Action:
//!     Do X
//! ```
//!
//! The main entry point is [`compile`]; [`Compiler`] adds configurable
//! options and a pluggable [`SourceProvider`].

pub mod promptc;

pub use promptc::ast::{Diagnostic, DiagnosticKind, Diagnostics, Document, Severity, SourceLocation};
pub use promptc::compiler::{compile, CompileFailure, CompileOptions, CompiledPrompt, Compiler};
pub use promptc::emitter::{EmbedFraming, EmitOptions};
pub use promptc::source::{FsSourceProvider, MemorySourceProvider, SourceError, SourceProvider};
