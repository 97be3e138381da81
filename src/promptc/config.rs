//! Layered configuration for promptc
//!
//! `defaults/promptc.default.toml` is embedded into the crate so that docs and
//! runtime behavior stay in sync. Hosts layer their own files and single-key
//! overrides on top via [`Loader`] before deserializing into [`PromptcConfig`].

use crate::promptc::compiler::CompileOptions;
use crate::promptc::emitter::{EmbedFraming, EmitOptions};
use crate::promptc::resolver::LanguageMap;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const DEFAULT_TOML: &str = include_str!("../../defaults/promptc.default.toml");

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PromptcConfig {
    pub compile: CompileConfig,
    pub emit: EmitConfig,
    /// File extension to language tag for `Embed:` directives
    pub languages: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompileConfig {
    pub max_include_depth: usize,
    pub search_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmitConfig {
    pub embed_framing: EmbedFraming,
}

/// Builds a [`PromptcConfig`] from the embedded defaults plus whatever the
/// host stacks on top. Later layers win key by key.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Stack a TOML file that must exist
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), true)
    }

    /// Stack a TOML file if it exists, e.g. a `promptc.toml` next to the prompts
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.with_toml(path.as_ref(), false)
    }

    fn with_toml(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Pin one dotted key, such as `emit.embed_framing`, above every file
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<PromptcConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults with nothing layered on top
pub fn load_defaults() -> Result<PromptcConfig, ConfigError> {
    Loader::new().build()
}

impl From<&PromptcConfig> for CompileOptions {
    fn from(config: &PromptcConfig) -> Self {
        CompileOptions {
            max_include_depth: config.compile.max_include_depth,
            search_paths: config.compile.search_paths.clone(),
            languages: LanguageMap::from(config.languages.clone()),
        }
    }
}

impl From<&PromptcConfig> for EmitOptions {
    fn from(config: &PromptcConfig) -> Self {
        EmitOptions {
            framing: config.emit.embed_framing,
        }
    }
}
