//! Output formats
//!
//! Compiled prompts can be written as rendered text or serialized as JSON or
//! YAML. Two inspection formats work on the best-effort [`Analysis`] instead,
//! so they produce output even for broken input: `tree` (the document tree as
//! JSON) and `tokens` (the expanded token stream, one tag per line).

use crate::promptc::compiler::{Analysis, CompiledPrompt};
use crate::promptc::emitter::EmitOptions;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
    Tree,
    Tokens,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        OutputFormat::Text,
        OutputFormat::Json,
        OutputFormat::Yaml,
        OutputFormat::Tree,
        OutputFormat::Tokens,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Yaml => "yaml",
            OutputFormat::Tree => "tree",
            OutputFormat::Tokens => "tokens",
        }
    }

    /// Formats that inspect a best-effort analysis rather than a compiled prompt
    pub fn is_inspection(&self) -> bool {
        matches!(self, OutputFormat::Tree | OutputFormat::Tokens)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        OutputFormat::ALL
            .into_iter()
            .find(|format| format.name() == value)
            .ok_or_else(|| FormatError::UnknownFormat(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    UnknownFormat(String),
    /// The format needs a compiled prompt or an analysis, and got the other
    WrongInput(OutputFormat),
    Serialization(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::UnknownFormat(name) => {
                let known: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.name()).collect();
                write!(
                    f,
                    "Unknown format '{}' (expected one of: {})",
                    name,
                    known.join(", ")
                )
            }
            FormatError::WrongInput(format) => {
                write!(f, "Format '{}' cannot be produced from this input", format)
            }
            FormatError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<serde_json::Error> for FormatError {
    fn from(error: serde_json::Error) -> Self {
        FormatError::Serialization(error.to_string())
    }
}

impl From<serde_yaml::Error> for FormatError {
    fn from(error: serde_yaml::Error) -> Self {
        FormatError::Serialization(error.to_string())
    }
}

/// Serialize a compiled prompt as `text`, `json` or `yaml`
pub fn format_prompt(
    prompt: &CompiledPrompt,
    format: OutputFormat,
    options: &EmitOptions,
) -> Result<String, FormatError> {
    match format {
        OutputFormat::Text => Ok(prompt.render(options)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(prompt)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(prompt)?),
        OutputFormat::Tree | OutputFormat::Tokens => Err(FormatError::WrongInput(format)),
    }
}

/// Serialize an analysis as `tree` or `tokens`
pub fn format_analysis(analysis: &Analysis, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Tree => Ok(serde_json::to_string_pretty(&analysis.root)? + "\n"),
        OutputFormat::Tokens => Ok(analysis
            .tokens
            .iter()
            .map(|token| format!("{}\n", token))
            .collect()),
        OutputFormat::Text | OutputFormat::Json | OutputFormat::Yaml => {
            Err(FormatError::WrongInput(format))
        }
    }
}
