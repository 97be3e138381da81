//! Language tags for embedded files

use std::collections::BTreeMap;
use std::path::Path;

/// Tag used when neither the directive nor the extension names a language
pub const DEFAULT_LANGUAGE: &str = "plaintext";

const BUILTIN: &[(&str, &str)] = &[
    ("c", "c"),
    ("cc", "cpp"),
    ("cpp", "cpp"),
    ("css", "css"),
    ("go", "go"),
    ("h", "c"),
    ("hpp", "cpp"),
    ("html", "html"),
    ("java", "java"),
    ("js", "javascript"),
    ("json", "json"),
    ("md", "markdown"),
    ("py", "python"),
    ("rs", "rust"),
    ("sh", "bash"),
    ("sql", "sql"),
    ("toml", "toml"),
    ("ts", "typescript"),
    ("txt", "plaintext"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
];

/// Maps file extensions (lowercase, without the dot) to language tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageMap {
    by_extension: BTreeMap<String, String>,
}

impl LanguageMap {
    pub fn new(by_extension: BTreeMap<String, String>) -> Self {
        let by_extension = by_extension
            .into_iter()
            .map(|(ext, language)| (ext.to_ascii_lowercase(), language))
            .collect();
        Self { by_extension }
    }

    /// Language for `path`, judged by its last extension only
    pub fn detect(&self, path: &str) -> String {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .and_then(|ext| self.by_extension.get(&ext).cloned())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }
}

impl Default for LanguageMap {
    fn default() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(ext, language)| (ext.to_string(), language.to_string()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for LanguageMap {
    fn from(by_extension: BTreeMap<String, String>) -> Self {
        Self::new(by_extension)
    }
}
