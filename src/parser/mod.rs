//! Code-parser capability, registry and fallback strategy.
//!
//! Parsers return raw, tool-specific JSON; `normalize` reconciles it. The
//! registry is built once by the caller and passed by reference.

pub mod command;
pub mod regex_fallback;

pub use command::CommandParser;
pub use regex_fallback::RegexParser;

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{self, NormalizedParseResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Matlab,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Matlab => "matlab",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ParserError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "matlab" | "m" => Ok(Language::Matlab),
            other => Err(ParserError::UnsupportedLanguage(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    #[error("no parser registered for {0}")]
    NoParser(Language),

    #[error("failed to start parser '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error talking to parser '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parser '{program}' timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("parser '{program}' exited with status {status}: {stderr}")]
    Exit {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("parser '{program}' produced invalid JSON: {source}")]
    InvalidOutput {
        program: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Syntax(String),
}

/// One parsing backend.
pub trait CodeParser: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Parse raw source, returning the backend's own JSON shape.
    fn parse(&self, source: &str) -> Result<Value, ParserError>;
}

/// Tries `primary`, and on any failure runs `fallback`.
pub struct FallbackParser {
    name: String,
    primary: Box<dyn CodeParser>,
    fallback: Box<dyn CodeParser>,
}

impl FallbackParser {
    pub fn new(primary: Box<dyn CodeParser>, fallback: Box<dyn CodeParser>) -> Self {
        let name = format!("{} -> {}", primary.name(), fallback.name());
        FallbackParser {
            name,
            primary,
            fallback,
        }
    }
}

impl CodeParser for FallbackParser {
    fn name(&self) -> &str {
        &self.name
    }

    fn parse(&self, source: &str) -> Result<Value, ParserError> {
        match self.primary.parse(source) {
            Ok(output) => Ok(output),
            Err(e) => {
                tracing::warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "primary parser failed, falling back"
                );
                self.fallback.parse(source)
            }
        }
    }
}

/// Language → parser. Constructed once at startup.
#[derive(Default)]
pub struct ParserRegistry {
    parsers: HashMap<Language, Box<dyn CodeParser>>,
}

impl std::fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries: Vec<(&str, &str)> = self
            .parsers
            .iter()
            .map(|(lang, p)| (lang.as_str(), p.name()))
            .collect();
        entries.sort();
        f.debug_struct("ParserRegistry")
            .field("parsers", &entries)
            .finish()
    }
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the regex parsers for every language.
    pub fn with_fallbacks() -> Self {
        let mut registry = Self::new();
        registry.register(Language::Python, Box::new(RegexParser::new(Language::Python)));
        registry.register(Language::Matlab, Box::new(RegexParser::new(Language::Matlab)));
        registry
    }

    /// Register `parser`, replacing any previous one for `language`.
    pub fn register(&mut self, language: Language, parser: Box<dyn CodeParser>) {
        self.parsers.insert(language, parser);
    }

    /// Put `primary` in front of the existing parser for `language`, which
    /// becomes its fallback. With nothing registered, `primary` is
    /// registered alone.
    pub fn register_primary(&mut self, language: Language, primary: Box<dyn CodeParser>) {
        let parser: Box<dyn CodeParser> = match self.parsers.remove(&language) {
            Some(fallback) => Box::new(FallbackParser::new(primary, fallback)),
            None => primary,
        };
        self.parsers.insert(language, parser);
    }

    pub fn get(&self, language: Language) -> Option<&dyn CodeParser> {
        self.parsers.get(&language).map(|p| p.as_ref())
    }

    pub fn languages(&self) -> Vec<Language> {
        let mut langs: Vec<Language> = self.parsers.keys().copied().collect();
        langs.sort_by_key(|l| l.as_str());
        langs
    }
}

/// Parse `source` with the registered parser and normalize the result.
pub fn analyze(
    registry: &ParserRegistry,
    language: Language,
    source: &str,
) -> Result<NormalizedParseResult, ParserError> {
    let parser = registry
        .get(language)
        .ok_or(ParserError::NoParser(language))?;
    let raw = parser.parse(source)?;
    Ok(normalize::normalize_parse_result(&raw, Some(language)))
}
