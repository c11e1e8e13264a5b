//! Configuration loading
//!
//! `defaults/descent.default.toml` is embedded into the library so that docs and runtime
//! behavior stay in sync. Applications layer user files and single-key overrides on top
//! via [`Loader`] before deserializing into [`DescentConfig`].

use crate::error::GrammarResult;
use crate::token::{RegexTokenizer, SpaceTokenizer, Tokenizer};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/descent.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct DescentConfig {
    pub tokenizer: TokenizerConfig,
    pub engine: EngineConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerConfig {
    pub separator: String,
    pub pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub max_depth: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: String,
}

impl TokenizerConfig {
    /// The configured tokenizer: the regex separator when set, the literal one otherwise.
    pub fn build(&self) -> GrammarResult<Box<dyn Tokenizer>> {
        if self.pattern.is_empty() {
            Ok(Box::new(SpaceTokenizer::with_separator(self.separator.as_str())))
        } else {
            Ok(Box::new(RegexTokenizer::new(&self.pattern)?))
        }
    }
}

impl DescentConfig {
    pub fn tokenizer(&self) -> GrammarResult<Box<dyn Tokenizer>> {
        self.tokenizer.build()
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<DescentConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<DescentConfig, ConfigError> {
    Loader::new().build()
}
