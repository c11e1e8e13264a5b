//! Tokenizers split raw text into the atomic string tokens a grammar matches against.
//!
//! The default, [`SpaceTokenizer`], splits on a single separator and keeps the empty
//! tokens that adjacent separators produce. The token stream skips those when it
//! consumes, so `"a  b"` still reads as `a`, `b`.

use crate::error::{GrammarResult, TokenError};
use regex::Regex;

/// Anything that can split text into an ordered sequence of tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Splits on a literal separator, a single space by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceTokenizer {
    separator: String,
}

impl SpaceTokenizer {
    pub fn new() -> Self {
        Self::with_separator(" ")
    }

    /// An empty separator falls back to the single space.
    pub fn with_separator(separator: impl Into<String>) -> Self {
        let separator = separator.into();
        let separator = if separator.is_empty() {
            " ".to_string()
        } else {
            separator
        };
        Self { separator }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl Default for SpaceTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for SpaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(self.separator.as_str())
            .map(str::to_string)
            .collect()
    }
}

/// Splits wherever a regular expression matches.
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    separator: Regex,
}

impl RegexTokenizer {
    pub fn new(pattern: &str) -> GrammarResult<Self> {
        if pattern.is_empty() {
            return Err(TokenError::EmptyPattern {
                element: pattern.to_string(),
            }
            .into());
        }
        let separator = Regex::new(pattern).map_err(|source| TokenError::MalformedPattern {
            element: pattern.to_string(),
            source,
        })?;
        Ok(Self { separator })
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        self.separator.split(text).map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_tokenizer_keeps_empty_tokens() {
        let tokens = SpaceTokenizer::new().tokenize("a  b");
        assert_eq!(tokens, vec!["a", "", "b"]);
    }

    #[test]
    fn test_space_tokenizer_empty_text() {
        assert_eq!(SpaceTokenizer::new().tokenize(""), vec![""]);
    }

    #[test]
    fn test_custom_separator() {
        let tokens = SpaceTokenizer::with_separator(",").tokenize("1,2,,3");
        assert_eq!(tokens, vec!["1", "2", "", "3"]);
    }

    #[test]
    fn test_regex_tokenizer() {
        let tokenizer = RegexTokenizer::new(r"\s+").unwrap();
        assert_eq!(tokenizer.tokenize("a \t b\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_regex_tokenizer_rejects_bad_patterns() {
        assert!(RegexTokenizer::new("").is_err());
        assert!(RegexTokenizer::new("(").is_err());
    }

    #[test]
    fn test_closure_tokenizer() {
        let chars = |text: &str| text.chars().map(String::from).collect::<Vec<_>>();
        assert_eq!(chars.tokenize("ab"), vec!["a", "b"]);
    }
}
