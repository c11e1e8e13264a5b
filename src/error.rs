//! Error types for grammar definition and matching
//!
//! Errors fall into two families that mirror how grammars go wrong:
//!
//! - [`RulesetError`]: the grammar itself is malformed (bad rule specifications,
//!   an empty rule set at parse time).
//! - [`TokenError`]: an element or a token source is malformed (an empty or
//!   invalid pattern, a non-string token, an input that is not a sequence).
//!
//! Both are wrapped by [`GrammarError`], which additionally carries the fatal
//! conditions the matcher can run into (unknown rule references, runaway
//! recursion). An ordinary grammar mismatch is *not* an error; the matcher
//! reports it as `Ok(None)`.

use thiserror::Error;

/// Malformed rule specifications and rule sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesetError {
    /// An option list contained something other than a string
    #[error("option {index} of rule '{rule}' is not a string")]
    NonStringOption { rule: String, index: usize },

    /// A rule specification was neither a string nor a list of strings
    #[error("rule '{rule}' must be a string or a list of strings")]
    InvalidSpec { rule: String },

    /// Rules need a non-empty name to be referenced by
    #[error("rule names must not be empty")]
    EmptyName,

    /// `parse` was invoked on a grammar with no rules
    #[error("cannot parse with an empty ruleset")]
    EmptyRuleset,
}

/// Malformed grammar elements and token sources.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    /// A `//` element has nothing to match with
    #[error("pattern element '{element}' is empty")]
    EmptyPattern { element: String },

    /// The interior of a pattern element failed to compile
    #[error("pattern element '{element}' is not a valid regular expression: {source}")]
    MalformedPattern {
        element: String,
        #[source]
        source: regex::Error,
    },

    /// A token sequence contained a non-string value
    #[error("token at index {index} is not a string")]
    NonstringToken { index: usize },

    /// A token source could not be turned into an ordered sequence
    #[error("cannot build a token stream from {found}")]
    TokenStream { found: String },
}

/// Top-level error for everything the grammar API can fail with.
#[derive(Debug, Clone, Error)]
pub enum GrammarError {
    #[error(transparent)]
    Ruleset(#[from] RulesetError),

    #[error(transparent)]
    Token(#[from] TokenError),

    /// A rule reference named a rule that does not exist when it was reached
    #[error("reference to undefined rule '{name}'")]
    UnknownRule { name: String },

    /// Nesting went deeper than the configured limit (usually left recursion)
    #[error("recursion limit of {depth} reached while matching rule '{rule}'")]
    RecursionLimit { rule: String, depth: usize },

    /// A grammar document could not be read or decoded
    #[error("invalid grammar definition: {0}")]
    Definition(String),
}

/// Stable, classifiable kinds for [`GrammarError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Ruleset,
    EmptyRuleset,
    Token,
    NonstringToken,
    TokenStream,
    UnknownRule,
    RecursionLimit,
    Definition,
}

impl ErrorKind {
    /// True for `Ruleset` and its subtypes
    pub fn is_ruleset(self) -> bool {
        matches!(self, ErrorKind::Ruleset | ErrorKind::EmptyRuleset)
    }

    /// True for `Token` and its subtypes
    pub fn is_token(self) -> bool {
        matches!(
            self,
            ErrorKind::Token | ErrorKind::NonstringToken | ErrorKind::TokenStream
        )
    }
}

impl GrammarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GrammarError::Ruleset(RulesetError::EmptyRuleset) => ErrorKind::EmptyRuleset,
            GrammarError::Ruleset(_) => ErrorKind::Ruleset,
            GrammarError::Token(TokenError::NonstringToken { .. }) => ErrorKind::NonstringToken,
            GrammarError::Token(TokenError::TokenStream { .. }) => ErrorKind::TokenStream,
            GrammarError::Token(_) => ErrorKind::Token,
            GrammarError::UnknownRule { .. } => ErrorKind::UnknownRule,
            GrammarError::RecursionLimit { .. } => ErrorKind::RecursionLimit,
            GrammarError::Definition(_) => ErrorKind::Definition,
        }
    }
}

/// Result alias used throughout the crate
pub type GrammarResult<T> = Result<T, GrammarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classifies_subtypes() {
        let empty: GrammarError = RulesetError::EmptyRuleset.into();
        assert_eq!(empty.kind(), ErrorKind::EmptyRuleset);
        assert!(empty.kind().is_ruleset());
        assert!(!empty.kind().is_token());

        let nonstring: GrammarError = TokenError::NonstringToken { index: 2 }.into();
        assert_eq!(nonstring.kind(), ErrorKind::NonstringToken);
        assert!(nonstring.kind().is_token());

        let unknown = GrammarError::UnknownRule { name: "B".into() };
        assert!(!unknown.kind().is_ruleset());
        assert!(!unknown.kind().is_token());
    }

    #[test]
    fn test_messages() {
        let err: GrammarError = RulesetError::NonStringOption {
            rule: "A".into(),
            index: 1,
        }
        .into();
        assert_eq!(err.to_string(), "option 1 of rule 'A' is not a string");

        let err = GrammarError::UnknownRule { name: "B".into() };
        assert_eq!(err.to_string(), "reference to undefined rule 'B'");
    }
}
