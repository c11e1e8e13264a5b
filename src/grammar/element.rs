//! Grammar element classification
//!
//! Elements are written as plain strings inside rule specifications and classified
//! purely by their sigils:
//!
//! | Form       | Written as   | Matches                                   |
//! |------------|--------------|-------------------------------------------|
//! | Literal    | `"text`      | a token equal to `text`                   |
//! | Pattern    | `/regex/`    | a token the whole of which matches `regex` |
//! | Rule       | `name`       | whatever rule `name` matches              |
//!
//! Classification is lazy: a [`LazyElement`] keeps the source string and classifies it
//! the first time the matcher reaches it, so malformed patterns only surface when they
//! are actually used, and rule references stay late-bound.

use crate::error::TokenError;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::fmt;

pub const LITERAL_SIGIL: char = '"';
pub const PATTERN_SIGIL: char = '/';

/// A classified grammar element.
#[derive(Debug, Clone)]
pub enum Element {
    Literal(String),
    /// Compiled with the interior anchored to the whole token
    Pattern(Regex),
    Rule(String),
}

impl Element {
    /// Whether `token` satisfies this element. Rule references never match directly.
    pub fn matches(&self, token: Option<&str>) -> bool {
        match self {
            Element::Literal(text) => token == Some(text.as_str()),
            Element::Pattern(regex) => pattern_accepts(regex, token),
            Element::Rule(_) => false,
        }
    }
}

pub fn classify(element: &str) -> Result<Element, TokenError> {
    if let Some(text) = element.strip_prefix(LITERAL_SIGIL) {
        return Ok(Element::Literal(text.to_string()));
    }
    if let Some(body) = pattern_body(element) {
        return compile_pattern(element, body).map(Element::Pattern);
    }
    Ok(Element::Rule(element.to_string()))
}

/// True iff `token` is present and equals the literal text of `element`.
pub fn matches_literal(element: &str, token: Option<&str>) -> bool {
    let text = element.strip_prefix(LITERAL_SIGIL).unwrap_or(element);
    token == Some(text)
}

/// True iff `token` matches the anchored pattern, or is absent and the pattern
/// accepts the empty string.
pub fn matches_pattern(element: &str, token: Option<&str>) -> Result<bool, TokenError> {
    let body = pattern_body(element).unwrap_or(element);
    let regex = compile_pattern(element, body)?;
    Ok(pattern_accepts(&regex, token))
}

fn pattern_accepts(regex: &Regex, token: Option<&str>) -> bool {
    regex.is_match(token.unwrap_or(""))
}

fn pattern_body(element: &str) -> Option<&str> {
    if element.len() < 2 {
        return None;
    }
    element
        .strip_prefix(PATTERN_SIGIL)
        .and_then(|rest| rest.strip_suffix(PATTERN_SIGIL))
}

fn compile_pattern(element: &str, body: &str) -> Result<Regex, TokenError> {
    if body.is_empty() {
        return Err(TokenError::EmptyPattern {
            element: element.to_string(),
        });
    }
    Regex::new(&format!("^(?:{body})$")).map_err(|source| TokenError::MalformedPattern {
        element: element.to_string(),
        source,
    })
}

/// An element string whose classification is computed on first use and then kept.
#[derive(Clone)]
pub struct LazyElement {
    source: String,
    classified: OnceCell<Element>,
}

impl LazyElement {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            classified: OnceCell::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Classify (once) and return the element. Errors are not cached.
    pub fn element(&self) -> Result<&Element, TokenError> {
        self.classified.get_or_try_init(|| classify(&self.source))
    }
}

impl fmt::Debug for LazyElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.source)
    }
}

impl PartialEq for LazyElement {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for LazyElement {}
