//! Cursor-based token stream
//!
//! A [`TokenStream`] is an immutable token buffer plus a private cursor. The buffer
//! is shared behind an `Arc`, so [`TokenStream::duplicate`] only copies a pointer and
//! an index. That is what makes backtracking cheap: the matcher duplicates the stream
//! at every choice point, advances the copy, and simply drops it when an option fails.
//!
//! # Empty tokens
//!
//! Tokens are plain strings. The empty token `""` (which the default tokenizer produces
//! for adjacent separators) is distinct from *absence* (the cursor is past the end).
//! The raw accessors ([`next_token`](TokenStream::next_token),
//! [`peek_token`](TokenStream::peek_token), [`skip`](TokenStream::skip)) see empty tokens;
//! the grammar-facing ones ([`consume`](TokenStream::consume),
//! [`peek_nth`](TokenStream::peek_nth)) step over them.

use crate::error::{GrammarError, GrammarResult, TokenError};
use crate::token::tokenizer::{SpaceTokenizer, Tokenizer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// An ordered token sequence with an independently advanceable cursor.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Arc<[String]>,
    cursor: usize,
}

impl TokenStream {
    /// Tokenize `text` with the default space tokenizer.
    pub fn new(text: &str) -> Self {
        Self::with_tokenizer(text, &SpaceTokenizer::new())
    }

    pub fn with_tokenizer(text: &str, tokenizer: &dyn Tokenizer) -> Self {
        Self::from_tokens(tokenizer.tokenize(text))
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            cursor: 0,
        }
    }

    /// A new stream over the same backing tokens, positioned at the same cursor.
    pub fn duplicate(&self) -> Self {
        Self {
            tokens: Arc::clone(&self.tokens),
            cursor: self.cursor,
        }
    }

    /// True when both streams read from the same buffer.
    pub fn shares_buffer(&self, other: &TokenStream) -> bool {
        Arc::ptr_eq(&self.tokens, &other.tokens)
    }

    /// Consume the token at the cursor, empty or not.
    pub fn next_token(&mut self) -> Option<&str> {
        let index = self.cursor;
        if index >= self.tokens.len() {
            return None;
        }
        self.cursor += 1;
        self.tokens.get(index).map(String::as_str)
    }

    /// Consume up to and including the next non-empty token.
    pub fn consume(&mut self) -> Option<&str> {
        while self.cursor < self.tokens.len() && self.tokens[self.cursor].is_empty() {
            self.cursor += 1;
        }
        self.next_token()
    }

    /// The raw token `n` positions ahead (1 is the token at the cursor).
    pub fn peek_token(&self, n: usize) -> Option<&str> {
        let offset = n.checked_sub(1)?;
        self.tokens
            .get(self.cursor.checked_add(offset)?)
            .map(String::as_str)
    }

    /// The next non-empty token.
    pub fn peek(&self) -> Option<&str> {
        self.peek_nth(1)
    }

    /// The `n`-th non-empty token ahead.
    ///
    /// The lookahead starts at raw offset `n` and widens by one for every empty token it
    /// lands on. Empty tokens *before* a non-empty raw offset `n` are not counted, so for
    /// `n > 1` over a stream with leading empties the result can sit earlier than the
    /// strict `n`-th non-empty token. `peek()` is always exact.
    pub fn peek_nth(&self, n: usize) -> Option<&str> {
        let mut empties = 0;
        loop {
            let token = self.peek_token(n.checked_add(empties)?)?;
            if !token.is_empty() {
                return Some(token);
            }
            empties += 1;
        }
    }

    /// Advance the raw cursor by `n` positions. Never moves past the end.
    pub fn skip(&mut self, n: usize) {
        self.cursor = self.cursor.saturating_add(n).min(self.tokens.len());
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// True when no raw tokens remain (empty tokens count as remaining).
    pub fn is_empty(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Snapshot of the unconsumed raw tokens.
    pub fn remaining(&self) -> Vec<&str> {
        self.tokens[self.cursor..]
            .iter()
            .map(String::as_str)
            .collect()
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Total number of raw tokens in the backing buffer.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Debug for TokenStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStream")
            .field("cursor", &self.cursor)
            .field("remaining", &self.remaining())
            .finish()
    }
}

impl From<&str> for TokenStream {
    fn from(text: &str) -> Self {
        TokenStream::new(text)
    }
}

impl From<String> for TokenStream {
    fn from(text: String) -> Self {
        TokenStream::new(&text)
    }
}

impl From<&String> for TokenStream {
    fn from(text: &String) -> Self {
        TokenStream::new(text)
    }
}

impl From<Vec<String>> for TokenStream {
    fn from(tokens: Vec<String>) -> Self {
        TokenStream::from_tokens(tokens)
    }
}

impl From<Vec<&str>> for TokenStream {
    fn from(tokens: Vec<&str>) -> Self {
        TokenStream::from_tokens(tokens)
    }
}

impl<const N: usize> From<[&str; N]> for TokenStream {
    fn from(tokens: [&str; N]) -> Self {
        TokenStream::from_tokens(tokens)
    }
}

impl From<&[&str]> for TokenStream {
    fn from(tokens: &[&str]) -> Self {
        TokenStream::from_tokens(tokens.iter().copied())
    }
}

impl From<&TokenStream> for TokenStream {
    fn from(stream: &TokenStream) -> Self {
        stream.duplicate()
    }
}

/// Dynamic token sources, as read from JSON or YAML input.
///
/// A string is tokenized with the default tokenizer, an array must hold only strings,
/// and anything else cannot be read as an ordered token sequence.
impl TryFrom<Value> for TokenStream {
    type Error = GrammarError;

    fn try_from(value: Value) -> GrammarResult<Self> {
        match value {
            Value::String(text) => Ok(TokenStream::new(&text)),
            Value::Array(items) => {
                let mut tokens = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    match item {
                        Value::String(token) => tokens.push(token),
                        _ => return Err(TokenError::NonstringToken { index }.into()),
                    }
                }
                Ok(TokenStream::from_tokens(tokens))
            }
            other => Err(TokenError::TokenStream {
                found: json_type_name(&other).to_string(),
            }
            .into()),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
