//! Tokens and token streams
//!
//! Input to a grammar is an ordered sequence of string tokens. This module holds the
//! cursor-based [`TokenStream`] the matcher walks, and the [`Tokenizer`]s that turn raw
//! text into tokens.

pub mod stream;
pub mod tokenizer;

pub use stream::TokenStream;
pub use tokenizer::{RegexTokenizer, SpaceTokenizer, Tokenizer};
