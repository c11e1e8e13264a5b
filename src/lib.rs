//! # descent
//!
//! Grammars defined at runtime, matched by a backtracking recursive-descent engine.
//!
//! A grammar is a mapping from rule names to alternatives. Each alternative is a
//! whitespace-separated sequence of elements:
//!
//! - `"text`: a literal token
//! - `/regex/`: a token matching the whole pattern
//! - `NAME`: a reference to another rule, resolved when it is reached
//!
//! ```ignore
//! use descent::Grammar;
//!
//! let mut grammar: Grammar = Grammar::new();
//! grammar.add_rule("SUM", ["NUM \"+ SUM", "NUM"])?;
//! grammar.add_rule("NUM", "/[0-9]+/")?;
//!
//! let parsed = grammar.parse("1 + 2 + 3")?.expect("matches");
//! assert_eq!(parsed.tokens, ["1", "+", "2", "+", "3"]);
//! ```
//!
//! Layout
//!
//! src/
//!   ├── token        Token streams and tokenizers
//!   ├── grammar      Elements, rules, result nodes, grammar documents
//!   ├── matching     The matching engine
//!   ├── formats      Output formats for parse results
//!   ├── config       Layered configuration
//!   └── error        Error taxonomy
//!
//! Matching is first-match-wins per rule: alternatives are tried in declaration order
//! and the first one that matches completely is final. There is no left-recursion
//! elimination and no memoization.

pub mod config;
pub mod error;
pub mod formats;
pub mod grammar;
pub mod matching;
pub mod token;

pub use error::{ErrorKind, GrammarError, GrammarResult, RulesetError, TokenError};
pub use grammar::{Item, ListNode, Node, Tree};
pub use matching::{Grammar, Parsed};
pub use token::TokenStream;
