//! Grammar building blocks: elements, rules, result nodes, and grammar documents

pub mod element;
pub mod loader;
pub mod node;
pub mod rule;

pub use element::{classify, matches_literal, matches_pattern, Element, LazyElement};
pub use node::{Item, ListNode, Node, Tree};
pub use rule::{action, identity, Action, Alternative, Rule, RuleSpec};
