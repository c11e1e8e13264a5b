//! Result nodes
//!
//! Every rule invocation accumulates its matches into a fresh [`Node`]: literal and
//! pattern tokens as [`Item::Token`], nested rule results as [`Item::Node`]. Once the
//! option has fully matched, the rule's action turns the node into the value that is
//! embedded in the parent node.
//!
//! [`ListNode`] is the default: it builds a [`Tree`] of nested lists of tokens.
//! Callers can bring their own node type to build typed syntax trees or to evaluate
//! on the fly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One thing appended to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item<T> {
    Token(String),
    Node(T),
}

/// Minimal capability a result node has to provide.
pub trait Node {
    /// What a finished node (and therefore a rule action) produces
    type Output;

    fn append(&mut self, item: Item<Self::Output>);

    /// Yield the accumulated contents. This is what the identity action returns.
    fn into_output(self) -> Self::Output;
}

/// Generic parse tree produced by [`ListNode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tree {
    Token(String),
    List(Vec<Tree>),
}

impl Tree {
    pub fn as_token(&self) -> Option<&str> {
        match self {
            Tree::Token(token) => Some(token.as_str()),
            Tree::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Tree]> {
        match self {
            Tree::Token(_) => None,
            Tree::List(items) => Some(items.as_slice()),
        }
    }

    /// All tokens in document order.
    pub fn tokens(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Tree::Token(token) => out.push(token.as_str()),
            Tree::List(items) => items.iter().for_each(|item| item.collect_tokens(out)),
        }
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Token(token) => write!(f, "{token:?}"),
            Tree::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for Tree {
    fn from(token: &str) -> Self {
        Tree::Token(token.to_string())
    }
}

impl From<String> for Tree {
    fn from(token: String) -> Self {
        Tree::Token(token)
    }
}

impl<T: Into<Tree>> From<Vec<T>> for Tree {
    fn from(items: Vec<T>) -> Self {
        Tree::List(items.into_iter().map(Into::into).collect())
    }
}

/// The default ordered-list node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListNode {
    items: Vec<Tree>,
}

impl ListNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Tree] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Node for ListNode {
    type Output = Tree;

    fn append(&mut self, item: Item<Tree>) {
        self.items.push(match item {
            Item::Token(token) => Tree::Token(token),
            Item::Node(tree) => tree,
        });
    }

    fn into_output(self) -> Tree {
        Tree::List(self.items)
    }
}
