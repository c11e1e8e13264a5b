//! Treeviz formatter for parse trees
//!
//! One line per node, nesting drawn with box connectors, 2 columns per level:
//!
//! ```text
//! ☰ 2 items
//! ├─ ◦ a
//! └─ ☰ 1 item
//!   └─ ◦ b
//! ```
//!
//! Icons: `☰` for a list node (labelled with its item count), `◦` for a token
//! (labelled with the token, truncated to 30 characters).

use crate::formats::registry::{FormatError, Formatter};
use crate::grammar::Tree;
use crate::matching::Parsed;

const MAX_LABEL: usize = 30;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn label(tree: &Tree) -> String {
    match tree {
        Tree::Token(token) => format!("◦ {}", truncate(token, MAX_LABEL)),
        Tree::List(items) if items.len() == 1 => "☰ 1 item".to_string(),
        Tree::List(items) => format!("☰ {} items", items.len()),
    }
}

fn format_node(tree: &Tree, prefix: &str, is_last: bool, output: &mut String) {
    let connector = if is_last { "└─" } else { "├─" };
    output.push_str(&format!("{}{} {}\n", prefix, connector, label(tree)));

    if let Tree::List(items) = tree {
        let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        format_children(items, &child_prefix, output);
    }
}

fn format_children(items: &[Tree], prefix: &str, output: &mut String) {
    let count = items.len();
    for (i, child) in items.iter().enumerate() {
        format_node(child, prefix, i + 1 == count, output);
    }
}

pub fn to_treeviz_str(tree: &Tree) -> String {
    let mut output = format!("{}\n", label(tree));
    if let Tree::List(items) = tree {
        format_children(items, "", &mut output);
    }
    output
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn serialize(&self, parsed: &Parsed<Tree>) -> Result<String, FormatError> {
        Ok(to_treeviz_str(&parsed.value))
    }

    fn description(&self) -> &str {
        "Visual tree representation with box connectors and icons"
    }
}
