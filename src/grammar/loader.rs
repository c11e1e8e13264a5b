//! Grammar definition documents
//!
//! Grammars can be written as JSON or YAML mappings from rule name to specification.
//! Document order matters: the first rule is the entry point.
//!
//! ```yaml
//! EXPR:
//!   - TERM "+ EXPR
//!   - TERM
//! TERM: /[0-9]+/
//! ```

use crate::error::{GrammarError, GrammarResult};
use crate::grammar::node::Node;
use crate::matching::Grammar;
use serde_json::Value;
use std::path::Path;

/// Add every rule of `document` to `grammar`, in document order.
pub fn define<N: Node + 'static>(grammar: &mut Grammar<N>, document: Value) -> GrammarResult<()> {
    let Value::Object(rules) = document else {
        return Err(GrammarError::Definition(
            "a grammar must be a mapping from rule names to specifications".to_string(),
        ));
    };
    for (name, spec) in rules {
        grammar.add_rule_value(name, spec)?;
    }
    Ok(())
}

pub fn load_value<N: Node + Default + 'static>(document: Value) -> GrammarResult<Grammar<N>> {
    let mut grammar = Grammar::new();
    define(&mut grammar, document)?;
    Ok(grammar)
}

pub fn load_json<N: Node + Default + 'static>(source: &str) -> GrammarResult<Grammar<N>> {
    load_value(parse_json(source)?)
}

pub fn load_yaml<N: Node + Default + 'static>(source: &str) -> GrammarResult<Grammar<N>> {
    load_value(parse_yaml(source)?)
}

/// Load a grammar file, choosing the decoder from the extension (`.json`, `.yaml`, `.yml`).
pub fn load_path<N: Node + Default + 'static>(path: impl AsRef<Path>) -> GrammarResult<Grammar<N>> {
    let mut grammar = Grammar::new();
    define_path(&mut grammar, path)?;
    Ok(grammar)
}

/// Add the rules of a grammar file to an existing grammar, so that its node factory and
/// default action apply to them.
pub fn define_path<N: Node + 'static>(
    grammar: &mut Grammar<N>,
    path: impl AsRef<Path>,
) -> GrammarResult<()> {
    define(grammar, read_document(path.as_ref())?)
}

fn read_document(path: &Path) -> GrammarResult<Value> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| GrammarError::Definition(format!("{}: {}", path.display(), e)))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&source),
        Some("yaml") | Some("yml") => parse_yaml(&source),
        other => Err(GrammarError::Definition(format!(
            "unsupported grammar file extension: {}",
            other.unwrap_or("<none>")
        ))),
    }
}

fn parse_json(source: &str) -> GrammarResult<Value> {
    serde_json::from_str(source).map_err(|e| GrammarError::Definition(e.to_string()))
}

fn parse_yaml(source: &str) -> GrammarResult<Value> {
    serde_yaml::from_str(source).map_err(|e| GrammarError::Definition(e.to_string()))
}
