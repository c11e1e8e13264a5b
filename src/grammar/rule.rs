//! Rules: a name, ordered alternatives, and an action
//!
//! A rule specification is either one whitespace-delimited element string or a list
//! of them. Each string becomes one [`Alternative`]; alternatives are tried in the
//! order they were declared, and the first one that fully matches wins.
//!
//! ```text
//! EXPR:  ["TERM \"+ EXPR", "TERM"]
//! TERM:  "/[0-9]+/"
//! ```

use crate::error::RulesetError;
use crate::grammar::element::LazyElement;
use crate::grammar::node::Node;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Transforms a matched node (plus the rule's name) into the value embedded upstream.
pub type Action<N> = Arc<dyn Fn(N, &str) -> <N as Node>::Output + Send + Sync>;

/// The action that returns the node's accumulated contents unchanged.
pub fn identity<N: Node + 'static>() -> Action<N> {
    Arc::new(|node: N, _name: &str| node.into_output())
}

/// Wrap a closure as an [`Action`].
pub fn action<N, F>(f: F) -> Action<N>
where
    N: Node,
    F: Fn(N, &str) -> N::Output + Send + Sync + 'static,
{
    Arc::new(f)
}

/// One or more option strings, before they are split into elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    options: Vec<String>,
}

impl RuleSpec {
    pub fn one(option: impl Into<String>) -> Self {
        Self {
            options: vec![option.into()],
        }
    }

    pub fn many<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a specification from a dynamic value: a string, or an array of strings.
    pub fn from_value(rule: &str, value: Value) -> Result<Self, RulesetError> {
        match value {
            Value::String(option) => Ok(Self::one(option)),
            Value::Array(items) => {
                let mut options = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    match item {
                        Value::String(option) => options.push(option),
                        _ => {
                            return Err(RulesetError::NonStringOption {
                                rule: rule.to_string(),
                                index,
                            })
                        }
                    }
                }
                Ok(Self { options })
            }
            _ => Err(RulesetError::InvalidSpec {
                rule: rule.to_string(),
            }),
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}

impl From<&str> for RuleSpec {
    fn from(option: &str) -> Self {
        RuleSpec::one(option)
    }
}

impl From<String> for RuleSpec {
    fn from(option: String) -> Self {
        RuleSpec::one(option)
    }
}

impl From<Vec<&str>> for RuleSpec {
    fn from(options: Vec<&str>) -> Self {
        RuleSpec::many(options)
    }
}

impl From<Vec<String>> for RuleSpec {
    fn from(options: Vec<String>) -> Self {
        RuleSpec::many(options)
    }
}

impl<const N: usize> From<[&str; N]> for RuleSpec {
    fn from(options: [&str; N]) -> Self {
        RuleSpec::many(options)
    }
}

impl From<&[&str]> for RuleSpec {
    fn from(options: &[&str]) -> Self {
        RuleSpec::many(options.iter().copied())
    }
}

/// One alternative: an ordered sequence of elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    elements: Vec<LazyElement>,
}

impl Alternative {
    pub fn parse(option: &str) -> Self {
        Self {
            elements: option.split_whitespace().map(LazyElement::new).collect(),
        }
    }

    pub fn elements(&self) -> &[LazyElement] {
        &self.elements
    }

    /// The empty alternative matches vacuously
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn sources(&self) -> Vec<String> {
        self.elements
            .iter()
            .map(|element| element.source().to_string())
            .collect()
    }
}

pub struct Rule<N: Node> {
    name: String,
    options: Vec<Alternative>,
    action: Action<N>,
}

impl<N: Node + 'static> Rule<N> {
    /// A rule with the given options. `None` for the action means identity.
    pub fn new(name: impl Into<String>, spec: impl Into<RuleSpec>, action: Option<Action<N>>) -> Self {
        let mut rule = Self {
            name: name.into(),
            options: Vec::new(),
            action: action.unwrap_or_else(identity),
        };
        rule.set_spec(spec);
        rule
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &[Alternative] {
        &self.options
    }

    pub fn set_spec(&mut self, spec: impl Into<RuleSpec>) {
        self.options = spec
            .into()
            .options()
            .iter()
            .map(|option| Alternative::parse(option))
            .collect();
    }

    pub fn set_action(&mut self, action: Option<Action<N>>) {
        self.action = action.unwrap_or_else(identity);
    }

    pub fn allows_empty(&self) -> bool {
        self.options.iter().any(Alternative::is_empty)
    }

    /// Run the action on a matched node.
    pub fn trigger(&self, node: N) -> N::Output {
        (self.action)(node, &self.name)
    }

    /// The options as element source strings.
    pub fn spec(&self) -> Vec<Vec<String>> {
        self.options.iter().map(Alternative::sources).collect()
    }
}

impl<N: Node> Clone for Rule<N> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            options: self.options.clone(),
            action: Arc::clone(&self.action),
        }
    }
}

impl<N: Node> fmt::Debug for Rule<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::node::{Item, ListNode, Tree};
    use serde_json::json;

    #[test]
    fn test_single_option_is_split_on_whitespace() {
        let rule: Rule<ListNode> = Rule::new("A", "\"a  B\t/c/", None);
        assert_eq!(rule.spec(), vec![vec!["\"a", "B", "/c/"]]);
    }

    #[test]
    fn test_options_keep_declaration_order() {
        let rule: Rule<ListNode> = Rule::new("R", ["\"x", "\"y", ""], None);
        assert_eq!(
            rule.spec(),
            vec![vec!["\"x".to_string()], vec!["\"y".to_string()], vec![]]
        );
        assert!(rule.allows_empty());
    }

    #[test]
    fn test_allows_empty() {
        let rule: Rule<ListNode> = Rule::new("R", "\"x", None);
        assert!(!rule.allows_empty());

        let rule: Rule<ListNode> = Rule::new("R", "   ", None);
        assert!(rule.allows_empty());
    }

    #[test]
    fn test_set_spec_replaces_options() {
        let mut rule: Rule<ListNode> = Rule::new("R", "\"x", None);
        rule.set_spec(vec!["\"y", "\"z"]);
        assert_eq!(rule.options().len(), 2);
        assert_eq!(rule.spec()[0], vec!["\"y"]);
    }

    #[test]
    fn test_default_action_is_identity() {
        let rule: Rule<ListNode> = Rule::new("R", "\"x", None);
        let mut node = ListNode::new();
        node.append(Item::Token("x".into()));
        assert_eq!(rule.trigger(node), Tree::from(vec!["x"]));
    }

    #[test]
    fn test_trigger_passes_rule_name() {
        let rule: Rule<ListNode> = Rule::new(
            "NAME",
            "\"x",
            Some(action(|_node: ListNode, name: &str| Tree::from(name))),
        );
        assert_eq!(rule.trigger(ListNode::new()), Tree::from("NAME"));
    }

    #[test]
    fn test_set_action_none_restores_identity() {
        let mut rule: Rule<ListNode> = Rule::new(
            "R",
            "\"x",
            Some(action(|_node: ListNode, _name: &str| Tree::from("replaced"))),
        );
        rule.set_action(None);
        assert_eq!(rule.trigger(ListNode::new()), Tree::List(vec![]));
    }

    #[test]
    fn test_spec_from_value() {
        let spec = RuleSpec::from_value("A", json!("\"a B")).unwrap();
        assert_eq!(spec.options(), &["\"a B"]);

        let spec = RuleSpec::from_value("A", json!(["\"a", ""])).unwrap();
        assert_eq!(spec.options(), &["\"a", ""]);
    }

    #[test]
    fn test_spec_from_value_rejects_non_strings() {
        assert_eq!(
            RuleSpec::from_value("A", json!(["\"a", 3])),
            Err(RulesetError::NonStringOption {
                rule: "A".into(),
                index: 1
            })
        );
        assert_eq!(
            RuleSpec::from_value("A", json!({"x": 1})),
            Err(RulesetError::InvalidSpec { rule: "A".into() })
        );
    }
}
