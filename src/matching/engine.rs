//! Backtracking recursive-descent matcher
//!
//! The [`Grammar`] owns the live rule set and drives matching. For a rule `R` against a
//! stream `S`:
//!
//! 1. If any option of `R` is empty, `R` succeeds immediately without consuming
//!    anything, whatever `S` holds.
//! 2. Otherwise each option is tried in declaration order against a duplicate of `S`
//!    with a fresh node. Literals and patterns consume one non-empty token; a rule
//!    reference recurses and then advances by `max(matched, 1)` tokens.
//! 3. The first option whose elements all match wins: the node goes through `R`'s
//!    action and the result is final. There is no exploration beyond it.
//!
//! A failed option is simply dropped together with its duplicate stream, which is
//! what backtracking amounts to. Running out of options is the ordinary "no match"
//! outcome (`Ok(None)`), while an unknown rule reference or a malformed element aborts
//! the whole parse with an error.
//!
//! Rules are looked up by name when they are reached, so forward, self and mutual
//! references all work, and the entry rule is whichever rule was declared first.
//!
//! There is no memoization. Grammars with heavily overlapping alternatives re-scan
//! shared prefixes and can take exponential time.

use crate::config::EngineConfig;
use crate::error::{GrammarError, GrammarResult, RulesetError};
use crate::grammar::element::Element;
use crate::grammar::node::{Item, ListNode, Node};
use crate::grammar::rule::{identity, Action, Alternative, Rule, RuleSpec};
use crate::token::TokenStream;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Nesting limit used unless configured otherwise.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Remaining stack below which a nested rule match moves to a fresh segment.
const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each stack segment allocated for deep nesting.
const STACK_SEGMENT: usize = 1024 * 1024;

/// Builds the fresh node each rule invocation accumulates into.
pub type NodeFactory<N> = Arc<dyn Fn() -> N + Send + Sync>;

/// A successful match: the flat list of consumed tokens and the transformed result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parsed<T> {
    pub tokens: Vec<String>,
    pub value: T,
}

/// A named, ordered rule set plus the matcher that runs it.
pub struct Grammar<N: Node = ListNode> {
    rules: IndexMap<String, Rule<N>>,
    default_action: Action<N>,
    node_factory: NodeFactory<N>,
    max_depth: usize,
}

impl<N: Node + Default + 'static> Grammar<N> {
    pub fn new() -> Self {
        Self::with_factory(N::default)
    }

    /// Build a grammar from `(name, spec)` pairs, in order.
    pub fn from_rules<I, K, S>(rules: I) -> GrammarResult<Self>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<RuleSpec>,
    {
        let mut grammar = Self::new();
        for (name, spec) in rules {
            grammar.add_rule(name, spec)?;
        }
        Ok(grammar)
    }
}

impl<N: Node + Default + 'static> Default for Grammar<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node + 'static> Grammar<N> {
    /// An empty grammar whose rule invocations start from `factory()`.
    pub fn with_factory(factory: impl Fn() -> N + Send + Sync + 'static) -> Self {
        Self {
            rules: IndexMap::new(),
            default_action: identity(),
            node_factory: Arc::new(factory),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// The action given to rules declared without one.
    pub fn with_default_action(mut self, action: Action<N>) -> Self {
        self.default_action = action;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_config(self, config: &EngineConfig) -> Self {
        self.with_max_depth(config.max_depth)
    }

    /// Declare `name` with the default action. See [`Grammar::add_rule_with_action`].
    pub fn add_rule(
        &mut self,
        name: impl Into<String>,
        spec: impl Into<RuleSpec>,
    ) -> GrammarResult<&mut Self> {
        let action = Arc::clone(&self.default_action);
        self.add_rule_with_action(name, spec, action)
    }

    /// Insert a rule, or replace the one with the same name.
    ///
    /// A replaced rule keeps its position, so redeclaring the first rule does not change
    /// the entry point. Rule references inside `spec` are not checked here.
    pub fn add_rule_with_action(
        &mut self,
        name: impl Into<String>,
        spec: impl Into<RuleSpec>,
        action: Action<N>,
    ) -> GrammarResult<&mut Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(RulesetError::EmptyName.into());
        }
        let rule = Rule::new(name.clone(), spec, Some(action));
        debug!(rule = %name, options = rule.options().len(), "declaring rule");
        if self.rules.insert(name.clone(), rule).is_some() {
            debug!(rule = %name, "replaced existing rule");
        }
        Ok(self)
    }

    /// Like [`Grammar::add_rule`], for specifications read from JSON or YAML.
    pub fn add_rule_value(&mut self, name: impl Into<String>, spec: Value) -> GrammarResult<&mut Self> {
        let name = name.into();
        let spec = RuleSpec::from_value(&name, spec)?;
        self.add_rule(name, spec)
    }

    /// A deep copy of the rule set: name to options, in declaration order.
    pub fn rules(&self) -> IndexMap<String, Vec<Vec<String>>> {
        self.rules
            .iter()
            .map(|(name, rule)| (name.clone(), rule.spec()))
            .collect()
    }

    pub fn rule(&self, name: &str) -> Option<&Rule<N>> {
        self.rules.get(name)
    }

    /// The rule `parse` starts from: the first one ever declared.
    pub fn entry_rule(&self) -> Option<&Rule<N>> {
        self.rules.first().map(|(_, rule)| rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Match the entry rule against `input`.
    ///
    /// Returns `Ok(None)` when the input does not match, and an error for structural
    /// problems: no rules at all, an unknown rule reference, a malformed element.
    pub fn parse(&self, input: impl Into<TokenStream>) -> GrammarResult<Option<Parsed<N::Output>>> {
        let entry = self.entry_rule().ok_or(RulesetError::EmptyRuleset)?;
        let stream = input.into();
        self.match_rule(entry, &stream, 0)
    }

    /// [`Grammar::parse`] for dynamic input: a string to tokenize or an array of strings.
    pub fn parse_value(&self, input: Value) -> GrammarResult<Option<Parsed<N::Output>>> {
        let entry = self.entry_rule().ok_or(RulesetError::EmptyRuleset)?;
        let stream = TokenStream::try_from(input)?;
        self.match_rule(entry, &stream, 0)
    }

    /// Match a specific rule, bypassing the entry point.
    pub fn test(
        &self,
        name: &str,
        input: impl Into<TokenStream>,
    ) -> GrammarResult<Option<Parsed<N::Output>>> {
        let rule = self.lookup(name)?;
        let stream = input.into();
        self.match_rule(rule, &stream, 0)
    }

    fn lookup(&self, name: &str) -> GrammarResult<&Rule<N>> {
        self.rules.get(name).ok_or_else(|| GrammarError::UnknownRule {
            name: name.to_string(),
        })
    }

    /// Match `rule` at the cursor of `stream`. The caller's cursor is left untouched.
    fn match_rule(
        &self,
        rule: &Rule<N>,
        stream: &TokenStream,
        depth: usize,
    ) -> GrammarResult<Option<Parsed<N::Output>>> {
        if depth >= self.max_depth {
            return Err(GrammarError::RecursionLimit {
                rule: rule.name().to_string(),
                depth,
            });
        }

        // Vacuous success: the remaining input is deliberately not inspected.
        if rule.allows_empty() {
            trace!(rule = rule.name(), depth, "empty option matches");
            let value = rule.trigger((self.node_factory)());
            return Ok(Some(Parsed {
                tokens: Vec::new(),
                value,
            }));
        }

        for (index, option) in rule.options().iter().enumerate() {
            trace!(rule = rule.name(), option = index, depth, "trying option");
            if let Some(parsed) = self.match_option(rule, option, stream, depth)? {
                debug!(
                    rule = rule.name(),
                    option = index,
                    consumed = parsed.tokens.len(),
                    "rule matched"
                );
                return Ok(Some(parsed));
            }
        }

        trace!(rule = rule.name(), depth, "no option matched");
        Ok(None)
    }

    fn match_option(
        &self,
        rule: &Rule<N>,
        option: &Alternative,
        stream: &TokenStream,
        depth: usize,
    ) -> GrammarResult<Option<Parsed<N::Output>>> {
        let mut cursor = stream.duplicate();
        let mut node = (self.node_factory)();
        let mut tokens = Vec::new();

        for lazy in option.elements() {
            let element = lazy.element()?;
            let token = cursor.peek().map(str::to_owned);

            match element {
                Element::Literal(text) => {
                    if token.as_deref() != Some(text.as_str()) {
                        trace!(element = lazy.source(), token = ?token, "literal mismatch");
                        return Ok(None);
                    }
                    if let Some(token) = token {
                        tokens.push(token.clone());
                        node.append(Item::Token(token));
                    }
                    cursor.consume();
                }
                Element::Pattern(_) => {
                    if !element.matches(token.as_deref()) {
                        trace!(element = lazy.source(), token = ?token, "pattern mismatch");
                        return Ok(None);
                    }
                    if let Some(token) = token {
                        tokens.push(token.clone());
                        node.append(Item::Token(token));
                    }
                    cursor.consume();
                }
                Element::Rule(name) => {
                    let sub_rule = self.lookup(name)?;
                    // Nesting depth is bounded by max_depth, not by the caller's stack size.
                    let sub = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || {
                        self.match_rule(sub_rule, &cursor, depth + 1)
                    })?;
                    let Some(sub) = sub else {
                        trace!(rule = rule.name(), reference = %name, "reference did not match");
                        return Ok(None);
                    };
                    // Always move at least one token forward, even after an empty sub-match.
                    let advance = sub.tokens.len().max(1);
                    tokens.extend(sub.tokens);
                    node.append(Item::Node(sub.value));
                    for _ in 0..advance {
                        cursor.consume();
                    }
                }
            }
        }

        Ok(Some(Parsed {
            tokens,
            value: rule.trigger(node),
        }))
    }
}

impl<N: Node> Clone for Grammar<N> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
            default_action: Arc::clone(&self.default_action),
            node_factory: Arc::clone(&self.node_factory),
            max_depth: self.max_depth,
        }
    }
}

impl<N: Node> fmt::Debug for Grammar<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("rules", &self.rules.values().collect::<Vec<_>>())
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, TokenError};
    use crate::grammar::node::Tree;
    use crate::grammar::rule::action;
    use pretty_assertions::assert_eq;

    fn grammar(rules: &[(&str, &[&str])]) -> Grammar {
        Grammar::from_rules(rules.iter().map(|(name, options)| (*name, *options))).unwrap()
    }

    fn tokens(parsed: &Parsed<Tree>) -> Vec<&str> {
        parsed.tokens.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_literal_match() {
        let g = grammar(&[("A", &["\"foo"])]);
        let parsed = g.parse(["foo"]).unwrap().unwrap();
        assert_eq!(tokens(&parsed), vec!["foo"]);
        assert_eq!(parsed.value, Tree::from(vec!["foo"]));

        assert_eq!(g.parse(["bar"]).unwrap(), None);
        assert_eq!(g.parse(Vec::<&str>::new()).unwrap(), None);
    }

    #[test]
    fn test_pattern_match() {
        let g = grammar(&[("A", &["/[0-9]+/"])]);
        assert_eq!(tokens(&g.parse(["42"]).unwrap().unwrap()), vec!["42"]);
        assert_eq!(g.parse(["4a"]).unwrap(), None);
    }

    #[test]
    fn test_pattern_matches_absent_token_vacuously() {
        let g = grammar(&[("A", &["/a*/"])]);
        let parsed = g.parse(Vec::<&str>::new()).unwrap().unwrap();
        assert!(parsed.tokens.is_empty());
        assert_eq!(parsed.value, Tree::List(vec![]));
    }

    #[test]
    fn test_reference_nests_results() {
        let g = grammar(&[("START", &["\"a B"]), ("B", &["\"b"])]);
        let parsed = g.parse("a b").unwrap().unwrap();
        assert_eq!(tokens(&parsed), vec!["a", "b"]);
        assert_eq!(
            parsed.value,
            Tree::List(vec![Tree::from("a"), Tree::from(vec!["b"])])
        );
    }

    #[test]
    fn test_second_option_after_first_fails() {
        let g = grammar(&[("R", &["\"x", "\"y"])]);
        let parsed = g.parse(["y"]).unwrap().unwrap();
        assert_eq!(tokens(&parsed), vec!["y"]);
    }

    #[test]
    fn test_failed_option_leaves_no_partial_matches() {
        let g = grammar(&[("R", &["\"a \"b", "\"a \"c"])]);
        let parsed = g.parse("a c").unwrap().unwrap();
        assert_eq!(tokens(&parsed), vec!["a", "c"]);
        assert_eq!(parsed.value, Tree::from(vec!["a", "c"]));
    }

    #[test]
    fn test_first_matching_option_wins() {
        // "x" alone is enough for the first option; the longer one is never tried
        let g = grammar(&[("R", &["\"x", "\"x \"y"])]);
        let parsed = g.parse("x y").unwrap().unwrap();
        assert_eq!(tokens(&parsed), vec!["x"]);
    }

    #[test]
    fn test_right_recursion_terminates() {
        let g = grammar(&[("R", &["\"x R", "\"x"])]);
        let parsed = g.parse("x x x").unwrap().unwrap();
        assert_eq!(tokens(&parsed), vec!["x", "x", "x"]);
        assert_eq!(
            parsed.value,
            Tree::List(vec![
                Tree::from("x"),
                Tree::List(vec![Tree::from("x"), Tree::from(vec!["x"])]),
            ])
        );
    }

    #[test]
    fn test_empty_option_matches_vacuously() {
        let g = grammar(&[("R", &["\"x", ""])]);
        let parsed = g.parse("x y z").unwrap().unwrap();
        assert!(parsed.tokens.is_empty());
        assert_eq!(parsed.value, Tree::List(vec![]));
    }

    #[test]
    fn test_unknown_reference_is_fatal() {
        let g = grammar(&[("R", &["MISSING", "\"x"])]);
        let err = g.parse(["x"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownRule);
    }

    #[test]
    fn test_unreached_unknown_reference_is_harmless() {
        let g = grammar(&[("R", &["\"a MISSING", "\"x"])]);
        assert!(g.parse(["x"]).unwrap().is_some());
    }

    #[test]
    fn test_empty_ruleset() {
        let g: Grammar = Grammar::new();
        let err = g.parse("anything").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::Ruleset(RulesetError::EmptyRuleset)
        ));
    }

    #[test]
    fn test_empty_pattern_is_fatal_when_reached() {
        let g = grammar(&[("R", &["\"a //"])]);
        assert_eq!(g.parse(["b"]).unwrap(), None);
        assert!(matches!(
            g.parse(["a", "b"]).unwrap_err(),
            GrammarError::Token(TokenError::EmptyPattern { .. })
        ));
    }

    #[test]
    fn test_replacing_rule_keeps_entry_point() {
        let mut g = grammar(&[("A", &["\"a"]), ("B", &["\"b"])]);
        g.add_rule("A", "\"z").unwrap();

        assert_eq!(g.entry_rule().map(Rule::name), Some("A"));
        assert_eq!(g.parse(["a"]).unwrap(), None);
        assert!(g.parse(["z"]).unwrap().is_some());
    }

    #[test]
    fn test_replacing_rule_logs_below_warn() {
        use std::io;
        use std::sync::Mutex;

        #[derive(Clone, Default)]
        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Capture {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let mut g = grammar(&[("A", &["\"a"])]);
            g.add_rule("A", "\"b").unwrap();
        });

        assert!(capture.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_rule_name_is_rejected() {
        let mut g: Grammar = Grammar::new();
        let err = g.add_rule("", "\"a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Ruleset);
    }

    #[test]
    fn test_rules_snapshot_is_detached() {
        let mut g = grammar(&[("A", &["\"a B", "\"c"]), ("B", &["\"b"])]);
        let snapshot = g.rules();
        g.add_rule("A", "\"changed").unwrap();

        assert_eq!(snapshot["A"], vec![vec!["\"a", "B"], vec!["\"c"]]);
        assert_eq!(g.rules()["A"], vec![vec!["\"changed"]]);
        assert_eq!(
            snapshot.keys().collect::<Vec<_>>(),
            vec!["A", "B"]
        );
    }

    #[test]
    fn test_test_bypasses_entry_rule() {
        let g = grammar(&[("A", &["\"a"]), ("B", &["\"b"])]);
        assert_eq!(g.parse(["b"]).unwrap(), None);
        assert!(g.test("B", ["b"]).unwrap().is_some());
        assert_eq!(g.test("C", ["b"]).unwrap_err().kind(), ErrorKind::UnknownRule);
    }

    #[test]
    fn test_actions_apply_innermost_first() {
        let mut g: Grammar = Grammar::new();
        g.add_rule_with_action(
            "START",
            "\"a B",
            action(|node: ListNode, name: &str| {
                let mut items = vec![Tree::from(name)];
                items.extend(node.items().iter().cloned());
                Tree::List(items)
            }),
        )
        .unwrap();
        g.add_rule_with_action(
            "B",
            "\"b",
            action(|node: ListNode, name: &str| {
                Tree::from(format!("{name}:{}", node.into_output().tokens().join("")))
            }),
        )
        .unwrap();

        let parsed = g.parse("a b").unwrap().unwrap();
        assert_eq!(
            parsed.value,
            Tree::List(vec![Tree::from("START"), Tree::from("a"), Tree::from("B:b")])
        );
    }

    #[test]
    fn test_default_action_applies_to_new_rules() {
        let mut g: Grammar = Grammar::new()
            .with_default_action(action(|node: ListNode, _name: &str| {
                Tree::from(node.into_output().tokens().join("+"))
            }));
        g.add_rule("SUM", "/[0-9]/ \"+ /[0-9]/").unwrap();

        let parsed = g.parse("1 + 2").unwrap().unwrap();
        assert_eq!(parsed.value, Tree::from("1+++2"));
    }

    #[test]
    fn test_recursion_limit() {
        let g = grammar(&[("L", &["L \"x"])]).with_max_depth(16);
        let err = g.parse("x").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::RecursionLimit { ref rule, depth: 16 } if rule == "L"
        ));
    }

    #[test]
    fn test_default_depth_limit_on_a_small_thread_stack() {
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let g = grammar(&[("EXPR", &["EXPR \"+ /[0-9]/", "/[0-9]/"])]);
                g.parse("1 + 2").unwrap_err().kind()
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), ErrorKind::RecursionLimit);
    }

    #[test]
    fn test_parse_value() {
        let g = grammar(&[("A", &["\"a"])]);
        assert!(g.parse_value(serde_json::json!(["a"])).unwrap().is_some());
        assert_eq!(
            g.parse_value(serde_json::json!([1])).unwrap_err().kind(),
            ErrorKind::NonstringToken
        );
    }

    #[test]
    fn test_caller_cursor_is_untouched() {
        let g = grammar(&[("A", &["\"a \"b"])]);
        let stream = TokenStream::from_tokens(["a", "b"]);
        assert!(g.parse(&stream).unwrap().is_some());
        assert_eq!(stream.position(), 0);
    }

    #[test]
    fn test_concurrent_parses_share_one_grammar() {
        let g = grammar(&[("R", &["\"x R", "\"x"])]);
        std::thread::scope(|scope| {
            let handles: Vec<_> = (1..=4)
                .map(|n| {
                    let g = &g;
                    scope.spawn(move || g.parse(vec!["x"; n]).unwrap().unwrap().tokens.len())
                })
                .collect();
            let lengths: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert_eq!(lengths, vec![1, 2, 3, 4]);
        });
    }
}
