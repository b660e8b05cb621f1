//! Expression parsing for free-text `when` and `then` sections.
//!
//! Three shapes are handled:
//! - call expressions (`Add(2, 3)`) → positional argument text
//! - structured actions (`{function: Add, args: [...]}`) → argument values
//! - comparison expressions (`result == 5`, `err is not nil`) → operator,
//!   actual reference and coerced expected value
//!
//! ## Known limitation
//!
//! Call arguments are split on *every* comma between the first `(` and the
//! last `)`. Nested parentheses stay attached to their argument text, but a
//! nested call with its own commas (`f(g(1, 2), 3)`) splits into
//! `g(1`, `2)`, `3`. Callers that need exact arguments should use the
//! structured form.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::value::{coerce_literal, DynValue};

// ---------------------------------------------------------------------------
// Call expressions
// ---------------------------------------------------------------------------

/// Extract trimmed argument text from `name(arg1, arg2, ...)`.
///
/// Missing or empty parentheses yield no arguments.
pub fn parse_call_args(call: &str) -> Vec<String> {
    let (Some(start), Some(end)) = (call.find('('), call.rfind(')')) else {
        return Vec::new();
    };
    if end <= start {
        return Vec::new();
    }

    call[start + 1..end]
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Structured actions
// ---------------------------------------------------------------------------

/// The `action` of a simplified case: free text, a structured map, or
/// something unusable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAction {
    Call(String),
    Structured(StructuredAction),
    Other(DynValue),
}

/// `{function: "Add", args: [...] | {...}, order: [...]}`
///
/// Decodes from maps only; a list action is unusable, not positional fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<StructuredArgs>,
    /// Explicit positional order for named `args`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,
}

#[derive(Deserialize)]
struct StructuredFields {
    #[serde(default, alias = "call")]
    function: Option<String>,
    #[serde(default)]
    args: Option<StructuredArgs>,
    #[serde(default)]
    order: Vec<String>,
}

impl<'de> Deserialize<'de> for StructuredAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapOnly;

        impl<'de> Visitor<'de> for MapOnly {
            type Value = StructuredAction;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a structured action map")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                let fields =
                    StructuredFields::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(StructuredAction {
                    function: fields.function,
                    args: fields.args,
                    order: fields.order,
                })
            }
        }

        deserializer.deserialize_map(MapOnly)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredArgs {
    Positional(Vec<DynValue>),
    Named(BTreeMap<String, DynValue>),
    /// `"a, b"`, split like the interior of a call expression.
    Text(String),
}

/// One argument extracted from an action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionArg {
    /// Argument by position. Text arguments are still uncoerced strings.
    Positional(DynValue),
    /// Argument supplied by name in a structured action.
    Named { name: String, value: DynValue },
}

/// Extract arguments from an action. Returns `None` for unusable shapes
/// (a bare number, a list, ...).
///
/// Named arguments follow `order` first; names `order` does not mention come
/// after it, sorted lexicographically, so the position of every argument is
/// deterministic.
pub fn action_args(action: &RawAction) -> Option<Vec<ActionArg>> {
    match action {
        RawAction::Call(text) => Some(text_args(&parse_call_args(text))),
        RawAction::Structured(structured) => Some(match &structured.args {
            None => Vec::new(),
            Some(StructuredArgs::Positional(values)) => values
                .iter()
                .cloned()
                .map(ActionArg::Positional)
                .collect(),
            Some(StructuredArgs::Named(named)) => named_args(named, &structured.order),
            Some(StructuredArgs::Text(text)) => text_args(&split_arg_list(text)),
        }),
        RawAction::Other(_) => None,
    }
}

fn text_args(pieces: &[String]) -> Vec<ActionArg> {
    pieces
        .iter()
        .map(|p| ActionArg::Positional(DynValue::String(p.clone())))
        .collect()
}

fn split_arg_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

fn named_args(named: &BTreeMap<String, DynValue>, order: &[String]) -> Vec<ActionArg> {
    let mut seen = BTreeSet::new();
    let mut names: Vec<&String> = order
        .iter()
        .filter(|name| named.contains_key(name.as_str()) && seen.insert(name.as_str()))
        .collect();
    names.extend(named.keys().filter(|name| !seen.contains(name.as_str())));

    names
        .into_iter()
        .map(|name| ActionArg::Named {
            name: name.clone(),
            value: named[name].clone(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Comparison expressions
// ---------------------------------------------------------------------------

/// Comparison operators, in match priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
    NotNil,
    Nil,
}

const PRIORITY: [ComparisonOp; 7] = [
    ComparisonOp::Equals,
    ComparisonOp::NotEquals,
    ComparisonOp::GreaterThan,
    ComparisonOp::LessThan,
    ComparisonOp::Contains,
    ComparisonOp::NotNil,
    ComparisonOp::Nil,
];

impl ComparisonOp {
    fn token(self) -> &'static str {
        match self {
            ComparisonOp::Equals => "==",
            ComparisonOp::NotEquals => "!=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::LessThan => "<",
            ComparisonOp::Contains => " contains ",
            ComparisonOp::NotNil => "is not nil",
            ComparisonOp::Nil => "is nil",
        }
    }

    /// Postfix operators take no right-hand side.
    fn is_postfix(self) -> bool {
        matches!(self, ComparisonOp::NotNil | ComparisonOp::Nil)
    }

    /// The IR assertion type this operator expresses.
    pub fn assertion_type(self) -> &'static str {
        match self {
            ComparisonOp::Equals => "equals",
            ComparisonOp::NotEquals => "not_equals",
            ComparisonOp::GreaterThan => "greater_than",
            ComparisonOp::LessThan => "less_than",
            ComparisonOp::Contains => "contains",
            ComparisonOp::NotNil => "not_nil",
            ComparisonOp::Nil => "nil",
        }
    }
}

/// A parsed `actual <op> expected` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub op: ComparisonOp,
    pub actual: String,
    pub expected: Option<DynValue>,
}

/// Parse a comparison expression.
///
/// Operators are tried in priority order (`==`, `!=`, `>`, `<`, ` contains `,
/// `is not nil`, `is nil`); occurrences inside quotes or brackets do not
/// count. The first operator that splits the text into two non-empty sides
/// wins. An operator occurring more than once at top level makes the whole
/// expression unparseable (`None`) rather than guessing a split.
pub fn parse_comparison(expr: &str) -> Option<Comparison> {
    let expr = expr.trim();
    let quote_aware = quotes_balanced(expr);

    for op in PRIORITY {
        let positions = top_level_positions(expr, op, quote_aware);
        match positions.as_slice() {
            [] => continue,
            [at] => {
                let actual = expr[..*at].trim();
                let rest = expr[at + op.token().len()..].trim();
                if actual.is_empty() {
                    continue;
                }
                if op.is_postfix() {
                    if rest.is_empty() {
                        return Some(Comparison {
                            op,
                            actual: actual.to_string(),
                            expected: None,
                        });
                    }
                } else if !rest.is_empty() {
                    return Some(Comparison {
                        op,
                        actual: actual.to_string(),
                        expected: Some(coerce_literal(rest)),
                    });
                }
            }
            _ => return None,
        }
    }
    None
}

/// Byte offsets of `op` outside quotes and brackets.
fn top_level_positions(expr: &str, op: ComparisonOp, quote_aware: bool) -> Vec<usize> {
    let bytes = expr.as_bytes();
    let token = op.token().as_bytes();
    let mut positions = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' | b'\'' if quote_aware => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {
                if depth == 0 && bytes[i..].starts_with(token) && operator_fits(bytes, i, op) {
                    positions.push(i);
                }
            }
        }
        i += 1;
    }
    positions
}

/// Context rules around a candidate operator match.
fn operator_fits(bytes: &[u8], at: usize, op: ComparisonOp) -> bool {
    match op {
        // `>=` and `<=` are not supported comparisons
        ComparisonOp::GreaterThan | ComparisonOp::LessThan => bytes.get(at + 1) != Some(&b'='),
        // `is nil` must start a word: `this nil` is not `th` + `is nil`
        ComparisonOp::NotNil | ComparisonOp::Nil => {
            at == 0 || bytes[at - 1].is_ascii_whitespace()
        }
        _ => true,
    }
}

fn quotes_balanced(expr: &str) -> bool {
    let count = |q: char| expr.chars().filter(|c| *c == q).count();
    count('"') % 2 == 0 && count('\'') % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn positional(values: &[&str]) -> Vec<ActionArg> {
        values
            .iter()
            .map(|v| ActionArg::Positional(DynValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_parse_call_args() {
        let cases: &[(&str, &[&str])] = &[
            ("Add(2, 3)", &["2", "3"]),
            ("Add(a, b)", &["a", "b"]),
            ("Func()", &[]),
            ("Func", &[]),
            ("Func(  single  )", &["single"]),
            ("Concat(\"hello\", \"world\")", &["\"hello\"", "\"world\""]),
            ("Broken)(", &[]),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_call_args(input), *expected, "input {input:?}");
        }
    }

    #[test]
    fn test_parse_call_args_nested_commas_split() {
        // Documented limitation: commas inside a nested call are not protected.
        assert_eq!(parse_call_args("f(g(1, 2), 3)"), vec!["g(1", "2)", "3"]);
        assert_eq!(parse_call_args("f(g(x), 3)"), vec!["g(x)", "3"]);
    }

    #[test]
    fn test_action_args_text_is_uncoerced() {
        let action = RawAction::Call("Add(10, 20)".into());
        assert_eq!(action_args(&action), Some(positional(&["10", "20"])));
    }

    #[test]
    fn test_action_args_structured_list() {
        let action: RawAction =
            serde_json::from_value(json!({"function": "Add", "args": [5, 6]})).unwrap();
        assert_eq!(
            action_args(&action),
            Some(vec![
                ActionArg::Positional(DynValue::Int(5)),
                ActionArg::Positional(DynValue::Int(6)),
            ])
        );
    }

    #[test]
    fn test_action_args_named_sorted_without_order() {
        let action: RawAction =
            serde_json::from_value(json!({"args": {"b": 2, "a": 1}})).unwrap();
        assert_eq!(
            action_args(&action),
            Some(vec![
                ActionArg::Named {
                    name: "a".into(),
                    value: DynValue::Int(1)
                },
                ActionArg::Named {
                    name: "b".into(),
                    value: DynValue::Int(2)
                },
            ])
        );
    }

    #[test]
    fn test_action_args_named_follow_explicit_order() {
        let action: RawAction = serde_json::from_value(json!({
            "args": {"a": 1, "b": 2, "c": 3},
            "order": ["c", "missing", "a", "c"]
        }))
        .unwrap();
        let names: Vec<String> = action_args(&action)
            .unwrap()
            .into_iter()
            .map(|arg| match arg {
                ActionArg::Named { name, .. } => name,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_action_args_unusable_shape() {
        let action: RawAction = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(action, RawAction::Other(DynValue::Int(42)));
        assert_eq!(action_args(&action), None);
    }

    #[test]
    fn test_action_args_list_is_unusable() {
        for value in [json!(["Add", [1, 2]]), json!(["Add"]), json!(["a", "b"])] {
            let action: RawAction = serde_json::from_value(value.clone()).unwrap();
            assert!(matches!(action, RawAction::Other(_)), "{value}");
            assert_eq!(action_args(&action), None, "{value}");
        }
    }

    #[test]
    fn test_structured_action_rejects_sequence() {
        assert!(serde_json::from_value::<StructuredAction>(json!(["Add", "x"])).is_err());
        let action: StructuredAction =
            serde_json::from_value(json!({"call": "Add", "args": "a, b"})).unwrap();
        assert_eq!(action.function.as_deref(), Some("Add"));
        assert_eq!(action.args, Some(StructuredArgs::Text("a, b".into())));
    }

    #[test]
    fn test_parse_comparison_operators() {
        let cases = [
            ("result == 5", ComparisonOp::Equals, "result", Some(DynValue::Int(5))),
            ("result != \"x\"", ComparisonOp::NotEquals, "result", Some(DynValue::from("x"))),
            ("len(result) > 2", ComparisonOp::GreaterThan, "len(result)", Some(DynValue::Int(2))),
            ("result < 1.5", ComparisonOp::LessThan, "result", Some(DynValue::Float(1.5))),
            ("result contains abc", ComparisonOp::Contains, "result", Some(DynValue::from("abc"))),
            ("error is not nil", ComparisonOp::NotNil, "error", None),
            ("error is nil", ComparisonOp::Nil, "error", None),
        ];
        for (input, op, actual, expected) in cases {
            let parsed = parse_comparison(input).unwrap_or_else(|| panic!("{input:?}"));
            assert_eq!(parsed.op, op, "input {input:?}");
            assert_eq!(parsed.actual, actual, "input {input:?}");
            assert_eq!(parsed.expected, expected, "input {input:?}");
        }
    }

    #[test]
    fn test_parse_comparison_repeated_operator_is_unparseable() {
        assert_eq!(parse_comparison("a == b == c"), None);
    }

    #[test]
    fn test_parse_comparison_ignores_quoted_and_nested_operators() {
        let parsed = parse_comparison("result == \"a == b\"").unwrap();
        assert_eq!(parsed.expected, Some(DynValue::from("a == b")));

        let parsed = parse_comparison("f(a > b) == true").unwrap();
        assert_eq!(parsed.op, ComparisonOp::Equals);
        assert_eq!(parsed.actual, "f(a > b)");
        assert_eq!(parsed.expected, Some(DynValue::Bool(true)));
    }

    #[test]
    fn test_parse_comparison_rejects_or_equal_forms() {
        assert_eq!(parse_comparison("result >= 5"), None);
        assert_eq!(parse_comparison("result <= 5"), None);
    }

    #[test]
    fn test_parse_comparison_needs_both_sides() {
        assert_eq!(parse_comparison("== 5"), None);
        assert_eq!(parse_comparison("result =="), None);
        assert_eq!(parse_comparison("is nil"), None);
        assert_eq!(parse_comparison("just text"), None);
        assert_eq!(parse_comparison("this nil"), None);
    }

    #[test]
    fn test_parse_comparison_unbalanced_quote_still_parses() {
        let parsed = parse_comparison("user's age == 30").unwrap();
        assert_eq!(parsed.actual, "user's age");
        assert_eq!(parsed.expected, Some(DynValue::Int(30)));
    }
}
