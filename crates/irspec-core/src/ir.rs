//! Intermediate representation of a generated test suite.
//!
//! This is the canonical Given/When/Then document a model is asked to emit.
//! Every field is defaulted on decode so that missing sections surface as
//! validation errors with a precise path instead of an opaque parse failure.

use serde::{Deserialize, Serialize};

use crate::value::DynValue;

/// A collection of test cases for one function.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IRTestSuite {
    #[serde(default)]
    pub function_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tests: Vec<IRTestCase>,
}

/// One test case in Given/When/Then form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IRTestCase {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Setup variables.
    #[serde(default)]
    pub given: Vec<IRVariable>,
    /// The action under test.
    #[serde(default)]
    pub when: IRAction,
    /// Expected outcomes.
    #[serde(default)]
    pub then: Vec<IRAssertion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A setup variable with an optional type hint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IRVariable {
    #[serde(default)]
    pub name: String,
    /// `null` and an absent value are the same thing here.
    #[serde(default)]
    pub value: Option<DynValue>,
    /// Language-agnostic hint: `int`, `float`, `string`, `bool`, `null`,
    /// `array`, `object` (or anything else the options allow).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
}

impl IRVariable {
    pub fn new(name: impl Into<String>, value: impl Into<DynValue>, type_hint: &str) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            type_hint: Some(type_hint.to_string()),
        }
    }
}

/// The invocation under test.
///
/// `call` is a display string that may reference variables as `$name`;
/// `args` is the authoritative, ordered list of variable names to pass.
/// A bare string in place of the object is read as `call` with no `args`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ActionRepr")]
pub struct IRAction {
    pub call: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActionRepr {
    Call(String),
    Full {
        #[serde(default)]
        call: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl From<ActionRepr> for IRAction {
    fn from(repr: ActionRepr) -> Self {
        match repr {
            ActionRepr::Call(call) => IRAction {
                call,
                args: Vec::new(),
            },
            ActionRepr::Full { call, args } => IRAction { call, args },
        }
    }
}

/// An expected outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IRAssertion {
    /// Assertion kind (`equals`, `not_nil`, ...).
    #[serde(default, rename = "type")]
    pub assertion_type: String,
    /// What is checked: `result`, `result.field`, `error`.
    #[serde(default)]
    pub actual: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<DynValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl IRAssertion {
    pub fn new(assertion_type: &str, actual: &str, expected: Option<DynValue>) -> Self {
        Self {
            assertion_type: assertion_type.to_string(),
            actual: actual.to_string(),
            expected,
            message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_suite() {
        let suite: IRTestSuite = serde_json::from_value(json!({
            "function_name": "Add",
            "tests": [{
                "name": "t1",
                "given": [{"name": "a", "value": 5, "type": "int"}],
                "when": {"call": "Add($a)", "args": ["a"]},
                "then": [{"type": "equals", "actual": "result", "expected": 5}],
                "tags": ["happy_path"]
            }]
        }))
        .unwrap();

        let case = &suite.tests[0];
        assert_eq!(case.given[0], IRVariable::new("a", 5i64, "int"));
        assert_eq!(case.when.args, vec!["a"]);
        assert_eq!(case.then[0].assertion_type, "equals");
        assert_eq!(case.then[0].expected, Some(DynValue::Int(5)));
    }

    #[test]
    fn test_missing_sections_default() {
        let case: IRTestCase = serde_json::from_value(json!({"name": "bare"})).unwrap();
        assert!(case.given.is_empty());
        assert!(case.then.is_empty());
        assert_eq!(case.when, IRAction::default());
    }

    #[test]
    fn test_null_value_reads_as_absent() {
        let var: IRVariable =
            serde_json::from_value(json!({"name": "p", "value": null, "type": "null"})).unwrap();
        assert_eq!(var.value, None);
    }

    #[test]
    fn test_string_action_is_call() {
        let case: IRTestCase =
            serde_json::from_value(json!({"name": "s", "when": "Reset()"})).unwrap();
        assert_eq!(case.when.call, "Reset()");
        assert!(case.when.args.is_empty());
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let assertion = IRAssertion::new("equals", "result", Some(DynValue::Int(8)));
        assert_eq!(
            serde_json::to_value(&assertion).unwrap(),
            json!({"type": "equals", "actual": "result", "expected": 8})
        );
    }
}
