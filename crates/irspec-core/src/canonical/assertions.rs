//! Assertion extraction for the simplified case format.
//!
//! Produces IR assertions so both formats share one lexicon mapping. When
//! nothing usable is found the caller falls back to `not_nil result`.

use std::collections::BTreeMap;

use crate::expr::parse_comparison;
use crate::ir::IRAssertion;
use crate::resolver::AssertionPayload;
use crate::value::DynValue;

const RESULT: &str = "result";

/// Map keys with a dedicated meaning; every other key asserts equality on
/// itself.
const RESERVED_KEYS: &[&str] = &["result", "expect", "error", "contains", "type"];

/// Assertions carried by a payload, in a deterministic order.
pub(crate) fn extract(payload: &AssertionPayload) -> Vec<IRAssertion> {
    let mut out = Vec::new();
    match payload {
        AssertionPayload::Text(text) => push_expression(text, &mut out),
        AssertionPayload::Map(map) => push_map(map, &mut out),
        AssertionPayload::List(items) => {
            for item in items {
                match item {
                    DynValue::String(text) => push_expression(text, &mut out),
                    DynValue::Map(map) => push_map(map, &mut out),
                    other => out.push(equals_result(other.clone())),
                }
            }
        }
        AssertionPayload::Scalar(value) => out.push(equals_result(value.clone())),
    }
    out
}

/// The assertion emitted when a case supplies nothing parseable.
pub(crate) fn fallback() -> IRAssertion {
    IRAssertion::new("not_nil", RESULT, None)
}

fn equals_result(expected: DynValue) -> IRAssertion {
    IRAssertion::new("equals", RESULT, Some(expected))
}

/// `result == 5`; unparseable text is kept verbatim as the expected value.
fn push_expression(text: &str, out: &mut Vec<IRAssertion>) {
    match parse_comparison(text) {
        Some(cmp) => out.push(IRAssertion::new(
            cmp.op.assertion_type(),
            &cmp.actual,
            cmp.expected,
        )),
        None => {
            tracing::debug!(expression = %text, "unparseable assertion kept as literal");
            out.push(equals_result(DynValue::String(text.to_string())));
        }
    }
}

fn push_map(map: &BTreeMap<String, DynValue>, out: &mut Vec<IRAssertion>) {
    if let Some(value) = map.get("result") {
        out.push(equals_result(value.clone()));
    }

    if let Some(DynValue::String(text)) = map.get("expect") {
        push_expression(text, out);
    }

    match map.get("error") {
        Some(DynValue::Bool(true)) => out.push(IRAssertion::new("not_nil", "error", None)),
        Some(DynValue::String(text)) => out.push(IRAssertion::new(
            "contains",
            "error",
            Some(DynValue::String(text.clone())),
        )),
        _ => {}
    }

    if let Some(value) = map.get("contains") {
        out.push(IRAssertion::new("contains", RESULT, Some(value.clone())));
    }

    if let Some(value) = map.get("type") {
        out.push(IRAssertion::new("type_is", RESULT, Some(value.clone())));
    }

    // BTreeMap iteration keeps property assertions sorted by key
    for (key, value) in map {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        out.push(IRAssertion::new("equals", key, Some(value.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> AssertionPayload {
        serde_json::from_value(value).unwrap()
    }

    fn summary(assertions: &[IRAssertion]) -> Vec<(String, String, Option<DynValue>)> {
        assertions
            .iter()
            .map(|a| (a.assertion_type.clone(), a.actual.clone(), a.expected.clone()))
            .collect()
    }

    #[test]
    fn test_text_payload() {
        let got = extract(&payload(json!("result == 5")));
        assert_eq!(
            summary(&got),
            vec![("equals".into(), "result".into(), Some(DynValue::Int(5)))]
        );
    }

    #[test]
    fn test_unparseable_text_is_literal() {
        let got = extract(&payload(json!("a == b == c")));
        assert_eq!(
            summary(&got),
            vec![(
                "equals".into(),
                "result".into(),
                Some(DynValue::String("a == b == c".into()))
            )]
        );
    }

    #[test]
    fn test_map_payload() {
        let got = extract(&payload(json!({
            "status": 200,
            "result": 5,
            "error": true,
            "length": 3,
            "contains": "ok",
            "type": "string",
            "expect": "err is nil"
        })));
        assert_eq!(
            summary(&got),
            vec![
                ("equals".into(), "result".into(), Some(DynValue::Int(5))),
                ("nil".into(), "err".into(), None),
                ("not_nil".into(), "error".into(), None),
                ("contains".into(), "result".into(), Some(DynValue::String("ok".into()))),
                ("type_is".into(), "result".into(), Some(DynValue::String("string".into()))),
                ("equals".into(), "length".into(), Some(DynValue::Int(3))),
                ("equals".into(), "status".into(), Some(DynValue::Int(200))),
            ]
        );
    }

    #[test]
    fn test_error_message_and_false() {
        let got = extract(&payload(json!({"error": "division by zero"})));
        assert_eq!(
            summary(&got),
            vec![(
                "contains".into(),
                "error".into(),
                Some(DynValue::String("division by zero".into()))
            )]
        );
        assert!(extract(&payload(json!({"error": false}))).is_empty());
    }

    #[test]
    fn test_list_payload() {
        let got = extract(&payload(json!([{"result": 1}, "err is not nil", 7])));
        assert_eq!(
            summary(&got),
            vec![
                ("equals".into(), "result".into(), Some(DynValue::Int(1))),
                ("not_nil".into(), "err".into(), None),
                ("equals".into(), "result".into(), Some(DynValue::Int(7))),
            ]
        );
    }

    #[test]
    fn test_scalar_payload() {
        let got = extract(&payload(json!(true)));
        assert_eq!(
            summary(&got),
            vec![("equals".into(), "result".into(), Some(DynValue::Bool(true)))]
        );
    }
}
