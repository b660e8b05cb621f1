//! Property-based negative tests for malformed generator output.
//!
//! The pipeline must **never panic**: every input either ingests or returns
//! an `IngestError` with a non-empty message. Inputs range from arbitrary
//! text to structurally valid JSON carrying the wrong shapes in every slot.

use irspec_core::expr::{parse_call_args, parse_comparison};
use irspec_core::{coerce_literal, ingest, parse_and_validate, IngestOptions, Target};
use proptest::prelude::*;
use serde_json::{json, Value};

fn target() -> Target {
    Target::function("F")
}

// ===========================================================================
// 1. Deterministic negative tests
// ===========================================================================

#[test]
fn malformed_tests_as_string() {
    let doc = json!({"function_name": "F", "tests": "not_a_list"});
    let _ = ingest(&doc.to_string(), &target(), &IngestOptions::default());
}

#[test]
fn malformed_given_as_object() {
    let doc = json!({
        "function_name": "F",
        "tests": [{"name": "t", "given": {"a": 1}, "when": "F()", "then": []}]
    });
    let _ = ingest(&doc.to_string(), &target(), &IngestOptions::default());
}

#[test]
fn malformed_unterminated_fence() {
    let _ = ingest("```json\n{\"function_name\": \"F\"", &target(), &IngestOptions::default());
}

#[test]
fn malformed_only_fence() {
    let err = ingest("```", &target(), &IngestOptions::default()).unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn malformed_multibyte_excerpt() {
    let text = "ü".repeat(1000) + " [[[";
    let err = ingest(&text, &target(), &IngestOptions::default()).unwrap_err();
    assert!(err.to_string().contains("truncated"));
}

// ===========================================================================
// 2. Property tests
// ===========================================================================

fn arb_json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::from),
        "[a-z$(){} ,=<>!\"]{0,12}".prop_map(Value::from),
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    arb_json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map(
                prop_oneof![
                    Just("function_name".to_string()),
                    Just("name".to_string()),
                    Just("tests".to_string()),
                    Just("given".to_string()),
                    Just("when".to_string()),
                    Just("then".to_string()),
                    Just("action".to_string()),
                    Just("setup".to_string()),
                    Just("assertions".to_string()),
                    Just("args".to_string()),
                    "[a-z]{1,6}",
                ],
                inner,
                0..5,
            )
            .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, ..Default::default() })]

    /// Property: arbitrary text never panics the pipeline.
    #[test]
    fn ingest_no_panic_on_text(text in ".{0,200}") {
        let options = IngestOptions::default();
        if let Err(err) = ingest(&text, &target(), &options) {
            prop_assert!(!err.to_string().is_empty());
        }
        let _ = parse_and_validate(&text, &options);
    }

    /// Property: structurally valid JSON of the wrong shape never panics.
    #[test]
    fn ingest_no_panic_on_json(doc in arb_json()) {
        let options = IngestOptions::default();
        let _ = ingest(&doc.to_string(), &target(), &options);
        let _ = parse_and_validate(&doc.to_string(), &options);
    }

    /// Property: the excerpt carried by parse diagnostics stays bounded.
    #[test]
    fn malformed_excerpt_is_bounded(text in "[\\[{]{1,3}.{0,600}") {
        let options = IngestOptions::default();
        if let Err(irspec_core::IngestError::MalformedSpecification { excerpt, .. }) =
            ingest(&text, &target(), &options)
        {
            prop_assert!(excerpt.chars().count() <= options.excerpt_len + "... (truncated)".len());
        }
    }

    /// Property: expression helpers accept any text.
    #[test]
    fn expression_helpers_no_panic(text in ".{0,80}") {
        let _ = parse_call_args(&text);
        let _ = parse_comparison(&text);
        let _ = coerce_literal(&text);
    }
}
