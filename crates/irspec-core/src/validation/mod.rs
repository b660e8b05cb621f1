//! Semantic validation of a resolved test suite.
//!
//! A single linear walk over suite → cases → given/when/then. Every check is
//! independent and a failing case never stops the walk, so one pass reports
//! every defect. Errors make the suite unusable; warnings are advisory.
//!
//! | Check | Severity |
//! |-------|----------|
//! | `function_name` missing or containing whitespace | error |
//! | `function_name` unusually long | warning |
//! | `tests` empty | error |
//! | case `name` missing | error |
//! | case `name` repeated | warning |
//! | variable name missing or repeated within a case | error |
//! | variable name not an identifier | warning |
//! | type hint missing | warning |
//! | type hint unknown | error |
//! | value disagrees with its type hint | warning |
//! | `when.call` missing | error |
//! | `when.args` entry not declared in `given` | error |
//! | `$name` in `when.call` not declared, or not passed in `args` | warning |
//! | `then` empty | error |
//! | assertion type missing or unknown, `actual` missing | error |
//! | comparison assertion without `expected` | error |

mod result;

use std::collections::HashSet;

use crate::binding::{is_valid_identifier, scan_references, Binding, Environment};
use crate::config::IngestOptions;
use crate::ir::{IRAction, IRAssertion, IRTestCase, IRTestSuite, IRVariable};
use crate::value::{DynValue, ValueKind};

pub use result::{ValidationError, ValidationResult};

/// Validate a suite against the structural and referential rules.
pub fn validate(suite: &IRTestSuite, options: &IngestOptions) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_function_name(&suite.function_name, options, &mut result);

    if suite.tests.is_empty() {
        result.error("tests", "at least one test case is required");
    }

    let mut seen_names = HashSet::new();
    for (i, case) in suite.tests.iter().enumerate() {
        let prefix = format!("tests[{i}]");
        check_case(case, &prefix, options, &mut seen_names, &mut result);
    }

    tracing::debug!(
        function = %suite.function_name,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "validated suite"
    );
    result
}

fn check_function_name(name: &str, options: &IngestOptions, result: &mut ValidationResult) {
    if name.is_empty() {
        result.error("function_name", "function_name is required");
        return;
    }
    if name.chars().any(char::is_whitespace) {
        result.error_with("function_name", "function_name contains whitespace", name);
    }
    if name.chars().count() > options.max_function_name_len {
        result.warning("function_name", "function_name is unusually long");
    }
}

fn check_case<'a>(
    case: &'a IRTestCase,
    prefix: &str,
    options: &IngestOptions,
    seen_names: &mut HashSet<&'a str>,
    result: &mut ValidationResult,
) {
    if case.name.is_empty() {
        result.error(format!("{prefix}/name"), "test name is required");
    } else if !seen_names.insert(case.name.as_str()) {
        result.warning_with(format!("{prefix}/name"), "duplicate test name", &case.name);
    }

    check_given(&case.given, prefix, options, result);

    let env = Environment::from_given(&case.given);
    check_when(&case.when, &env, prefix, result);
    check_then(&case.then, prefix, options, result);
}

// ---------------------------------------------------------------------------
// Given
// ---------------------------------------------------------------------------

fn check_given(
    given: &[IRVariable],
    prefix: &str,
    options: &IngestOptions,
    result: &mut ValidationResult,
) {
    let mut seen = HashSet::new();

    for (i, var) in given.iter().enumerate() {
        let path = format!("{prefix}/given[{i}]");

        if var.name.is_empty() {
            result.error(format!("{path}/name"), "variable name is required");
            continue;
        }
        if !seen.insert(var.name.as_str()) {
            result.error_with(format!("{path}/name"), "duplicate variable name", &var.name);
        }
        if !is_valid_identifier(&var.name) {
            result.warning_with(
                format!("{path}/name"),
                "variable name may not be a valid identifier",
                &var.name,
            );
        }

        match var.type_hint.as_deref().filter(|h| !h.is_empty()) {
            None => result.warning(format!("{path}/type"), "type hint is recommended"),
            Some(hint) if !options.is_known_type_hint(hint) => {
                result.error_with(format!("{path}/type"), "invalid type hint", hint);
            }
            Some(hint) => check_value_type(var.value.as_ref(), hint, &path, result),
        }
    }
}

/// Compare a value's shape with its (advisory) type hint.
fn check_value_type(
    value: Option<&DynValue>,
    hint: &str,
    path: &str,
    result: &mut ValidationResult,
) {
    let value_path = format!("{path}/value");

    let value = match value {
        Some(v) if !v.is_null() => v,
        _ => {
            if hint != "null" {
                result.warning_with(value_path, "null value with non-null type hint", hint);
            }
            return;
        }
    };

    let matches = match hint {
        "int" => {
            if matches!(value, DynValue::Float(_)) && !value.is_whole_number() {
                result.warning(value_path, "float value with int type hint");
                return;
            }
            value.is_whole_number()
        }
        "float" => value.is_number(),
        "string" => value.kind() == ValueKind::String,
        "bool" => value.kind() == ValueKind::Bool,
        "array" => value.kind() == ValueKind::Array,
        "object" => value.kind() == ValueKind::Object,
        "null" => {
            result.warning(value_path, "non-null value with null type hint");
            return;
        }
        // `function` and custom hints carry no shape
        _ => true,
    };

    if !matches {
        result.warning_with(
            value_path,
            format!("value doesn't match {hint} type hint"),
            value.kind().type_hint(),
        );
    }
}

// ---------------------------------------------------------------------------
// When
// ---------------------------------------------------------------------------

fn check_when(action: &IRAction, env: &Environment<'_>, prefix: &str, result: &mut ValidationResult) {
    let path = format!("{prefix}/when");

    if action.call.trim().is_empty() {
        result.error(format!("{path}/call"), "function call is required");
    }

    let mut passed = HashSet::new();
    for (i, arg) in action.args.iter().enumerate() {
        match env.resolve(arg) {
            Binding::Bound { name, .. } => {
                passed.insert(name);
            }
            Binding::Unbound(token) => {
                result.error_with(
                    format!("{path}/args[{i}]"),
                    "references undefined variable",
                    token,
                );
            }
        }
    }

    // `call` is documentation; `args` decides what is passed.
    for name in scan_references(&action.call) {
        if !env.contains(name) {
            result.warning_with(
                format!("{path}/call"),
                "references variable not in given section",
                format!("${name}"),
            );
        } else if !action.args.is_empty() && !passed.contains(name) {
            result.warning_with(
                format!("{path}/call"),
                "references variable not listed in args",
                format!("${name}"),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Then
// ---------------------------------------------------------------------------

fn check_then(
    then: &[IRAssertion],
    prefix: &str,
    options: &IngestOptions,
    result: &mut ValidationResult,
) {
    if then.is_empty() {
        result.error(format!("{prefix}/then"), "at least one assertion is required");
        return;
    }

    for (i, assertion) in then.iter().enumerate() {
        let path = format!("{prefix}/then[{i}]");
        let kind = assertion.assertion_type.as_str();

        if kind.is_empty() {
            result.error(format!("{path}/type"), "assertion type is required");
        } else if !options.is_known_assertion(kind) {
            result.error_with(format!("{path}/type"), "invalid assertion type", kind);
        }

        if assertion.actual.trim().is_empty() {
            result.error(format!("{path}/actual"), "actual value reference is required");
        }

        if options.requires_expected(kind) && assertion.expected.is_none() {
            result.error(
                format!("{path}/expected"),
                format!("expected value is required for {kind}"),
            );
        }
    }
}
