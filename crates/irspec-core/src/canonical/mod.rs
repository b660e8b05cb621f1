//! Canonicalization: projects resolved cases into emitter-facing [`TestSpec`]s.
//!
//! Both formats converge here:
//!
//! - canonical suites, already validated, are projected field by field
//! - simplified cases skip strict validation and are converted leniently,
//!   with argument binding and assertion extraction filling in structure the
//!   generator left implicit
//!
//! A case that cannot be converted is logged and skipped; conversion fails
//! only when no case survives.

mod assertions;
mod spec;

use std::collections::BTreeMap;

use crate::binding::{reference_name, Binding, Environment};
use crate::config::IngestOptions;
use crate::error::IngestError;
use crate::expr::{action_args, ActionArg};
use crate::ir::{IRAssertion, IRTestCase, IRTestSuite};
use crate::resolver::SimpleCase;
use crate::value::{coerce_literal, DynValue};

pub use spec::{Assertion, Target, TestLevel, TestSpec, DEFAULT_PRIORITY, TARGET_KIND_FUNCTION};

/// Convert every case of a validated suite.
///
/// The suite's `function_name` wins over the target's; the target supplies
/// the name for lone cases that carried none.
pub fn canonicalize(
    suite: &IRTestSuite,
    target: &Target,
    options: &IngestOptions,
) -> Result<Vec<TestSpec>, IngestError> {
    let function_name = if suite.function_name.is_empty() {
        target.function_name.as_str()
    } else {
        suite.function_name.as_str()
    };
    let ctx = SpecContext {
        target,
        function_name,
        options,
    };

    collect(
        &suite.tests,
        |case| case.name.as_str(),
        |case| convert_ir_case(case, &ctx),
    )
}

/// Convert simplified cases. No strict validation happens on this path.
pub fn canonicalize_simple(
    cases: &[SimpleCase],
    target: &Target,
    options: &IngestOptions,
) -> Result<Vec<TestSpec>, IngestError> {
    let ctx = SpecContext {
        target,
        function_name: &target.function_name,
        options,
    };

    collect(
        cases,
        |case| case.name.as_str(),
        |case| convert_simple_case(case, &ctx),
    )
}

/// Turn a case name into a readable description:
/// `add_positive_numbers` → `Add positive numbers`.
pub fn format_test_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

struct SpecContext<'a> {
    target: &'a Target,
    function_name: &'a str,
    options: &'a IngestOptions,
}

impl SpecContext<'_> {
    fn spec(&self, description: String) -> TestSpec {
        TestSpec {
            id: uuid::Uuid::new_v4().to_string(),
            level: self.target.level,
            target_kind: TARGET_KIND_FUNCTION.to_string(),
            target_id: self.function_name.to_string(),
            function_name: self.function_name.to_string(),
            file_path: self.target.file_path.clone(),
            description,
            inputs: BTreeMap::new(),
            input_types: BTreeMap::new(),
            arg_order: Vec::new(),
            assertions: Vec::new(),
            tags: Vec::new(),
            priority: DEFAULT_PRIORITY.to_string(),
        }
    }

    fn assertion(&self, ir: &IRAssertion) -> Assertion {
        Assertion {
            kind: self
                .options
                .assertion_kind(&ir.assertion_type)
                .to_string(),
            actual: ir.actual.clone(),
            expected: ir.expected.clone(),
            message: ir.message.clone(),
        }
    }
}

fn collect<T>(
    cases: &[T],
    name_of: impl Fn(&T) -> &str,
    convert: impl Fn(&T) -> Result<TestSpec, String>,
) -> Result<Vec<TestSpec>, IngestError> {
    let mut specs = Vec::with_capacity(cases.len());
    let mut skipped = 0;

    for (index, case) in cases.iter().enumerate() {
        match convert(case) {
            Ok(spec) => specs.push(spec),
            Err(reason) => {
                let err = IngestError::ConversionSkipped {
                    index,
                    name: name_of(case).to_string(),
                    reason,
                };
                tracing::warn!(error = %err, "skipping test case");
                skipped += 1;
            }
        }
    }

    if specs.is_empty() {
        return Err(IngestError::NoCasesConverted { skipped });
    }
    tracing::debug!(converted = specs.len(), skipped, "canonicalized cases");
    Ok(specs)
}

fn description_for(description: Option<&str>, name: &str) -> String {
    match description.map(str::trim).filter(|d| !d.is_empty()) {
        Some(d) => d.to_string(),
        None => format_test_name(name),
    }
}

// ---------------------------------------------------------------------------
// Canonical cases
// ---------------------------------------------------------------------------

fn convert_ir_case(case: &IRTestCase, ctx: &SpecContext<'_>) -> Result<TestSpec, String> {
    let mut spec = ctx.spec(description_for(case.description.as_deref(), &case.name));

    for var in &case.given {
        let value = var.value.clone().unwrap_or(DynValue::Null);
        if spec.inputs.insert(var.name.clone(), value).is_some() {
            return Err(format!("input '{}' declared twice", var.name));
        }
        if let Some(hint) = var.type_hint.as_deref().filter(|h| !h.is_empty()) {
            spec.input_types.insert(var.name.clone(), hint.to_string());
        }
    }

    for arg in &case.when.args {
        if !spec.inputs.contains_key(reference_name(arg)) {
            return Err(format!("argument '{arg}' has no matching input"));
        }
        spec.arg_order.push(arg.clone());
    }

    spec.assertions = case.then.iter().map(|a| ctx.assertion(a)).collect();
    spec.tags = case.tags.clone();
    Ok(spec)
}

// ---------------------------------------------------------------------------
// Simplified cases
// ---------------------------------------------------------------------------

fn convert_simple_case(case: &SimpleCase, ctx: &SpecContext<'_>) -> Result<TestSpec, String> {
    let mut spec = ctx.spec(description_for(case.description.as_deref(), &case.name));
    spec.inputs = case.setup.clone();

    if let Some(action) = &case.action {
        let args = action_args(action)
            .ok_or("action is neither a call expression nor a structured call")?;
        let env = Environment::from_setup(&case.setup);

        for (i, arg) in args.into_iter().enumerate() {
            let name = match arg {
                ActionArg::Named { name, value } => {
                    spec.inputs.insert(name.clone(), value);
                    name
                }
                ActionArg::Positional(DynValue::String(text)) => match env.resolve(&text) {
                    Binding::Bound { name, .. } => name.to_string(),
                    Binding::Unbound(token) => {
                        insert_literal(&mut spec.inputs, i, coerce_literal(token))?
                    }
                },
                ActionArg::Positional(value) => insert_literal(&mut spec.inputs, i, value)?,
            };
            spec.arg_order.push(name);
        }
    }

    spec.input_types = spec
        .inputs
        .iter()
        .map(|(name, value)| (name.clone(), value.kind().type_hint().to_string()))
        .collect();

    let mut extracted = case.payload().map(assertions::extract).unwrap_or_default();
    if extracted.is_empty() {
        extracted.push(assertions::fallback());
    }
    spec.assertions = extracted.iter().map(|a| ctx.assertion(a)).collect();
    spec.tags = case.tags.clone();
    Ok(spec)
}

/// Store a literal argument as `arg{i}`.
fn insert_literal(
    inputs: &mut BTreeMap<String, DynValue>,
    index: usize,
    value: DynValue,
) -> Result<String, String> {
    let key = format!("arg{index}");
    if inputs.contains_key(&key) {
        return Err(format!("literal argument {index} collides with input '{key}'"));
    }
    inputs.insert(key.clone(), value);
    Ok(key)
}
