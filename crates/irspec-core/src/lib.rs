//! # irspec-core
//!
//! Ingest test specifications written by a text-generation model and turn
//! them into validated, canonical [`TestSpec`] records for code emitters.
//!
//! Generated output is loosely typed and rarely sticks to one schema, so the
//! pipeline discovers structure before trusting it:
//!
//! 1. **Resolve** ([`resolve_document`]): strip markdown fences, decode JSON
//!    or YAML, and accept the first matching document shape.
//! 2. **Validate** ([`validate`]): canonical Given/When/Then suites are
//!    checked for structural and referential defects. Errors reject the
//!    suite; warnings are advisory.
//! 3. **Canonicalize** ([`canonicalize`], [`canonicalize_simple`]): project
//!    each case into a flat [`TestSpec`].
//!
//! [`ingest`] runs all three.
//!
//! ```no_run
//! use irspec_core::{ingest, IngestOptions, Target};
//!
//! let text = r#"{"function_name": "Add", "tests": [{
//!   "name": "adds",
//!   "given": [{"name": "a", "value": 1, "type": "int"}],
//!   "when": {"call": "Add($a)", "args": ["a"]},
//!   "then": [{"type": "equals", "actual": "result", "expected": 1}]
//! }]}"#;
//! let output = ingest(text, &Target::function("Add"), &IngestOptions::default())?;
//! assert_eq!(output.specs.len(), 1);
//! # Ok::<(), irspec_core::IngestError>(())
//! ```

pub mod binding;
pub mod canonical;
pub mod config;
pub mod error;
pub mod expr;
pub mod ir;
pub mod resolver;
pub mod validation;
pub mod value;

use serde::Serialize;

pub use canonical::{
    canonicalize, canonicalize_simple, format_test_name, Assertion, Target, TestLevel, TestSpec,
};
pub use config::IngestOptions;
pub use error::IngestError;
pub use ir::{IRAction, IRAssertion, IRTestCase, IRTestSuite, IRVariable};
pub use resolver::{resolve_document, strip_code_fence, DocumentShape, ResolvedDocument, SimpleCase};
pub use validation::{validate, ValidationError, ValidationResult};
pub use value::{coerce_literal, DynValue};

/// Result of a full ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutput {
    /// Which document shape was accepted.
    pub shape: DocumentShape,
    pub specs: Vec<TestSpec>,
    /// Validation warnings (canonical documents only).
    pub warnings: Vec<ValidationError>,
}

/// Parse a canonical suite and validate it.
///
/// A lone canonical case is wrapped into a suite with an empty
/// `function_name`, which validation then reports. Simplified documents are
/// rejected as malformed here since they have no strict form to validate.
pub fn parse_and_validate(
    text: &str,
    options: &IngestOptions,
) -> Result<(IRTestSuite, ValidationResult), IngestError> {
    match resolve_document(text, options)? {
        ResolvedDocument::Canonical { suite, .. } => {
            let result = validate(&suite, options);
            Ok((suite, result))
        }
        ResolvedDocument::Simplified { shape, .. } => Err(IngestError::malformed(
            format!("expected a canonical suite, found {shape:?}"),
            strip_code_fence(text),
            options.excerpt_len,
        )),
    }
}

/// Resolve, validate and canonicalize one generated document.
///
/// Canonical documents must validate cleanly; any error rejects the whole
/// suite with [`IngestError::ValidationFailed`]. Simplified documents bypass
/// strict validation. The target supplies the function name for lone cases
/// and simplified documents, and the file path for every spec.
pub fn ingest(
    text: &str,
    target: &Target,
    options: &IngestOptions,
) -> Result<IngestOutput, IngestError> {
    match resolve_document(text, options)? {
        ResolvedDocument::Canonical { shape, mut suite } => {
            if suite.function_name.is_empty() {
                suite.function_name = target.function_name.clone();
            }

            let result = validate(&suite, options);
            for warning in &result.warnings {
                tracing::warn!(function = %suite.function_name, "{warning}");
            }
            if !result.valid {
                return Err(IngestError::ValidationFailed {
                    message: result.error_messages().join("; "),
                    result: Box::new(result),
                });
            }

            let specs = canonicalize(&suite, target, options)?;
            Ok(IngestOutput {
                shape,
                specs,
                warnings: result.warnings,
            })
        }
        ResolvedDocument::Simplified { shape, cases } => {
            let specs = canonicalize_simple(&cases, target, options)?;
            Ok(IngestOutput {
                shape,
                specs,
                warnings: Vec::new(),
            })
        }
    }
}
