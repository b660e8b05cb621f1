//! Configuration for specification ingestion.
//!
//! [`IngestOptions`] holds the lookup tables shared by the validator and the
//! canonicalizer. Build it once and pass it by reference; nothing in the
//! pipeline mutates it, so one instance can serve concurrent ingestions.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Type hints accepted on `given` variables.
const DEFAULT_TYPE_HINTS: &[&str] = &[
    "int", "float", "string", "bool", "null", "array", "object", "function",
];

/// Assertion lexicon: IR assertion type → emitter-facing kind.
const DEFAULT_ASSERTION_KINDS: &[(&str, &str)] = &[
    ("equals", "equality"),
    ("not_equals", "not_equal"),
    ("contains", "contains"),
    ("not_contains", "not_contains"),
    ("greater_than", "greater_than"),
    ("less_than", "less_than"),
    ("throws", "throws"),
    ("truthy", "truthy"),
    ("falsy", "falsy"),
    ("nil", "nil"),
    ("not_nil", "not_nil"),
    ("length", "length"),
    ("type_is", "type_is"),
];

/// Comparison-style assertion types; these need an `expected` value.
const DEFAULT_EXPECTED_REQUIRED: &[&str] = &[
    "equals",
    "not_equals",
    "contains",
    "not_contains",
    "greater_than",
    "less_than",
    "length",
    "type_is",
];

/// Options for ingestion, validation and canonicalization.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `type-hints`, `excerpt-len`).
/// Missing fields fall back to their defaults, so a config file only needs
/// to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct IngestOptions {
    /// Allowed `given[].type` hints.
    pub type_hints: BTreeSet<String>,
    /// Recognized assertion types and the kind each one maps to.
    pub assertion_kinds: BTreeMap<String, String>,
    /// Assertion types for which `expected` must be present.
    pub expected_required: BTreeSet<String>,
    /// `function_name` lengths above this produce a warning.
    pub max_function_name_len: usize,
    /// Upper bound on the input excerpt carried by parse diagnostics.
    pub excerpt_len: usize,
}

impl IngestOptions {
    pub fn is_known_type_hint(&self, hint: &str) -> bool {
        self.type_hints.contains(hint)
    }

    pub fn is_known_assertion(&self, assertion_type: &str) -> bool {
        self.assertion_kinds.contains_key(assertion_type)
    }

    pub fn requires_expected(&self, assertion_type: &str) -> bool {
        self.expected_required.contains(assertion_type)
    }

    /// Map an IR assertion type to its emitter kind. Unknown types pass
    /// through unchanged.
    pub fn assertion_kind<'a>(&'a self, assertion_type: &'a str) -> &'a str {
        self.assertion_kinds
            .get(assertion_type)
            .map(String::as_str)
            .unwrap_or(assertion_type)
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            type_hints: DEFAULT_TYPE_HINTS.iter().map(|s| s.to_string()).collect(),
            assertion_kinds: DEFAULT_ASSERTION_KINDS
                .iter()
                .map(|(ir, kind)| (ir.to_string(), kind.to_string()))
                .collect(),
            expected_required: DEFAULT_EXPECTED_REQUIRED
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_function_name_len: 200,
            excerpt_len: 200,
        }
    }
}
