//! Schema resolution: decides which accepted shape a raw document has.
//!
//! Generated output is not guaranteed to follow any one schema, so the
//! document is decoded once (JSON, then YAML) and matched against the
//! candidate shapes in a fixed order. The first candidate that decodes *and*
//! carries its identifying field wins:
//!
//! 1. canonical suite (`function_name` at the root) or canonical case (`name`
//!    at the root next to `given`/`when`/`then`)
//! 2. a bare list of simplified cases
//! 3. a single simplified case (`name` at the root)
//! 4. a `tests` list of simplified cases
//!
//! A document that carries the identifying fields of the canonical shape but
//! does not decode as one is malformed; it never falls through to the
//! simplified shapes. Simplified shapes also refuse any root `function_name`.
//!
//! No semantic checks happen here; that is the validator's job.

mod fence;
mod simple;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::IngestOptions;
use crate::error::IngestError;
use crate::ir::{IRTestCase, IRTestSuite};

pub use fence::strip_code_fence;
pub(crate) use fence::decode_document;
pub use simple::{AssertionPayload, SimpleCase};

/// Root keys that only the canonical case format uses.
const CANONICAL_CASE_KEYS: &[&str] = &["given", "when", "then"];

/// Which candidate shape accepted the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentShape {
    CanonicalSuite,
    CanonicalCase,
    CaseList,
    SingleCase,
    WrappedCases,
}

/// A document accepted by one of the candidate shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedDocument {
    /// Given/When/Then document; goes through strict validation.
    ///
    /// A lone canonical case is wrapped into a suite with an empty
    /// `function_name` for the caller to fill in.
    Canonical {
        shape: DocumentShape,
        suite: IRTestSuite,
    },
    /// Simplified cases; converted leniently.
    Simplified {
        shape: DocumentShape,
        cases: Vec<SimpleCase>,
    },
}

impl ResolvedDocument {
    pub fn shape(&self) -> DocumentShape {
        match self {
            ResolvedDocument::Canonical { shape, .. } | ResolvedDocument::Simplified { shape, .. } => {
                *shape
            }
        }
    }
}

#[derive(Deserialize)]
struct WrappedCases {
    #[serde(default)]
    tests: Vec<SimpleCase>,
}

/// Resolve raw generator output into one accepted document shape.
///
/// Strips a surrounding markdown fence first. Fails with
/// [`IngestError::MalformedSpecification`] when the text does not decode or
/// no candidate shape accepts it.
pub fn resolve_document(
    text: &str,
    options: &IngestOptions,
) -> Result<ResolvedDocument, IngestError> {
    let body = strip_code_fence(text);
    let doc = decode_document(body)
        .map_err(|reason| IngestError::malformed(reason, body, options.excerpt_len))?;

    let candidates: [Candidate; 4] = [canonical, case_list, single_case, wrapped_cases];

    for candidate in candidates {
        let attempt = candidate(&doc)
            .map_err(|reason| IngestError::malformed(reason, body, options.excerpt_len))?;
        if let Some(resolved) = attempt {
            tracing::debug!(shape = ?resolved.shape(), "accepted document shape");
            return Ok(resolved);
        }
    }

    Err(IngestError::malformed(
        "no recognized test-suite shape",
        body,
        options.excerpt_len,
    ))
}

/// `Ok(None)` passes the document on to the next candidate. `Err` means the
/// candidate claimed the document but could not decode it.
type Candidate = fn(&Value) -> Result<Option<ResolvedDocument>, String>;

fn non_empty_str<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Simplified candidates never accept a document carrying `function_name`.
fn claims_suite(doc: &Value) -> bool {
    doc.get("function_name").is_some()
}

fn canonical(doc: &Value) -> Result<Option<ResolvedDocument>, String> {
    let Some(obj) = doc.as_object() else {
        return Ok(None);
    };

    if non_empty_str(doc, "function_name").is_some() {
        let suite = serde_json::from_value::<IRTestSuite>(doc.clone())
            .map_err(|e| format!("canonical suite does not decode: {e}"))?;
        return Ok(Some(ResolvedDocument::Canonical {
            shape: DocumentShape::CanonicalSuite,
            suite,
        }));
    }

    let looks_like_case = CANONICAL_CASE_KEYS.iter().any(|k| obj.contains_key(*k));
    if non_empty_str(doc, "name").is_some() && looks_like_case {
        let case = serde_json::from_value::<IRTestCase>(doc.clone())
            .map_err(|e| format!("canonical case does not decode: {e}"))?;
        return Ok(Some(ResolvedDocument::Canonical {
            shape: DocumentShape::CanonicalCase,
            suite: IRTestSuite {
                function_name: String::new(),
                description: None,
                tests: vec![case],
            },
        }));
    }

    Ok(None)
}

fn case_list(doc: &Value) -> Result<Option<ResolvedDocument>, String> {
    if !doc.is_array() {
        return Ok(None);
    }
    let Ok(cases) = serde_json::from_value::<Vec<SimpleCase>>(doc.clone()) else {
        return Ok(None);
    };
    Ok((!cases.is_empty()).then_some(ResolvedDocument::Simplified {
        shape: DocumentShape::CaseList,
        cases,
    }))
}

fn single_case(doc: &Value) -> Result<Option<ResolvedDocument>, String> {
    if !doc.is_object() || claims_suite(doc) {
        return Ok(None);
    }
    let Ok(case) = serde_json::from_value::<SimpleCase>(doc.clone()) else {
        return Ok(None);
    };
    Ok((!case.name.trim().is_empty()).then(|| ResolvedDocument::Simplified {
        shape: DocumentShape::SingleCase,
        cases: vec![case],
    }))
}

fn wrapped_cases(doc: &Value) -> Result<Option<ResolvedDocument>, String> {
    if !doc.is_object() || claims_suite(doc) {
        return Ok(None);
    }
    let Ok(wrapped) = serde_json::from_value::<WrappedCases>(doc.clone()) else {
        return Ok(None);
    };
    Ok((!wrapped.tests.is_empty()).then_some(ResolvedDocument::Simplified {
        shape: DocumentShape::WrappedCases,
        cases: wrapped.tests,
    }))
}
