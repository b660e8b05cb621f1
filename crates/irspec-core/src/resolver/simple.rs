//! The simplified case format models tend to produce unprompted.
//!
//! ```yaml
//! - name: "Add positive numbers"
//!   setup: { a: 2, b: 3 }
//!   action: "Add(a, b)"
//!   assertions: { result: 5 }
//! ```
//!
//! The assertion payload shows up under several field names and in several
//! shapes. [`SimpleCase::payload`] is the one place that decides which alias
//! wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::expr::RawAction;
use crate::value::DynValue;

/// One loosely structured test case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimpleCase {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub setup: BTreeMap<String, DynValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<RawAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertions: Option<AssertionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<AssertionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assert: Option<AssertionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<AssertionPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<AssertionPayload>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// An assertion payload in any of the shapes models emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssertionPayload {
    /// `"result == 5"`
    Text(String),
    /// `[{result: 5}, "error is nil"]`
    List(Vec<DynValue>),
    /// `{result: 5, error: false}`
    Map(BTreeMap<String, DynValue>),
    /// A bare expected value: `5`, `true`.
    Scalar(DynValue),
}

impl SimpleCase {
    /// The populated assertion payload, by precedence:
    /// `assertions`, `assertion`, `assert`, `expected`, `expect`.
    /// Later aliases are ignored once an earlier one is present.
    pub fn payload(&self) -> Option<&AssertionPayload> {
        [
            &self.assertions,
            &self.assertion,
            &self.assert,
            &self.expected,
            &self.expect,
        ]
        .into_iter()
        .find_map(Option::as_ref)
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
