//! Emitter-facing records.
//!
//! Code emitters read these fields and nothing else; the IR types never leak
//! past the canonicalizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::DynValue;

/// Granularity of the generated test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestLevel {
    #[default]
    Unit,
    Api,
    E2e,
}

/// Target kind attached to every spec produced from a function suite.
pub const TARGET_KIND_FUNCTION: &str = "function";

/// Priority attached to specs when the upstream carries none.
pub const DEFAULT_PRIORITY: &str = "normal";

/// What the upstream source parser knows about the function under test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub function_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default)]
    pub level: TestLevel,
}

impl Target {
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            function_name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_file(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn with_level(mut self, level: TestLevel) -> Self {
        self.level = level;
        self
    }
}

/// One emitter-facing check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    /// Lexicon name (`equality`, `not_nil`, ...).
    pub kind: String,
    pub actual: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<DynValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The canonical, denormalized form of one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    pub id: String,
    pub level: TestLevel,
    pub target_kind: String,
    pub target_id: String,
    pub function_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub description: String,
    pub inputs: BTreeMap<String, DynValue>,
    pub input_types: BTreeMap<String, String>,
    pub arg_order: Vec<String>,
    pub assertions: Vec<Assertion>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub priority: String,
}
