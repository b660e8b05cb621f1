//! Dynamic values and literal coercion.
//!
//! Generated specifications carry loosely typed values: setup variables,
//! expected results, action arguments. [`DynValue`] is the closed set of
//! shapes those values may take, and [`coerce_literal`] turns free text
//! (the right-hand side of `result == 5`) into one of them.
//!
//! ## Numeric policy
//!
//! Literals are read float-aware: text that parses *completely* as an `i64`
//! is an integer, otherwise text that parses completely as a finite `f64` is a
//! float. `"3.14"` is `Float(3.14)`, never truncated to `3`. Partial numbers
//! such as `"5abc"` stay strings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A dynamically typed value from a generated specification.
///
/// Deserialization is untagged and tries the variants in declaration order,
/// so whole JSON numbers land in `Int` and fractional ones in `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DynValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<DynValue>),
    Map(BTreeMap<String, DynValue>),
}

/// Shape classification of a [`DynValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// The type-hint spelling used by specifications (`"int"`, `"array"`, ...).
    pub fn type_hint(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl DynValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            DynValue::Null => ValueKind::Null,
            DynValue::Bool(_) => ValueKind::Bool,
            DynValue::Int(_) => ValueKind::Int,
            DynValue::Float(_) => ValueKind::Float,
            DynValue::String(_) => ValueKind::String,
            DynValue::List(_) => ValueKind::Array,
            DynValue::Map(_) => ValueKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, DynValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for integers and for floats without a fractional part
    /// (`5.0` as written by many JSON encoders).
    pub fn is_whole_number(&self) -> bool {
        match self {
            DynValue::Int(_) => true,
            DynValue::Float(f) => f.is_finite() && f.fract() == 0.0,
            _ => false,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, DynValue::Int(_) | DynValue::Float(_))
    }
}

impl fmt::Display for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynValue::Null => f.write_str("null"),
            DynValue::Bool(b) => write!(f, "{b}"),
            DynValue::Int(i) => write!(f, "{i}"),
            DynValue::Float(x) => write!(f, "{x}"),
            DynValue::String(s) => f.write_str(s),
            DynValue::List(_) | DynValue::Map(_) => {
                let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&text)
            }
        }
    }
}

impl From<&str> for DynValue {
    fn from(s: &str) -> Self {
        DynValue::String(s.to_string())
    }
}

impl From<String> for DynValue {
    fn from(s: String) -> Self {
        DynValue::String(s)
    }
}

impl From<i64> for DynValue {
    fn from(i: i64) -> Self {
        DynValue::Int(i)
    }
}

impl From<f64> for DynValue {
    fn from(f: f64) -> Self {
        DynValue::Float(f)
    }
}

impl From<bool> for DynValue {
    fn from(b: bool) -> Self {
        DynValue::Bool(b)
    }
}

impl From<&serde_json::Value> for DynValue {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => DynValue::Null,
            Value::Bool(b) => DynValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => DynValue::Int(i),
                None => DynValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => DynValue::String(s.clone()),
            Value::Array(items) => DynValue::List(items.iter().map(DynValue::from).collect()),
            Value::Object(map) => DynValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), DynValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for DynValue {
    fn from(value: serde_json::Value) -> Self {
        DynValue::from(&value)
    }
}

// ---------------------------------------------------------------------------
// Literal coercion
// ---------------------------------------------------------------------------

/// Coerce literal text into a typed value.
///
/// Order: matching quote pair (→ string, quotes removed), integer, float,
/// `true`/`false`, `nil`/`null`, otherwise the trimmed text as a string.
pub fn coerce_literal(text: &str) -> DynValue {
    let s = text.trim();

    if let Some(inner) = strip_matching_quotes(s) {
        return DynValue::String(inner.to_string());
    }

    if let Ok(i) = s.parse::<i64>() {
        return DynValue::Int(i);
    }

    if looks_numeric(s) {
        if let Ok(f) = s.parse::<f64>() {
            if f.is_finite() {
                return DynValue::Float(f);
            }
        }
    }

    match s {
        "true" => DynValue::Bool(true),
        "false" => DynValue::Bool(false),
        "nil" | "null" => DynValue::Null,
        _ => DynValue::String(s.to_string()),
    }
}

/// Inner text of a `"..."` or `'...'` literal.
fn strip_matching_quotes(s: &str) -> Option<&str> {
    if s.len() < 2 {
        return None;
    }
    ['"', '\'']
        .into_iter()
        .find(|q| s.starts_with(*q) && s.ends_with(*q))
        .map(|_| &s[1..s.len() - 1])
}

/// `f64::from_str` also accepts `inf`, `NaN` and `infinity`; those are words
/// in a test spec, not numbers.
fn looks_numeric(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}
