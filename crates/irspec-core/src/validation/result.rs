//! Validation findings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One finding, located by a slash/bracket path such as
/// `tests[0]/given[1]/type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    /// The offending literal, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {} (got: {})", self.field, self.message, value),
            None => write!(f, "{}: {}", self.field, self.message),
        }
    }
}

/// Errors and warnings for one suite. Warnings never affect `valid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
    pub valid: bool,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            valid: true,
        }
    }
}

impl ValidationResult {
    pub(crate) fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.push_error(field.into(), message.into(), None);
    }

    pub(crate) fn error_with(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.push_error(field.into(), message.into(), Some(value.into()));
    }

    pub(crate) fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationError {
            field: field.into(),
            message: message.into(),
            value: None,
        });
    }

    pub(crate) fn warning_with(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.warnings.push(ValidationError {
            field: field.into(),
            message: message.into(),
            value: Some(value.into()),
        });
    }

    fn push_error(&mut self, field: String, message: String, value: Option<String>) {
        self.errors.push(ValidationError {
            field,
            message,
            value,
        });
        self.valid = false;
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    /// One-line human-readable outcome.
    pub fn summary(&self) -> String {
        if self.valid && self.warnings.is_empty() {
            return "validation passed".to_string();
        }
        let outcome = if self.valid {
            "passed with warnings"
        } else {
            "failed"
        };
        format!(
            "validation {}: {} errors, {} warnings",
            outcome,
            self.errors.len(),
            self.warnings.len()
        )
    }
}
