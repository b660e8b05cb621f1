//! Error types for specification ingestion.

use thiserror::Error;

use crate::validation::ValidationResult;

#[derive(Debug, Error)]
pub enum IngestError {
    /// No candidate document shape accepted the input.
    #[error("malformed specification: {reason} (near: {excerpt})")]
    MalformedSpecification { reason: String, excerpt: String },

    /// The suite parsed but carries structural or referential errors.
    #[error("validation failed: {message}")]
    ValidationFailed {
        message: String,
        result: Box<ValidationResult>,
    },

    /// A single case could not be projected into a `TestSpec`.
    #[error("case {index} ({name}) skipped: {reason}")]
    ConversionSkipped {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("no test cases converted ({skipped} skipped)")]
    NoCasesConverted { skipped: usize },
}

impl IngestError {
    /// Build a `MalformedSpecification` with an excerpt of at most
    /// `max_chars` characters of `text`.
    pub(crate) fn malformed(reason: impl Into<String>, text: &str, max_chars: usize) -> Self {
        IngestError::MalformedSpecification {
            reason: reason.into(),
            excerpt: excerpt(text, max_chars),
        }
    }

    /// The validation report, when this is a `ValidationFailed`.
    pub fn validation_result(&self) -> Option<&ValidationResult> {
        match self {
            IngestError::ValidationFailed { result, .. } => Some(result.as_ref()),
            _ => None,
        }
    }
}

/// Truncate `text` to `max_chars` characters, marking the cut.
fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}... (truncated)")
    } else {
        head
    }
}
