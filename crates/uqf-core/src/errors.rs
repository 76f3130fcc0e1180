//! Structured error types shared across UQF crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`UqfError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (dimensions, indices, class names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the UQF function framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum UqfError {
    /// A size invariant between points, samples, meshes or functions failed.
    #[error("dimension error: {0}")]
    Dimension(ErrorInfo),
    /// A construction argument or parameter value is invalid.
    #[error("parameter error: {0}")]
    Parameter(ErrorInfo),
    /// The operation is declared but not provided by this implementation.
    #[error("not implemented: {0}")]
    NotImplemented(ErrorInfo),
    /// An internal invariant was violated.
    #[error("internal error: {0}")]
    Internal(ErrorInfo),
    /// An evaluation produced an invalid value or a callback failed.
    #[error("evaluation error: {0}")]
    Evaluation(ErrorInfo),
    /// Serialization and persistence errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl UqfError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            UqfError::Dimension(info)
            | UqfError::Parameter(info)
            | UqfError::NotImplemented(info)
            | UqfError::Internal(info)
            | UqfError::Evaluation(info)
            | UqfError::Serde(info) => info,
        }
    }

    /// Builds a dimension mismatch error for `what`, recording both sizes.
    pub fn dimension_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        UqfError::Dimension(
            ErrorInfo::new(
                "dimension-mismatch",
                format!("{what}: expected dimension {expected}, got {actual}"),
            )
            .with_context("expected", expected)
            .with_context("actual", actual),
        )
    }

    /// Builds an out of range index error for `what`.
    pub fn index_out_of_range(what: &str, index: usize, bound: usize) -> Self {
        UqfError::Dimension(
            ErrorInfo::new(
                "index-out-of-range",
                format!("{what}: index {index} is not below {bound}"),
            )
            .with_context("index", index)
            .with_context("bound", bound),
        )
    }

    /// Builds a not-implemented error naming the class and operation.
    pub fn not_implemented(class_name: &str, operation: &str) -> Self {
        UqfError::NotImplemented(
            ErrorInfo::new(
                "not-implemented",
                format!("{class_name}::{operation} is not implemented"),
            )
            .with_context("class", class_name)
            .with_context("operation", operation),
        )
    }
}

/// Fails with a dimension mismatch unless `actual == expected`.
pub fn check_dimension(what: &str, expected: usize, actual: usize) -> Result<(), UqfError> {
    if expected == actual {
        Ok(())
    } else {
        Err(UqfError::dimension_mismatch(what, expected, actual))
    }
}
