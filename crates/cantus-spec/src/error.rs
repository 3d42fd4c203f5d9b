//! Error types for the composition pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Common trait for coded errors.
///
/// Every error surfaced by the pipeline (stage failures, style provider
/// failures, registry loading failures) carries a stable code and a category
/// so hosts can report them uniformly.
pub trait CodedError: std::error::Error {
    /// Stable error code (e.g., "E001", "STYLE_002").
    fn code(&self) -> &'static str;

    /// Human-readable message.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Error category for grouping related errors (e.g., "pipeline", "style").
    fn category(&self) -> &'static str;
}

/// Kind of a fatal pipeline error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// E001: unusable text input.
    InvalidInput,
    /// E002: an explicit parameter override is out of bounds.
    ParameterValidation,
    /// E003: an internal invariant was violated while assembling.
    Assembly,
    /// E004: the run was cancelled between stages.
    Cancelled,
}

impl ErrorKind {
    /// Returns the error code string (e.g., "E001").
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "E001",
            ErrorKind::ParameterValidation => "E002",
            ErrorKind::Assembly => "E003",
            ErrorKind::Cancelled => "E004",
        }
    }

    /// Returns the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::ParameterValidation => "parameter_validation",
            ErrorKind::Assembly => "assembly",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A fatal error that aborts the current pipeline run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The input text is empty, whitespace-only, or too long.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An explicit override violated its bounds.
    #[error("parameter '{field}' is invalid: {message}")]
    ParameterValidation {
        /// Name of the offending field (e.g., "tempo").
        field: String,
        /// Description of the violated bound.
        message: String,
    },

    /// A global invariant failed at assembly time. Always an implementation defect.
    #[error("assembly invariant violated: {0}")]
    Assembly(String),

    /// The run was cancelled before the named stage started.
    #[error("cancelled before stage '{stage}'")]
    Cancelled {
        /// Stage that would have run next.
        stage: String,
    },
}

impl PipelineError {
    /// Creates a parameter validation error for a field.
    pub fn parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        PipelineError::ParameterValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineError::ParameterValidation { .. } => ErrorKind::ParameterValidation,
            PipelineError::Assembly(_) => ErrorKind::Assembly,
            PipelineError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }
}

impl CodedError for PipelineError {
    fn code(&self) -> &'static str {
        self.kind().code()
    }

    fn category(&self) -> &'static str {
        "pipeline"
    }
}
