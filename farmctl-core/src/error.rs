/// Structured error types for farmctl-core.
///
/// The core crate does no I/O, so the only failures are in parsing text
/// handed to it (model output, dates). Binary crates wrap these in `anyhow`.
use thiserror::Error;

/// Main error type for farmctl-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// JSON parsing failed
    #[error("JSON error at {context}: {source}")]
    Json {
        context: String,
        source: serde_json::Error,
    },

    /// Model output parsed, but had no usable shape
    #[error("Unexpected model output: {reason}")]
    UnexpectedShape { reason: String },
}

/// Result type alias for farmctl-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create an unexpected-shape error
    pub fn unexpected_shape(reason: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            reason: reason.into(),
        }
    }
}
