//! Validation error types

use std::fmt;

/// Validation error for request input
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match the required format (e.g. UUID)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Number is below zero where only non-negative values make sense
    Negative { field: &'static str },

    /// A required query parameter or body field is absent
    Missing { field: &'static str },

    /// Uploaded payload was rejected
    Upload { reason: String },

    /// JSON body could not be decoded
    MalformedBody { reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::Negative { field } => write!(f, "{} cannot be negative", field),
            Self::Missing { field } => write!(f, "{} is required", field),
            Self::Upload { reason } => write!(f, "upload rejected: {}", reason),
            Self::MalformedBody { reason } => write!(f, "malformed request body: {}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}
