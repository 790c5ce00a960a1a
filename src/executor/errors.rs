//! Runtime error values raised while evaluating a body
//!
//! Every runtime failure carries a stable code so callers (and tests) can
//! match on the kind of failure without parsing messages.

use thiserror::Error;

pub const UNDEFINED_VARIABLE: &str = "UNDEFINED_VARIABLE";
pub const NOT_CALLABLE: &str = "NOT_CALLABLE";
pub const WRONG_ARG_COUNT: &str = "WRONG_ARG_COUNT";
pub const WRONG_ARG_TYPE: &str = "WRONG_ARG_TYPE";
pub const PROPERTY_NOT_FOUND: &str = "PROPERTY_NOT_FOUND";
pub const NOT_ITERABLE: &str = "NOT_ITERABLE";
pub const INVALID_CONTROL: &str = "INVALID_CONTROL";
pub const NOT_SERIALIZABLE: &str = "NOT_SERIALIZABLE";

/// Error value with code and message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
