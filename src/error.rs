//! Error types for do-notation bodies.
//!
//! All errors are strongly typed using thiserror so callers can tell a
//! capability violation (a suspension point whose operand cannot be bound)
//! apart from ordinary failures inside the computation.

use thiserror::Error;

use crate::executor::errors::ErrorInfo;
use crate::executor::types::Span;
use crate::parser::semantic_validator::ValidationError;
use crate::parser::ParseError;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum DoError {
    /// A suspension point yielded a value that has no bind operation.
    #[error("yield #{index}{} produced {found}, which is not a monadic value", site(.at))]
    NotBindable {
        /// 1-based position of the suspension point in execution order.
        index: usize,
        /// Description of the offending operand.
        found: String,
        /// Location of the `yield`, when the body came from source.
        at: Option<Span>,
    },

    /// A concrete monad was handed a value outside its own family.
    #[error("expected a {expected} value, got {found}")]
    UnexpectedValue {
        expected: &'static str,
        found: String,
    },

    #[error("'{name}' expects {expected} argument(s), got {actual}")]
    Arity {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("runtime error: {0}")]
    Runtime(#[from] ErrorInfo),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("validation failed: {}", join(.errors))]
    Validation { errors: Vec<ValidationError> },

    /// Errors raised by host functions, propagated unchanged.
    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

impl DoError {
    /// True for the one error kind the do-runner itself introduces.
    pub fn is_capability_violation(&self) -> bool {
        matches!(self, DoError::NotBindable { .. })
    }

    /// Code of a runtime error, if this is one.
    pub fn runtime_code(&self) -> Option<&str> {
        match self {
            DoError::Runtime(info) => Some(info.code.as_str()),
            _ => None,
        }
    }
}

fn site(at: &Option<Span>) -> String {
    match at {
        Some(span) => format!(" at {}", span),
        None => String::new(),
    }
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
