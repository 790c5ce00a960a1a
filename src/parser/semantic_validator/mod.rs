//! Semantic Validation for do-notation bodies
//!
//! Rule-based checks that run after parsing to catch mistakes the grammar
//! can't enforce.
//!
//! # Usage
//!
//! ```ignore
//! use donotation_core::parser::{parse_function, semantic_validator::validate_function};
//!
//! let def = parse_function(source)?;
//! let errors = validate_function(&def, source, &globals);
//! if errors.iter().any(|e| e.is_error()) {
//!     // refuse to run it
//! }
//! ```
//!
//! # Architecture
//!
//! 1. **ValidationRule trait** - Each rule implements this trait
//! 2. **Validator** - Collects and runs all rules
//! 3. **ValidationError** - The output of validation (errors and warnings)
//!
//! New rules go in `semantic_validator/rules/` and are registered in
//! `Validator::new()`.

pub mod rules;

use std::collections::HashSet;

use crate::executor::types::ast::Span;

use super::FunctionDef;

// ============================================================================
// Validation Error Types
// ============================================================================

/// A validation error produced by semantic analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The source location of the issue
    pub span: Span,
    /// Human-readable message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Which rule produced this error
    pub rule_id: &'static str,
}

/// Severity levels for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Must be fixed - the body cannot run
    Error,
    /// Should probably be fixed - potential bug
    Warning,
}

impl ValidationError {
    /// Create a new error
    pub fn error(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Error,
            rule_id,
        }
    }

    /// Create a new warning
    pub fn warning(span: Span, message: impl Into<String>, rule_id: &'static str) -> Self {
        Self {
            span,
            message: message.into(),
            severity: Severity::Warning,
            rule_id,
        }
    }

    /// Check if this is an error (not a warning)
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{} at {}: {} [{}]",
            severity, self.span, self.message, self.rule_id
        )
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait that all validation rules must implement.
///
/// Each rule checks one aspect of the code and doesn't depend on the results
/// of other rules.
pub trait ValidationRule {
    /// Unique identifier for this rule (e.g., "undefined-variable")
    fn id(&self) -> &'static str;

    /// Human-readable description of what this rule checks
    fn description(&self) -> &'static str;

    /// Run the validation and return any errors found.
    fn validate(&self, def: &FunctionDef, source: &str) -> Vec<ValidationError>;
}

// ============================================================================
// Validator - Runs All Rules
// ============================================================================

/// The main validator that orchestrates all validation rules.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a validator with all built-in rules.
    ///
    /// `globals` are the names a body may use without declaring them: the
    /// stdlib plus any host functions.
    pub fn new<I, S>(globals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let globals: HashSet<String> = globals.into_iter().map(Into::into).collect();
        Self {
            rules: vec![
                // Error rules - the body cannot run correctly
                Box::new(rules::UndefinedVariableRule::new(globals)),
                Box::new(rules::NestedYieldRule),
                // Warning rules - these are suggestions
                Box::new(rules::UnusedVariableRule),
            ],
        }
    }

    /// Run all validation rules and collect errors.
    pub fn validate(&self, def: &FunctionDef, source: &str) -> Vec<ValidationError> {
        let mut errors: Vec<ValidationError> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(def, source))
            .collect();
        errors.sort_by_key(|e| (e.span.start_line, e.span.start_col));
        errors
    }

    /// Registered rules as (id, description)
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.id(), r.description()))
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Validate a parsed function and return all errors and warnings found.
pub fn validate_function(def: &FunctionDef, source: &str, globals: &[String]) -> Vec<ValidationError> {
    Validator::new(globals.iter().cloned()).validate(def, source)
}

#[cfg(test)]
mod tests;
