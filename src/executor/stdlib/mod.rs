//! Standard library available to every body
//!
//! This module contains all stdlib function implementations organized by
//! category:
//! - `ops`: operator semantics (`+`, `==`, `!`, ...), applied directly by the
//!   executor and not bound to any name
//! - `State`, `Maybe`, `List`: constructors for the bundled monads
//! - `Set`: helpers for the set values State contexts usually carry

pub mod collections;
pub mod monads;
pub mod ops;

use std::collections::HashMap;

use super::errors::{self, ErrorInfo};
use super::types::{NativeFn, Val};
use crate::error::DoError;

/* ===================== Environment Injection ===================== */

/// Build the global scope every VM starts with
pub fn globals() -> HashMap<String, Val> {
    let mut env = HashMap::new();

    env.insert("State".to_string(), namespace(monads::state_functions()));
    env.insert("Maybe".to_string(), namespace(monads::maybe_functions()));
    env.insert("List".to_string(), namespace(monads::list_functions()));
    env.insert("Set".to_string(), namespace(collections::set_functions()));

    env
}

/// Names defined by `globals()`, for the semantic validator
pub fn global_names() -> Vec<String> {
    globals().into_keys().collect()
}

fn namespace(functions: Vec<(&'static str, NativeFn)>) -> Val {
    Val::Obj(
        functions
            .into_iter()
            .map(|(name, func)| (name.to_string(), Val::Native(func)))
            .collect(),
    )
}

/* ===================== Argument Helpers ===================== */

/// Check the argument count of a stdlib call
pub(crate) fn expect_arity(name: &str, args: &[Val], expected: usize) -> Result<(), DoError> {
    if args.len() != expected {
        return Err(ErrorInfo::new(
            errors::WRONG_ARG_COUNT,
            format!("{}() expects {} argument(s), got {}", name, expected, args.len()),
        )
        .into());
    }
    Ok(())
}

/// Extract a numeric argument
pub(crate) fn num_arg(name: &str, args: &[Val], idx: usize) -> Result<f64, DoError> {
    args.get(idx).and_then(Val::as_num).ok_or_else(|| {
        wrong_type(name, idx, "a number", args.get(idx).unwrap_or(&Val::Null))
    })
}

pub(crate) fn wrong_type(name: &str, idx: usize, expected: &str, got: &Val) -> DoError {
    ErrorInfo::new(
        errors::WRONG_ARG_TYPE,
        format!(
            "{}() argument {} must be {}, got {}",
            name,
            idx + 1,
            expected,
            got.describe()
        ),
    )
    .into()
}
