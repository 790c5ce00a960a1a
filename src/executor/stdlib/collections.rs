//! Set helpers
//!
//! Sets are values: `Set.add` returns a new set and never touches its
//! argument.

use super::{expect_arity, wrong_type};
use crate::error::DoError;
use crate::executor::types::{NativeFn, Val};

pub fn set_functions() -> Vec<(&'static str, NativeFn)> {
    vec![
        ("of", NativeFn::new("Set.of", set_of)),
        ("add", NativeFn::new("Set.add", set_add)),
        ("has", NativeFn::new("Set.has", set_has)),
    ]
}

/// `Set.of()` is the empty set, `Set.of(list)` dedups a list
fn set_of(args: &[Val]) -> Result<Val, DoError> {
    if args.is_empty() {
        return Ok(Val::Set(Vec::new()));
    }
    expect_arity("Set.of", args, 1)?;
    match &args[0] {
        Val::List(items) | Val::Set(items) => Ok(Val::set_of(items.iter().cloned())),
        other => Err(wrong_type("Set.of", 0, "a list", other)),
    }
}

fn set_add(args: &[Val]) -> Result<Val, DoError> {
    expect_arity("Set.add", args, 2)?;
    match &args[0] {
        Val::Set(items) => Ok(Val::set_of(items.iter().chain([&args[1]]).cloned())),
        other => Err(wrong_type("Set.add", 0, "a set", other)),
    }
}

fn set_has(args: &[Val]) -> Result<Val, DoError> {
    expect_arity("Set.has", args, 2)?;
    match &args[0] {
        Val::Set(items) => Ok(Val::Bool(items.contains(&args[1]))),
        other => Err(wrong_type("Set.has", 0, "a set", other)),
    }
}
