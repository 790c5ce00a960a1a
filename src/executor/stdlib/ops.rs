//! Operator builtins
//!
//! The parser turns `a + b` into `Builtin { op: Add, args: [a, b] }`, `!a`
//! into `Builtin { op: Not, .. }` and so on; [`apply`] evaluates them. `&&`
//! and `||` are not here because they short-circuit and are evaluated by the
//! VM directly.

use std::cmp::Ordering;

use super::{expect_arity, num_arg, wrong_type};
use crate::error::DoError;
use crate::executor::types::{Op, Val};

/// Apply an operator to already-evaluated operands
pub fn apply(op: Op, args: &[Val]) -> Result<Val, DoError> {
    let name = op.name();
    match op {
        Op::Add => add(args),
        Op::Sub => arith(name, args, |a, b| a - b),
        Op::Mul => arith(name, args, |a, b| a * b),
        Op::Div => arith(name, args, |a, b| a / b),
        Op::Mod => arith(name, args, |a, b| a % b),
        Op::Eq => {
            expect_arity(name, args, 2)?;
            Ok(Val::Bool(args[0] == args[1]))
        }
        Op::Ne => {
            expect_arity(name, args, 2)?;
            Ok(Val::Bool(args[0] != args[1]))
        }
        Op::Lt => compare(name, args, Ordering::is_lt),
        Op::Lte => compare(name, args, Ordering::is_le),
        Op::Gt => compare(name, args, Ordering::is_gt),
        Op::Gte => compare(name, args, Ordering::is_ge),
        Op::Not => {
            expect_arity(name, args, 1)?;
            Ok(Val::Bool(!args[0].is_truthy()))
        }
        Op::Neg => {
            expect_arity(name, args, 1)?;
            Ok(Val::Num(-num_arg(name, args, 0)?))
        }
    }
}

/// `+`: numbers add, lists concatenate, anything next to a string is
/// formatted into it
fn add(args: &[Val]) -> Result<Val, DoError> {
    expect_arity("add", args, 2)?;
    match (&args[0], &args[1]) {
        (Val::Num(a), Val::Num(b)) => Ok(Val::Num(a + b)),
        (Val::List(a), Val::List(b)) => Ok(Val::List(a.iter().chain(b).cloned().collect())),
        (Val::Str(a), b) => Ok(Val::Str(format!("{}{}", a, b))),
        (a, Val::Str(b)) => Ok(Val::Str(format!("{}{}", a, b))),
        (Val::Num(_), other) => Err(wrong_type("add", 1, "a number", other)),
        (other, _) => Err(wrong_type("add", 0, "a number, list or string", other)),
    }
}

fn arith(name: &str, args: &[Val], op: fn(f64, f64) -> f64) -> Result<Val, DoError> {
    expect_arity(name, args, 2)?;
    let a = num_arg(name, args, 0)?;
    let b = num_arg(name, args, 1)?;
    Ok(Val::Num(op(a, b)))
}

fn compare(name: &str, args: &[Val], accept: fn(Ordering) -> bool) -> Result<Val, DoError> {
    expect_arity(name, args, 2)?;
    let ordering = match (&args[0], &args[1]) {
        (Val::Num(a), Val::Num(b)) => a.partial_cmp(b),
        (Val::Str(a), Val::Str(b)) => Some(a.cmp(b)),
        (Val::Num(_), other) => return Err(wrong_type(name, 1, "a number", other)),
        (Val::Str(_), other) => return Err(wrong_type(name, 1, "a string", other)),
        (other, _) => return Err(wrong_type(name, 0, "a number or string", other)),
    };
    // NaN compares false against everything
    Ok(Val::Bool(ordering.is_some_and(accept)))
}
