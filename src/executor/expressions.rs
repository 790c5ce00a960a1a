//! Expression evaluation
//!
//! Evaluates expressions to values. A `yield` either suspends evaluation
//! (first visit) or evaluates to the value the VM was resumed with.

use std::collections::HashMap;

use super::errors::{self, ErrorInfo};
use super::stdlib::ops;
use super::types::{BinaryOp, Expr, Span, Val};
use super::vm::VM;
use crate::error::DoError;

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    /// Expression evaluated to a value
    Value(Val),
    /// Expression hit a `yield` and the VM must stop
    Suspend { operand: Val, span: Span },
}

/// Unwrap a value or propagate a suspension to the caller
macro_rules! value {
    ($eval:expr) => {
        match $eval? {
            EvalResult::Value(v) => v,
            suspend @ EvalResult::Suspend { .. } => return Ok(suspend),
        }
    };
}

/// Evaluate an expression to a value
///
/// Returns:
/// - Ok(Value) on success
/// - Ok(Suspend) when a `yield` is reached with no pending resume value
/// - Err on evaluation error (undefined variable, bad call, ...)
pub fn eval_expr(expr: &Expr, vm: &mut VM) -> Result<EvalResult, DoError> {
    let v = match expr {
        Expr::LitBool { v, .. } => Val::Bool(*v),

        Expr::LitNum { v, .. } => Val::Num(*v),

        Expr::LitStr { v, .. } => Val::Str(v.clone()),

        Expr::LitNull { .. } => Val::Null,

        Expr::LitList { elements, .. } => {
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                items.push(value!(eval_expr(element, vm)));
            }
            Val::List(items)
        }

        Expr::LitObj { properties, .. } => {
            let mut map = HashMap::with_capacity(properties.len());
            for (key, _, value_expr) in properties {
                map.insert(key.clone(), value!(eval_expr(value_expr, vm)));
            }
            Val::Obj(map)
        }

        Expr::Ident { name, .. } => vm.lookup(name).cloned().ok_or_else(|| {
            ErrorInfo::new(
                errors::UNDEFINED_VARIABLE,
                format!("Undefined variable '{}'", name),
            )
        })?,

        Expr::Member {
            object, property, ..
        } => {
            let object = value!(eval_expr(object, vm));
            member(&object, property)?
        }

        Expr::Call { callee, args, .. } => {
            let callee = value!(eval_expr(callee, vm));
            let mut argv = Vec::with_capacity(args.len());
            for arg in args {
                argv.push(value!(eval_expr(arg, vm)));
            }
            call(&callee, &argv)?
        }

        Expr::Builtin { op, args, .. } => {
            let mut argv = Vec::with_capacity(args.len());
            for arg in args {
                argv.push(value!(eval_expr(arg, vm)));
            }
            ops::apply(*op, &argv)?
        }

        Expr::Yield { inner, span } => match vm.resume_value.take() {
            Some(resumed) => resumed,
            None => {
                let operand = value!(eval_expr(inner, vm));
                return Ok(EvalResult::Suspend {
                    operand,
                    span: *span,
                });
            }
        },

        Expr::BinaryOp {
            op, left, right, ..
        } => {
            let left = value!(eval_expr(left, vm));
            match op {
                BinaryOp::And if !left.is_truthy() => left,
                BinaryOp::Or if left.is_truthy() => left,
                BinaryOp::And | BinaryOp::Or => value!(eval_expr(right, vm)),
            }
        }

        Expr::Ternary {
            condition,
            consequent,
            alternate,
            ..
        } => {
            if value!(eval_expr(condition, vm)).is_truthy() {
                value!(eval_expr(consequent, vm))
            } else {
                value!(eval_expr(alternate, vm))
            }
        }
    };

    Ok(EvalResult::Value(v))
}

/// Property access on objects, plus `length` on collections and strings
fn member(object: &Val, property: &str) -> Result<Val, ErrorInfo> {
    match (object, property) {
        (Val::Obj(map), _) => map.get(property).cloned().ok_or_else(|| {
            ErrorInfo::new(
                errors::PROPERTY_NOT_FOUND,
                format!("Object has no property '{}'", property),
            )
        }),
        (Val::List(items) | Val::Set(items), "length") => Ok(Val::Num(items.len() as f64)),
        (Val::Str(s), "length") => Ok(Val::Num(s.chars().count() as f64)),
        _ => Err(ErrorInfo::new(
            errors::PROPERTY_NOT_FOUND,
            format!("Cannot read property '{}' of {}", property, object.describe()),
        )),
    }
}

/// Call a host function with already-evaluated arguments
fn call(callee: &Val, args: &[Val]) -> Result<Val, DoError> {
    match callee {
        Val::Native(func) => func.call(args),
        other => Err(ErrorInfo::new(
            errors::NOT_CALLABLE,
            format!("{} is not a function", other.describe()),
        )
        .into()),
    }
}
