//! Statement execution handlers
//!
//! Each statement type has its own handler function that processes
//! the statement based on its current execution phase. A handler that
//! evaluates an expression leaves its frame on the stack when the
//! expression suspends, so the statement re-runs on resume and its `yield`
//! picks up the resumed value.

use super::errors::{self, ErrorInfo};
use super::expressions::{eval_expr, EvalResult};
use super::types::{Control, Expr, ForPhase, FrameKind, IfPhase, Stmt, Val};
use super::vm::{pop_frame, push_stmt, Step, VM};
use crate::error::DoError;

/// Evaluate an expression, turning a suspension into `Control::Suspend`
///
/// Returns `None` when the VM suspended and the caller must stop.
fn eval_or_suspend(vm: &mut VM, expr: &Expr) -> Result<Option<Val>, DoError> {
    match eval_expr(expr, vm)? {
        EvalResult::Value(v) => Ok(Some(v)),
        EvalResult::Suspend { operand, span } => {
            // DO NOT pop the frame - it is re-executed on resume
            vm.control = Control::Suspend { operand, span };
            Ok(None)
        }
    }
}

fn top_frame_kind(vm: &mut VM) -> Option<&mut FrameKind> {
    vm.frames.last_mut().map(|f| &mut f.kind)
}

/* ===================== Statement Handlers ===================== */

/// Execute Block statement
pub fn execute_block(vm: &mut VM, idx: usize, body: &[Stmt]) -> Result<Step, DoError> {
    // Check if we've finished all statements in the block
    let Some(child) = body.get(idx) else {
        pop_frame(vm);
        return Ok(Step::Continue);
    };

    // Update our frame to point to the next statement
    if let Some(kind) = top_frame_kind(vm) {
        *kind = FrameKind::Block { idx: idx + 1 };
    }

    push_stmt(vm, child);
    Ok(Step::Continue)
}

/// Execute Declare statement (`let name = init`)
pub fn execute_declare(vm: &mut VM, name: &str, init: Option<&Expr>) -> Result<Step, DoError> {
    let value = match init {
        Some(expr) => match eval_or_suspend(vm, expr)? {
            Some(v) => v,
            None => return Ok(Step::Done),
        },
        None => Val::Null,
    };

    pop_frame(vm);
    vm.define(name, value);
    Ok(Step::Continue)
}

/// Execute Assign statement (`var = value`)
pub fn execute_assign(vm: &mut VM, var: &str, value: &Expr) -> Result<Step, DoError> {
    let Some(value) = eval_or_suspend(vm, value)? else {
        return Ok(Step::Done);
    };

    pop_frame(vm);
    vm.assign(var, value)?;
    Ok(Step::Continue)
}

/// Execute If statement
pub fn execute_if(
    vm: &mut VM,
    phase: IfPhase,
    test: &Expr,
    then_s: &Stmt,
    else_s: Option<&Stmt>,
) -> Result<Step, DoError> {
    match phase {
        IfPhase::Eval => {
            let Some(test) = eval_or_suspend(vm, test)? else {
                return Ok(Step::Done);
            };

            let branch = if test.is_truthy() { Some(then_s) } else { else_s };
            match branch {
                Some(branch) => {
                    if let Some(kind) = top_frame_kind(vm) {
                        *kind = FrameKind::If {
                            phase: IfPhase::Done,
                        };
                    }
                    push_stmt(vm, branch);
                }
                None => pop_frame(vm),
            }
            Ok(Step::Continue)
        }
        IfPhase::Done => {
            pop_frame(vm);
            Ok(Step::Continue)
        }
    }
}

/// Execute While statement
///
/// The frame stays on the stack while the body runs; each time control
/// returns to it the test is evaluated again.
pub fn execute_while(vm: &mut VM, test: &Expr, body: &Stmt) -> Result<Step, DoError> {
    let Some(test) = eval_or_suspend(vm, test)? else {
        return Ok(Step::Done);
    };

    if test.is_truthy() {
        push_stmt(vm, body);
    } else {
        pop_frame(vm);
    }
    Ok(Step::Continue)
}

/// Execute For loop (`for (let binding of iterable) body`)
pub fn execute_for(
    vm: &mut VM,
    phase: ForPhase,
    items: Vec<Val>,
    idx: usize,
    binding: &str,
    iterable: &Expr,
    body: &Stmt,
) -> Result<Step, DoError> {
    match phase {
        ForPhase::Eval => {
            let Some(iterable) = eval_or_suspend(vm, iterable)? else {
                return Ok(Step::Done);
            };

            let items = match iterable {
                Val::List(items) | Val::Set(items) => items,
                other => {
                    return Err(ErrorInfo::new(
                        errors::NOT_ITERABLE,
                        format!("Cannot iterate over {}", other.describe()),
                    )
                    .into())
                }
            };

            if let Some(kind) = top_frame_kind(vm) {
                *kind = FrameKind::For {
                    phase: ForPhase::Iterate,
                    items,
                    idx: 0,
                };
            }
            Ok(Step::Continue)
        }
        ForPhase::Iterate => {
            // Close the previous iteration's binding scope
            let depth = vm.frames.last().map_or(vm.scopes.len(), |f| f.scope_depth);
            vm.scopes.truncate(depth);

            let Some(item) = items.get(idx).cloned() else {
                pop_frame(vm);
                return Ok(Step::Continue);
            };

            if let Some(FrameKind::For { idx: next, .. }) = top_frame_kind(vm) {
                *next = idx + 1;
            }

            vm.scopes.push(Default::default());
            vm.define(binding, item);
            push_stmt(vm, body);
            Ok(Step::Continue)
        }
    }
}

/// Execute Return statement
pub fn execute_return(vm: &mut VM, value: Option<&Expr>) -> Result<Step, DoError> {
    let value = match value {
        Some(expr) => match eval_or_suspend(vm, expr)? {
            Some(v) => v,
            None => return Ok(Step::Done),
        },
        None => Val::Null,
    };

    pop_frame(vm);
    vm.control = Control::Return(value);
    Ok(Step::Continue)
}

/// Execute Expr statement (value is discarded)
pub fn execute_expr(vm: &mut VM, expr: &Expr) -> Result<Step, DoError> {
    if eval_or_suspend(vm, expr)?.is_none() {
        return Ok(Step::Done);
    }

    pop_frame(vm);
    Ok(Step::Continue)
}

/// Execute Break / Continue: set control and let the loop unwind
pub fn execute_jump(vm: &mut VM, control: Control) -> Result<Step, DoError> {
    pop_frame(vm);
    vm.control = control;
    Ok(Step::Continue)
}
