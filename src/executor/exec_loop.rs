//! Core execution loop
//!
//! This module contains the step() function - the heart of the interpreter.
//! It processes one frame at a time, advancing execution phases and managing the frame stack.
//!
//! ## Function Organization
//! Functions are ordered by importance/call hierarchy:
//! 1. run_until_done() - Top-level driver (calls step repeatedly)
//! 2. step() - Main execution loop (dispatches to statement handlers)
//! 3. unwind() - Pops frames for return/break/continue

use tracing::trace;

use super::errors::{self, ErrorInfo};
use super::statements::{
    execute_assign, execute_block, execute_declare, execute_expr, execute_for, execute_if,
    execute_jump, execute_return, execute_while,
};
use super::types::{Control, FrameKind, Stmt};
use super::vm::{pop_frame, Step, VM};
use crate::error::DoError;

/* ===================== Public API ===================== */

/// Run the VM until it completes or suspends
///
/// This is the trampoline that repeatedly calls step() until execution
/// stops. Afterwards inspect `vm.control`: `Suspend` means a `yield` is
/// pending, `Return` carries the result, `None` means the body fell off
/// its end.
pub fn run_until_done(vm: &mut VM) -> Result<(), DoError> {
    let mut steps = 0u64;
    loop {
        match step(vm)? {
            Step::Continue => steps += 1,
            Step::Done => break,
        }
    }
    trace!(steps, suspended = vm.is_suspended(), "vm stopped");
    Ok(())
}

/// Execute one step of the VM
///
/// This is the core interpreter loop. It:
/// 1. Stops if the VM is suspended
/// 2. Unwinds if return/break/continue is active
/// 3. Gets the top frame and dispatches on its kind
pub fn step(vm: &mut VM) -> Result<Step, DoError> {
    match vm.control {
        Control::None => {}
        Control::Suspend { .. } => return Ok(Step::Done),
        Control::Return(_) | Control::Break | Control::Continue => return unwind(vm),
    }

    // Get top frame (if any)
    let Some(frame) = vm.frames.last() else {
        // No frames left - execution complete
        return Ok(Step::Done);
    };

    // Clone frame data we need (to avoid borrow checker issues)
    let (kind, node) = (frame.kind.clone(), frame.node.clone());

    // Dispatch to statement handler
    match (kind, &node) {
        (FrameKind::Block { idx }, Stmt::Block { body, .. }) => execute_block(vm, idx, body),

        (FrameKind::Declare, Stmt::Declare { name, init, .. }) => {
            execute_declare(vm, name, init.as_ref())
        }

        (FrameKind::Assign, Stmt::Assign { var, value, .. }) => execute_assign(vm, var, value),

        (
            FrameKind::If { phase },
            Stmt::If {
                test,
                then_s,
                else_s,
                ..
            },
        ) => execute_if(vm, phase, test, then_s, else_s.as_deref()),

        (FrameKind::While, Stmt::While { test, body, .. }) => execute_while(vm, test, body),

        (
            FrameKind::For { phase, items, idx },
            Stmt::ForLoop {
                binding,
                iterable,
                body,
                ..
            },
        ) => execute_for(vm, phase, items, idx, binding, iterable, body),

        (FrameKind::Return, Stmt::Return { value, .. }) => execute_return(vm, value.as_ref()),

        (FrameKind::Expr, Stmt::Expr { expr, .. }) => execute_expr(vm, expr),

        (FrameKind::Break, Stmt::Break { .. }) => execute_jump(vm, Control::Break),

        (FrameKind::Continue, Stmt::Continue { .. }) => execute_jump(vm, Control::Continue),

        // Frames are only ever pushed by push_stmt, which pairs kinds with nodes
        (kind, node) => unreachable!("frame kind {:?} does not match statement {:?}", kind, node),
    }
}

/* ===================== Control Flow ===================== */

/// Unwind the stack when control flow is active
///
/// Return pops everything. Break pops up to and including the nearest loop;
/// Continue pops up to the loop and leaves it on the stack to run its next
/// iteration.
fn unwind(vm: &mut VM) -> Result<Step, DoError> {
    if let Control::Return(_) = vm.control {
        while !vm.frames.is_empty() {
            pop_frame(vm);
        }
        return Ok(Step::Done);
    }

    let is_break = vm.control == Control::Break;

    loop {
        let Some(frame) = vm.frames.last() else {
            let keyword = if is_break { "break" } else { "continue" };
            return Err(ErrorInfo::new(
                errors::INVALID_CONTROL,
                format!("'{}' used outside of a loop", keyword),
            )
            .into());
        };

        if frame.kind.is_loop() {
            if is_break {
                pop_frame(vm);
            }
            vm.control = Control::None;
            return Ok(Step::Continue);
        }

        pop_frame(vm);
    }
}
