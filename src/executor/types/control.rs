//! Control flow and execution frame types

use super::ast::{Span, Stmt};
use super::phase::{ForPhase, IfPhase};
use super::values::Val;

/* ===================== Control Flow ===================== */

/// Control flow state
///
/// This represents active control flow (return, break, continue, suspend).
/// When control is Return/Break/Continue, the VM unwinds the stack to find
/// the appropriate handler. For Suspend, the VM stops with its frames intact
/// so it can be resumed (or cloned and resumed more than once).
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    None,
    Break,
    Continue,
    Return(Val),
    /// Stopped at a `yield`; `operand` goes to the do-runner
    Suspend { operand: Val, span: Span },
}

/* ===================== Frames ===================== */

/// Frame kind - the type and state of a statement being executed
#[derive(Debug, Clone)]
pub enum FrameKind {
    Block { idx: usize },
    Declare,
    Assign,
    If { phase: IfPhase },
    While,
    For { phase: ForPhase, items: Vec<Val>, idx: usize },
    Return,
    Expr,
    Break,
    Continue,
}

impl FrameKind {
    pub fn is_loop(&self) -> bool {
        matches!(self, FrameKind::While | FrameKind::For { .. })
    }
}

/// Execution frame - one per active statement
///
/// The frame stack replaces the system call stack, so a suspended VM is a
/// plain value that can be cloned and resumed.
#[derive(Debug, Clone)]
pub struct Frame {
    /// The kind and state of this frame
    pub kind: FrameKind,

    /// Number of scopes that were live when this frame was pushed
    pub scope_depth: usize,

    /// The AST node (statement) this frame represents
    pub node: Stmt,
}
