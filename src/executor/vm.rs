//! Virtual Machine state
//!
//! The VM holds all execution state:
//! - frames: Stack of active statements
//! - control: Current control flow state (return, break, suspend, ...)
//! - scopes: Variable bindings, innermost last
//! - resume_value: Plain value handed back by the do-runner after a suspend

use std::collections::HashMap;

use super::errors::{self, ErrorInfo};
use super::types::{Control, ForPhase, Frame, FrameKind, IfPhase, Stmt, Val};

/* ===================== VM ===================== */

/// Virtual Machine state
///
/// This contains everything needed to execute (and resume) a body. Cloning a
/// suspended VM yields an independent continuation of the same suspension
/// point.
#[derive(Debug, Clone)]
pub struct VM {
    /// Stack of execution frames
    pub frames: Vec<Frame>,

    /// Current control flow state
    pub control: Control,

    /// Scope stack: globals, function locals, then one per open block
    pub scopes: Vec<HashMap<String, Val>>,

    /// Value the pending `yield` evaluates to once execution resumes
    pub resume_value: Option<Val>,
}

impl VM {
    /// Create a new VM with a program
    ///
    /// `globals` holds the stdlib and host functions, `locals` the bound
    /// parameters. The program is wrapped in a root frame; nothing executes
    /// until `step()` or `run_until_done()` is called.
    pub fn new(program: Stmt, globals: HashMap<String, Val>, locals: HashMap<String, Val>) -> Self {
        let mut vm = VM {
            frames: vec![],
            control: Control::None,
            scopes: vec![globals, locals],
            resume_value: None,
        };

        push_stmt(&mut vm, &program);

        vm
    }

    /// Resume a suspended VM with the result of its pending `yield`
    ///
    /// Returns false (and changes nothing) if the VM is not suspended.
    pub fn resume(&mut self, value: Val) -> bool {
        if !self.is_suspended() {
            return false;
        }

        self.control = Control::None;
        self.resume_value = Some(value);
        true
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self.control, Control::Suspend { .. })
    }

    /// Look a variable up, innermost scope first
    pub fn lookup(&self, name: &str) -> Option<&Val> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Bind a new variable in the innermost scope
    pub fn define(&mut self, name: &str, value: Val) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), value);
        }
    }

    /// Overwrite an existing variable in the nearest scope that declares it
    pub fn assign(&mut self, name: &str, value: Val) -> Result<(), ErrorInfo> {
        match self
            .scopes
            .iter_mut()
            .rev()
            .find(|scope| scope.contains_key(name))
        {
            Some(scope) => {
                scope.insert(name.to_string(), value);
                Ok(())
            }
            None => Err(ErrorInfo::new(
                errors::UNDEFINED_VARIABLE,
                format!("Cannot assign to undeclared variable '{}'", name),
            )),
        }
    }
}

/* ===================== Frame Management ===================== */

/// Push a new frame for a statement onto the stack
///
/// This determines the initial phase based on the statement type. Blocks
/// open a scope of their own; it is closed again when the frame is popped.
pub fn push_stmt(vm: &mut VM, stmt: &Stmt) {
    let scope_depth = vm.scopes.len();

    let kind = match stmt {
        Stmt::Block { .. } => {
            vm.scopes.push(HashMap::new());
            FrameKind::Block { idx: 0 }
        }
        Stmt::Declare { .. } => FrameKind::Declare,
        Stmt::Assign { .. } => FrameKind::Assign,
        Stmt::If { .. } => FrameKind::If {
            phase: IfPhase::Eval,
        },
        Stmt::While { .. } => FrameKind::While,
        Stmt::ForLoop { .. } => FrameKind::For {
            phase: ForPhase::Eval,
            items: vec![],
            idx: 0,
        },
        Stmt::Return { .. } => FrameKind::Return,
        Stmt::Expr { .. } => FrameKind::Expr,
        Stmt::Break { .. } => FrameKind::Break,
        Stmt::Continue { .. } => FrameKind::Continue,
    };

    vm.frames.push(Frame {
        kind,
        scope_depth,
        node: stmt.clone(),
    });
}

/// Pop the top frame and close any scopes it opened
pub fn pop_frame(vm: &mut VM) {
    if let Some(frame) = vm.frames.pop() {
        vm.scopes.truncate(frame.scope_depth);
    }
}

/* ===================== Step Result ===================== */

/// Result of executing one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Continue to next step
    Continue,
    /// Execution complete or suspended; inspect `vm.control`
    Done,
}
