//! Type definitions for the executor
//!
//! This module contains all the core types used by the executor:
//! - AST nodes (Stmt, Expr)
//! - Runtime values (Val)
//! - Control flow (Control, Frame, FrameKind)
//! - Execution phases for multi-step statements

pub mod ast;
pub mod control;
pub mod phase;
pub mod values;

// Re-export all types for convenient access
pub use ast::{BinaryOp, Expr, Op, Span, Stmt};
pub use control::{Control, Frame, FrameKind};
pub use phase::*;
pub use values::{NativeFn, Val};
