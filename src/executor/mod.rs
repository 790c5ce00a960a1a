//! # Executor - Resumable Stack-Driven Interpreter
//!
//! Runs a `do function` body one statement at a time. All state lives in
//! `VM::frames` and `VM::scopes`, so a run can stop at any `yield` and be
//! picked up later with `VM::resume`.
//!
//! ## Core Principles
//!
//! 1. **Stack-driven execution**: no recursion over statements
//! 2. **Centralized control flow**: `Control` manages break/continue/return/suspend
//! 3. **Snapshot resumption**: a suspended `VM` is a plain value; cloning it
//!    and resuming the clone leaves the original untouched, which is what
//!    lets the same suspension point be resumed any number of times
//! 4. **Pure executor**: knows nothing about monads, it only reports which
//!    operand a `yield` handed out

pub mod errors;
pub mod exec_loop;
pub mod expressions;
pub mod statements;
pub mod stdlib;
pub mod types;
pub mod vm;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use exec_loop::{run_until_done, step};
pub use expressions::EvalResult;
pub use types::{Control, Expr, NativeFn, Span, Stmt, Val};
pub use vm::{Step, VM};
