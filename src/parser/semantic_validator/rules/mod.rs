//! Validation Rules
//!
//! Each file in this module contains one validation rule:
//!
//! - `undefined_variable.rs` - Variables used before declaration
//! - `nested_yield.rs` - `yield` nested inside another expression
//! - `unused_variable.rs` - Variables declared but never used

mod nested_yield;
mod undefined_variable;
mod unused_variable;

pub use nested_yield::NestedYieldRule;
pub use undefined_variable::UndefinedVariableRule;
pub use unused_variable::UnusedVariableRule;
