//! Rule: Nested Yield
//!
//! Reports an error when `yield` appears inside an expression rather than
//! as the outermost expression of a statement. A suspended statement is
//! re-run when the computation resumes, so only one `yield` per statement,
//! in outermost position, can be resumed correctly.
//!
//! # Valid
//!
//! ```text
//! yield State.put(s)
//! let x = yield State.get()
//! x = yield Maybe.just(1)
//! return yield List.of([1, 2])
//! ```
//!
//! # Invalid
//!
//! ```text
//! let x = (yield m) + 1        // yield inside binary op
//! f(yield m)                   // yield inside call args
//! [yield m]                    // yield inside array
//! if (yield m) { }             // yield in condition
//! yield (yield m)              // yield inside yield
//! ```

use crate::executor::types::ast::{Expr, Stmt};
use crate::parser::FunctionDef;

use super::super::{ValidationError, ValidationRule};

/// Rule that checks for yield expressions nested inside other expressions.
pub struct NestedYieldRule;

impl ValidationRule for NestedYieldRule {
    fn id(&self) -> &'static str {
        "nested-yield"
    }

    fn description(&self) -> &'static str {
        "yield must be the outermost expression of a statement"
    }

    fn validate(&self, def: &FunctionDef, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        check_stmt(&def.body, &mut errors, self.id());
        errors
    }
}

// ============================================================================
// AST Traversal
// ============================================================================

/// Check a statement, allowing yield at "top level" positions
fn check_stmt(stmt: &Stmt, errors: &mut Vec<ValidationError>, rule_id: &'static str) {
    match stmt {
        // These ALLOW yield as the outermost expression
        Stmt::Expr { expr, .. } | Stmt::Assign { value: expr, .. } => {
            check_top_level_expr(expr, errors, rule_id);
        }

        Stmt::Declare {
            init: Some(expr), ..
        }
        | Stmt::Return {
            value: Some(expr), ..
        } => {
            check_top_level_expr(expr, errors, rule_id);
        }

        // These DON'T allow yield in their expressions
        Stmt::If {
            test,
            then_s,
            else_s,
            ..
        } => {
            check_nested_expr(test, errors, rule_id);
            check_stmt(then_s, errors, rule_id);
            if let Some(else_stmt) = else_s {
                check_stmt(else_stmt, errors, rule_id);
            }
        }

        Stmt::While { test, body, .. } => {
            check_nested_expr(test, errors, rule_id);
            check_stmt(body, errors, rule_id);
        }

        Stmt::ForLoop { iterable, body, .. } => {
            check_nested_expr(iterable, errors, rule_id);
            check_stmt(body, errors, rule_id);
        }

        Stmt::Block { body, .. } => {
            for stmt in body {
                check_stmt(stmt, errors, rule_id);
            }
        }

        Stmt::Declare { init: None, .. }
        | Stmt::Return { value: None, .. }
        | Stmt::Break { .. }
        | Stmt::Continue { .. } => {}
    }
}

/// The outermost yield is fine; anything inside it is nested.
fn check_top_level_expr(expr: &Expr, errors: &mut Vec<ValidationError>, rule_id: &'static str) {
    match expr {
        Expr::Yield { inner, .. } => check_nested_expr(inner, errors, rule_id),
        _ => check_nested_expr(expr, errors, rule_id),
    }
}

/// Check an expression where yield is NOT allowed.
fn check_nested_expr(expr: &Expr, errors: &mut Vec<ValidationError>, rule_id: &'static str) {
    match expr {
        Expr::Yield { span, inner } => {
            errors.push(ValidationError::error(
                *span,
                "yield must be the outermost expression of a statement",
                rule_id,
            ));
            // Report every nested yield, not just the first
            check_nested_expr(inner, errors, rule_id);
        }

        Expr::BinaryOp { left, right, .. } => {
            check_nested_expr(left, errors, rule_id);
            check_nested_expr(right, errors, rule_id);
        }

        Expr::Ternary {
            condition,
            consequent,
            alternate,
            ..
        } => {
            check_nested_expr(condition, errors, rule_id);
            check_nested_expr(consequent, errors, rule_id);
            check_nested_expr(alternate, errors, rule_id);
        }

        Expr::Builtin { args, .. } => {
            for arg in args {
                check_nested_expr(arg, errors, rule_id);
            }
        }

        Expr::Call { callee, args, .. } => {
            check_nested_expr(callee, errors, rule_id);
            for arg in args {
                check_nested_expr(arg, errors, rule_id);
            }
        }

        Expr::Member { object, .. } => {
            check_nested_expr(object, errors, rule_id);
        }

        Expr::LitList { elements, .. } => {
            for element in elements {
                check_nested_expr(element, errors, rule_id);
            }
        }

        Expr::LitObj { properties, .. } => {
            for (_, _, value) in properties {
                check_nested_expr(value, errors, rule_id);
            }
        }

        Expr::Ident { .. }
        | Expr::LitBool { .. }
        | Expr::LitNum { .. }
        | Expr::LitStr { .. }
        | Expr::LitNull { .. } => {}
    }
}
