//! Rule: Unused Variable
//!
//! Reports a warning when a variable is declared but never used.
//!
//! ```text
//! // Warning: 'x' is declared but never used
//! let x = yield State.get()
//! return State.pure(1)
//! ```
//!
//! Variables starting with `_` are exempt, so `let _ = yield State.put(s)`
//! is the way to bind a result on purpose and ignore it. Parameters are
//! never reported.

use std::collections::{HashMap, HashSet};

use crate::executor::types::ast::{Expr, Span, Stmt};
use crate::parser::FunctionDef;

use super::super::{ValidationError, ValidationRule};

/// Rule that checks for unused variable declarations.
pub struct UnusedVariableRule;

impl ValidationRule for UnusedVariableRule {
    fn id(&self) -> &'static str {
        "unused-variable"
    }

    fn description(&self) -> &'static str {
        "Variables should be used after declaration"
    }

    fn validate(&self, def: &FunctionDef, _source: &str) -> Vec<ValidationError> {
        let mut declarations: HashMap<String, Span> = HashMap::new();
        collect_declarations(&def.body, &mut declarations);

        let mut usages: HashSet<String> = HashSet::new();
        collect_usages(&def.body, &mut usages);

        let mut errors: Vec<ValidationError> = declarations
            .into_iter()
            .filter(|(name, _)| !name.starts_with('_') && !usages.contains(name))
            .map(|(name, span)| {
                ValidationError::warning(
                    span,
                    format!("Variable '{}' is declared but never used", name),
                    self.id(),
                )
            })
            .collect();
        errors.sort_by_key(|e| e.span.start);
        errors
    }
}

// ============================================================================
// Declaration Collection
// ============================================================================

fn collect_declarations(stmt: &Stmt, declarations: &mut HashMap<String, Span>) {
    match stmt {
        Stmt::Declare {
            name, name_span, ..
        } => {
            declarations.insert(name.clone(), *name_span);
        }

        Stmt::ForLoop {
            binding,
            binding_span,
            body,
            ..
        } => {
            declarations.insert(binding.clone(), *binding_span);
            collect_declarations(body, declarations);
        }

        Stmt::Block { body, .. } => {
            for s in body {
                collect_declarations(s, declarations);
            }
        }

        Stmt::If { then_s, else_s, .. } => {
            collect_declarations(then_s, declarations);
            if let Some(else_stmt) = else_s {
                collect_declarations(else_stmt, declarations);
            }
        }

        Stmt::While { body, .. } => {
            collect_declarations(body, declarations);
        }

        Stmt::Assign { .. }
        | Stmt::Return { .. }
        | Stmt::Expr { .. }
        | Stmt::Break { .. }
        | Stmt::Continue { .. } => {}
    }
}

// ============================================================================
// Usage Collection
// ============================================================================

fn collect_usages(stmt: &Stmt, usages: &mut HashSet<String>) {
    match stmt {
        Stmt::Declare { init, .. } => {
            if let Some(expr) = init {
                collect_expr_usages(expr, usages);
            }
        }

        Stmt::Assign { var, value, .. } => {
            // Assignment to a variable counts as usage
            usages.insert(var.clone());
            collect_expr_usages(value, usages);
        }

        Stmt::If {
            test,
            then_s,
            else_s,
            ..
        } => {
            collect_expr_usages(test, usages);
            collect_usages(then_s, usages);
            if let Some(else_stmt) = else_s {
                collect_usages(else_stmt, usages);
            }
        }

        Stmt::While { test, body, .. } => {
            collect_expr_usages(test, usages);
            collect_usages(body, usages);
        }

        Stmt::ForLoop { iterable, body, .. } => {
            collect_expr_usages(iterable, usages);
            collect_usages(body, usages);
        }

        Stmt::Block { body, .. } => {
            for s in body {
                collect_usages(s, usages);
            }
        }

        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                collect_expr_usages(expr, usages);
            }
        }

        Stmt::Expr { expr, .. } => {
            collect_expr_usages(expr, usages);
        }

        Stmt::Break { .. } | Stmt::Continue { .. } => {}
    }
}

fn collect_expr_usages(expr: &Expr, usages: &mut HashSet<String>) {
    match expr {
        Expr::Ident { name, .. } => {
            usages.insert(name.clone());
        }

        Expr::Member { object, .. } => {
            collect_expr_usages(object, usages);
        }

        Expr::Builtin { args, .. } => {
            for arg in args {
                collect_expr_usages(arg, usages);
            }
        }

        Expr::Call { callee, args, .. } => {
            collect_expr_usages(callee, usages);
            for arg in args {
                collect_expr_usages(arg, usages);
            }
        }

        Expr::Yield { inner, .. } => {
            collect_expr_usages(inner, usages);
        }

        Expr::BinaryOp { left, right, .. } => {
            collect_expr_usages(left, usages);
            collect_expr_usages(right, usages);
        }

        Expr::Ternary {
            condition,
            consequent,
            alternate,
            ..
        } => {
            collect_expr_usages(condition, usages);
            collect_expr_usages(consequent, usages);
            collect_expr_usages(alternate, usages);
        }

        Expr::LitList { elements, .. } => {
            for element in elements {
                collect_expr_usages(element, usages);
            }
        }

        Expr::LitObj { properties, .. } => {
            for (_, _, value) in properties {
                collect_expr_usages(value, usages);
            }
        }

        Expr::LitBool { .. } | Expr::LitNum { .. } | Expr::LitStr { .. } | Expr::LitNull { .. } => {
        }
    }
}
