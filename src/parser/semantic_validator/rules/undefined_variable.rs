//! Rule: Undefined Variable
//!
//! Reports an error when a variable is used before it's declared, or
//! assigned without ever being declared.
//!
//! # Examples
//!
//! ```text
//! // Error: 'x' is used before declaration
//! let y = x + 1
//! let x = 5
//! ```
//!
//! ```text
//! // OK: parameters, stdlib names and host functions are always in scope
//! do function f(n) {
//!     let s = yield State.get()
//!     return State.pure(n)
//! }
//! ```

use std::collections::HashSet;

use crate::executor::types::ast::{Expr, Stmt};
use crate::parser::FunctionDef;

use super::super::{ValidationError, ValidationRule};

/// Rule that checks for undefined variable usage.
pub struct UndefinedVariableRule {
    globals: HashSet<String>,
}

impl UndefinedVariableRule {
    pub fn new(globals: HashSet<String>) -> Self {
        Self { globals }
    }
}

impl ValidationRule for UndefinedVariableRule {
    fn id(&self) -> &'static str {
        "undefined-variable"
    }

    fn description(&self) -> &'static str {
        "Variables must be declared before use"
    }

    fn validate(&self, def: &FunctionDef, _source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        let mut scope = Scope {
            defined: self.globals.clone(),
        };

        for param in &def.params {
            scope.define(param);
        }

        check_stmt(&def.body, &mut scope, &mut errors, self.id());

        errors
    }
}

// ============================================================================
// Scope Tracking
// ============================================================================

/// Tracks variables in scope.
struct Scope {
    defined: HashSet<String>,
}

impl Scope {
    fn define(&mut self, name: &str) {
        self.defined.insert(name.to_string());
    }

    fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    /// Create a child scope (for blocks, loops, etc.)
    fn child(&self) -> Self {
        Self {
            defined: self.defined.clone(),
        }
    }
}

// ============================================================================
// AST Traversal
// ============================================================================

fn check_stmt(
    stmt: &Stmt,
    scope: &mut Scope,
    errors: &mut Vec<ValidationError>,
    rule_id: &'static str,
) {
    match stmt {
        Stmt::Declare { name, init, .. } => {
            // Initializer first, so `let x = x + 1` is caught
            if let Some(init_expr) = init {
                check_expr(init_expr, scope, errors, rule_id);
            }
            scope.define(name);
        }

        Stmt::Assign {
            var,
            var_span,
            value,
            ..
        } => {
            check_expr(value, scope, errors, rule_id);
            if !scope.is_defined(var) {
                errors.push(ValidationError::error(
                    *var_span,
                    format!("Cannot assign to undeclared variable '{}'", var),
                    rule_id,
                ));
            }
        }

        Stmt::If {
            test,
            then_s,
            else_s,
            ..
        } => {
            check_expr(test, scope, errors, rule_id);

            let mut then_scope = scope.child();
            check_stmt(then_s, &mut then_scope, errors, rule_id);

            if let Some(else_stmt) = else_s {
                let mut else_scope = scope.child();
                check_stmt(else_stmt, &mut else_scope, errors, rule_id);
            }
        }

        Stmt::While { test, body, .. } => {
            check_expr(test, scope, errors, rule_id);

            let mut body_scope = scope.child();
            check_stmt(body, &mut body_scope, errors, rule_id);
        }

        Stmt::ForLoop {
            binding,
            iterable,
            body,
            ..
        } => {
            check_expr(iterable, scope, errors, rule_id);

            let mut body_scope = scope.child();
            body_scope.define(binding);
            check_stmt(body, &mut body_scope, errors, rule_id);
        }

        Stmt::Block { body, .. } => {
            let mut block_scope = scope.child();
            for stmt in body {
                check_stmt(stmt, &mut block_scope, errors, rule_id);
            }
        }

        Stmt::Return { value, .. } => {
            if let Some(expr) = value {
                check_expr(expr, scope, errors, rule_id);
            }
        }

        Stmt::Expr { expr, .. } => {
            check_expr(expr, scope, errors, rule_id);
        }

        Stmt::Break { .. } | Stmt::Continue { .. } => {}
    }
}

fn check_expr(expr: &Expr, scope: &Scope, errors: &mut Vec<ValidationError>, rule_id: &'static str) {
    match expr {
        Expr::Ident { name, span } => {
            if !scope.is_defined(name) {
                errors.push(ValidationError::error(
                    *span,
                    format!("Undefined variable '{}'", name),
                    rule_id,
                ));
            }
        }

        // Only the object, never the property
        Expr::Member { object, .. } => {
            check_expr(object, scope, errors, rule_id);
        }

        Expr::Builtin { args, .. } => {
            for arg in args {
                check_expr(arg, scope, errors, rule_id);
            }
        }

        Expr::Call { callee, args, .. } => {
            check_expr(callee, scope, errors, rule_id);
            for arg in args {
                check_expr(arg, scope, errors, rule_id);
            }
        }

        Expr::Yield { inner, .. } => {
            check_expr(inner, scope, errors, rule_id);
        }

        Expr::BinaryOp { left, right, .. } => {
            check_expr(left, scope, errors, rule_id);
            check_expr(right, scope, errors, rule_id);
        }

        Expr::Ternary {
            condition,
            consequent,
            alternate,
            ..
        } => {
            check_expr(condition, scope, errors, rule_id);
            check_expr(consequent, scope, errors, rule_id);
            check_expr(alternate, scope, errors, rule_id);
        }

        Expr::LitList { elements, .. } => {
            for element in elements {
                check_expr(element, scope, errors, rule_id);
            }
        }

        Expr::LitObj { properties, .. } => {
            for (_, _, value) in properties {
                check_expr(value, scope, errors, rule_id);
            }
        }

        Expr::LitBool { .. } | Expr::LitNum { .. } | Expr::LitStr { .. } | Expr::LitNull { .. } => {
        }
    }
}
