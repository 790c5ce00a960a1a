//! Test helpers for executor tests
//!
//! Common utilities for parsing bodies and building VMs

use std::collections::HashMap;

use crate::executor::{run_until_done, stdlib, Control, Stmt, Val, VM};
use crate::parser::semantic_validator::validate_function;
use crate::parser::{self, FunctionDef};

/// Parse a bare body, validate it, round-trip it through JSON and build a VM
///
/// `locals` play the role of parameters: they are in scope for validation
/// and bound in the VM's local scope.
pub fn parse_and_build_vm(source: &str, locals: HashMap<String, Val>) -> VM {
    let body = parser::parse(source).expect("Parse failed");
    let def = FunctionDef {
        name: "test".to_string(),
        params: locals.keys().cloned().collect(),
        body,
        span: Default::default(),
    };

    let errors = validate_function(&def, source, &stdlib::global_names());
    let validation_errors: Vec<_> = errors.iter().filter(|e| e.is_error()).collect();
    assert!(
        validation_errors.is_empty(),
        "Validation failed: {:?}",
        validation_errors
    );

    VM::new(round_trip(def.body), stdlib::globals(), locals)
}

/// Parse a bare body WITHOUT validation, for testing runtime error behavior
///
/// Use this for programs the validator would reject (undefined variables,
/// nested yields) to check that the runtime still fails cleanly.
pub fn parse_without_validation(source: &str, locals: HashMap<String, Val>) -> VM {
    let body = parser::parse(source).expect("Parse failed");
    VM::new(round_trip(body), stdlib::globals(), locals)
}

/// Run a body with no locals to completion and return the final control
pub fn run(source: &str) -> Control {
    let mut vm = parse_and_build_vm(source, HashMap::new());
    run_until_done(&mut vm).expect("Execution failed");
    vm.control
}

fn round_trip(body: Stmt) -> Stmt {
    let json = serde_json::to_string(&body).expect("Serialization failed");
    serde_json::from_str(&json).expect("Deserialization failed")
}
