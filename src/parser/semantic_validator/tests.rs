//! Tests for the semantic validation system

use super::*;
use crate::executor::stdlib;
use crate::parser::{parse, parse_function};

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse a bare body and validate it as a parameterless function
fn validate(source: &str) -> Vec<ValidationError> {
    let body = parse(source).expect("Parse should succeed");
    let def = FunctionDef {
        name: "test".to_string(),
        params: vec![],
        body,
        span: Default::default(),
    };
    validate_function(&def, source, &stdlib::global_names())
}

fn has_rule(errors: &[ValidationError], rule_id: &str) -> bool {
    errors.iter().any(|e| e.rule_id == rule_id)
}

fn for_rule<'a>(errors: &'a [ValidationError], rule_id: &str) -> Vec<&'a ValidationError> {
    errors.iter().filter(|e| e.rule_id == rule_id).collect()
}

// ============================================================================
// Undefined Variable Tests
// ============================================================================

#[test]
fn test_undefined_variable_simple() {
    let errors = validate("let y = x + 1\nreturn y");

    let undef_errors = for_rule(&errors, "undefined-variable");
    assert_eq!(undef_errors.len(), 1);
    assert!(undef_errors[0].message.contains("'x'"));
    assert!(undef_errors[0].is_error());
}

#[test]
fn test_undefined_variable_ok_when_declared() {
    let source = r#"
let x = 5
let y = x + 1
return y
"#;

    assert!(!has_rule(&validate(source), "undefined-variable"));
}

#[test]
fn test_undefined_variable_stdlib_ok() {
    let source = r#"
let s = yield State.get()
yield State.put(Set.add(s, 1))
return Maybe.just(!true)
"#;

    assert!(
        for_rule(&validate(source), "undefined-variable").is_empty(),
        "Stdlib names should not be flagged as undefined"
    );
}

#[test]
fn test_operator_names_are_not_globals() {
    // Operators are not reachable as functions
    let all = validate("return add(1, 2)");
    let errors = for_rule(&all, "undefined-variable");
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("add"));
}

#[test]
fn test_undefined_variable_self_reference() {
    assert!(has_rule(&validate("let x = x + 1"), "undefined-variable"));
}

#[test]
fn test_undefined_variable_assign_undeclared() {
    let errors = validate("total = 1");
    let undef_errors = for_rule(&errors, "undefined-variable");
    assert_eq!(undef_errors.len(), 1);
    assert!(undef_errors[0].message.contains("undeclared variable 'total'"));
}

#[test]
fn test_undefined_variable_block_scope() {
    let source = r#"
if (true) {
    let inner = 1
}
return inner
"#;

    assert!(has_rule(&validate(source), "undefined-variable"));
}

#[test]
fn test_undefined_variable_for_loop_binding() {
    let source = r#"
let items = [1, 2, 3]
for (let item of items) {
    let _doubled = item * 2
}
"#;

    assert!(
        for_rule(&validate(source), "undefined-variable").is_empty(),
        "For loop binding should be in scope"
    );
}

#[test]
fn test_params_are_in_scope() {
    let source = r#"
do function f(seed) {
    return State.pure(seed)
}
"#;
    let def = parse_function(source).unwrap();
    let errors = validate_function(&def, source, &stdlib::global_names());
    assert!(errors.is_empty(), "unexpected: {:?}", errors);
}

#[test]
fn test_host_functions_are_in_scope() {
    let source = r#"
do function f() {
    return State.pure(lookup(1))
}
"#;
    let def = parse_function(source).unwrap();

    let errors = validate_function(&def, source, &stdlib::global_names());
    assert!(has_rule(&errors, "undefined-variable"));

    let mut globals = stdlib::global_names();
    globals.push("lookup".to_string());
    assert!(validate_function(&def, source, &globals).is_empty());
}

// ============================================================================
// Nested Yield Tests
// ============================================================================

#[test]
fn test_yield_at_statement_level_ok() {
    let source = r#"
yield State.put(1)
let x = yield State.get()
x = yield State.get()
return yield State.pure(x)
"#;

    assert!(for_rule(&validate(source), "nested-yield").is_empty());
}

#[test]
fn test_yield_in_binary_op() {
    let errors = validate("let x = (yield State.get()) + 1\nreturn x");
    assert_eq!(for_rule(&errors, "nested-yield").len(), 1);
}

#[test]
fn test_yield_in_call_args_and_literals() {
    let source = r#"
let a = Set.add(yield State.get(), 1)
let b = [yield State.get()]
let c = {k: yield State.get()}
return [a, b, c]
"#;

    assert_eq!(for_rule(&validate(source), "nested-yield").len(), 3);
}

#[test]
fn test_yield_in_condition() {
    let source = r#"
if (yield State.get()) {
    return 1
}
while (yield State.get()) {
    break
}
"#;

    assert_eq!(for_rule(&validate(source), "nested-yield").len(), 2);
}

#[test]
fn test_yield_inside_yield() {
    let errors = validate("yield (yield State.get())");
    assert_eq!(for_rule(&errors, "nested-yield").len(), 1);
}

// ============================================================================
// Unused Variable Tests
// ============================================================================

#[test]
fn test_unused_variable_simple() {
    let errors = validate("let x = 5\nreturn 10");

    let unused_errors = for_rule(&errors, "unused-variable");
    assert_eq!(unused_errors.len(), 1);
    assert!(unused_errors[0].message.contains("'x'"));
    assert_eq!(unused_errors[0].severity, Severity::Warning);
}

#[test]
fn test_unused_variable_ok_when_used() {
    assert!(!has_rule(&validate("let x = 5\nreturn x"), "unused-variable"));
}

#[test]
fn test_unused_variable_underscore_prefix() {
    let source = r#"
let _ = yield State.put(1)
let _unused = 5
return 10
"#;

    assert!(
        for_rule(&validate(source), "unused-variable").is_empty(),
        "Underscore-prefixed variables should be exempt"
    );
}

// ============================================================================
// Validator Integration Tests
// ============================================================================

#[test]
fn test_errors_sorted_by_position() {
    let source = "let a = b\nlet c = (yield d) + 1";

    let errors = validate(source);
    let lines: Vec<usize> = errors.iter().map(|e| e.span.start_line).collect();
    let mut sorted = lines.clone();
    sorted.sort();
    assert_eq!(lines, sorted);
}

#[test]
fn test_display_includes_position_and_rule() {
    let errors = validate("\nlet y = missing");
    let undef = for_rule(&errors, "undefined-variable");
    assert_eq!(
        undef[0].to_string(),
        "error at line 2, col 9: Undefined variable 'missing' [undefined-variable]"
    );
}

#[test]
fn test_rules_listed() {
    let validator = Validator::new(Vec::<String>::new());
    let ids: Vec<_> = validator.rules().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["undefined-variable", "nested-yield", "unused-variable"]);
}
