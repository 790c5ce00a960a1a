//! Tests for plain execution: literals, operators, scoping and control flow

use super::helpers::{parse_and_build_vm, parse_without_validation, run};
use crate::executor::{run_until_done, step, Control, Step, Val};
use maplit::hashmap;
use std::collections::HashMap;

/* ===================== Literals & Operators ===================== */

#[test]
fn test_return_literals() {
    assert_eq!(run("return 42"), Control::Return(Val::Num(42.0)));
    assert_eq!(run("return 'hi'"), Control::Return(Val::Str("hi".into())));
    assert_eq!(run("return null"), Control::Return(Val::Null));
    assert_eq!(
        run("return [1, true]"),
        Control::Return(Val::List(vec![Val::Num(1.0), Val::Bool(true)]))
    );
}

#[test]
fn test_object_literal_and_member_access() {
    let source = r#"
let point = {x: 1, y: 2}
return point.x + point.y
"#;
    assert_eq!(run(source), Control::Return(Val::Num(3.0)));
}

#[test]
fn test_length_property() {
    assert_eq!(
        run("return [1, 2, 3].length + 'ab'.length"),
        Control::Return(Val::Num(5.0))
    );
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(run("return 2 + 3 * 4 - 10 / 5"), Control::Return(Val::Num(12.0)));
    assert_eq!(run("return (2 + 3) * 4 % 7"), Control::Return(Val::Num(6.0)));
    assert_eq!(run("return -(1 + 2)"), Control::Return(Val::Num(-3.0)));
}

#[test]
fn test_logical_short_circuit() {
    // The right side would fail if it were evaluated
    for (source, expected) in [
        ("return false && nope()", Val::Bool(false)),
        ("return 1 || nope()", Val::Num(1.0)),
    ] {
        let mut vm = parse_without_validation(source, HashMap::new());
        run_until_done(&mut vm).unwrap();
        assert_eq!(vm.control, Control::Return(expected));
    }
    assert_eq!(run("return null || 'fallback'"), Control::Return(Val::Str("fallback".into())));
}

#[test]
fn test_ternary() {
    assert_eq!(
        run("let n = 7\nreturn n % 2 == 0 ? 'even' : 'odd'"),
        Control::Return(Val::Str("odd".into()))
    );
}

/* ===================== Variables & Scope ===================== */

#[test]
fn test_locals_are_bound() {
    let mut vm = parse_and_build_vm("return seed * 2", hashmap! {
        "seed".to_string() => Val::Num(21.0),
    });
    run_until_done(&mut vm).unwrap();
    assert_eq!(vm.control, Control::Return(Val::Num(42.0)));
}

#[test]
fn test_assignment_updates_outer_scope() {
    let source = r#"
let total = 0
if (true) {
    total = total + 5
}
return total
"#;
    assert_eq!(run(source), Control::Return(Val::Num(5.0)));
}

#[test]
fn test_block_scope_is_closed() {
    let source = r#"
let x = 1
{
    let x = 2
    x = 3
}
return x
"#;
    assert_eq!(run(source), Control::Return(Val::Num(1.0)));
}

/* ===================== Control Flow ===================== */

#[test]
fn test_if_else() {
    let source = r#"
let n = 3
if (n > 5) {
    return "big"
} else if (n > 1) {
    return "medium"
} else {
    return "small"
}
"#;
    assert_eq!(run(source), Control::Return(Val::Str("medium".into())));
}

#[test]
fn test_while_with_break_and_continue() {
    let source = r#"
let i = 0
let evens = 0
while (true) {
    i = i + 1
    if (i > 10) { break }
    if (i % 2 == 1) { continue }
    evens = evens + 1
}
return evens
"#;
    assert_eq!(run(source), Control::Return(Val::Num(5.0)));
}

#[test]
fn test_for_of_list_and_set() {
    let source = r#"
let sum = 0
for (let n of [1, 2, 3]) {
    sum = sum + n
}
for (let n of Set.of([10, 10, 20])) {
    sum = sum + n
}
return sum
"#;
    assert_eq!(run(source), Control::Return(Val::Num(36.0)));
}

#[test]
fn test_return_inside_loop() {
    let source = r#"
for (let n of [5, 6, 7]) {
    if (n == 6) {
        return n
    }
}
return null
"#;
    assert_eq!(run(source), Control::Return(Val::Num(6.0)));
}

#[test]
fn test_fall_off_end() {
    let mut vm = parse_and_build_vm("let _x = 1", HashMap::new());
    run_until_done(&mut vm).unwrap();
    assert_eq!(vm.control, Control::None);
    assert!(vm.frames.is_empty());
}

#[test]
fn test_step_by_step() {
    let mut vm = parse_and_build_vm("let a = 1\nreturn a", HashMap::new());

    // Block -> Declare -> Block -> Return -> unwind
    let mut steps = 0;
    while step(&mut vm).unwrap() == Step::Continue {
        steps += 1;
        assert!(steps < 100, "runaway execution");
    }
    assert_eq!(vm.control, Control::Return(Val::Num(1.0)));
    assert!(vm.frames.is_empty());
    // Only globals and locals remain
    assert_eq!(vm.scopes.len(), 2);
}
