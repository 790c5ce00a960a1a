//! End-to-end scenario: a body that collects even numbers into a State
//! context through a host function.

use std::cell::Cell;
use std::rc::Rc;

use donotation_core::{DoError, Program, State, Val};

const EXAMPLE: &str = r#"
do function example(init) {
    let x = yield collect_even_numbers(init + 1)
    let y = x + 1
    let z = yield collect_even_numbers(y + 1)
    return collect_even_numbers(z + 1)
}
"#;

const BROKEN: &str = r#"
do function example(init) {
    let x = yield collect_even_numbers(init + 1)
    let y = yield x + 1
    return collect_even_numbers(y + 1)
}
"#;

/// Adds `n` to the context set when it is even and produces `n`.
fn collect_even_numbers(args: &[Val]) -> Result<Val, DoError> {
    let n = args.first().cloned().unwrap_or(Val::Null);
    Ok(State::new(move |ctx| {
        let is_even = n.as_num().map(|v| v % 2.0 == 0.0).unwrap_or(false);
        let ctx = match (ctx, is_even) {
            (Val::Set(items), true) => Val::set_of(items.into_iter().chain([n.clone()])),
            (ctx, _) => ctx,
        };
        Ok((ctx, n.clone()))
    })
    .into_val())
}

fn program(source: &str) -> Program {
    Program::parse(source)
        .unwrap()
        .with_native("collect_even_numbers", collect_even_numbers)
}

#[test]
fn test_happy_path_collects_evens() {
    let example = program(EXAMPLE).compile().unwrap();
    let composed = example.call(&[Val::Num(3.0)]).unwrap();

    let (ctx, value) = State::from_val(&composed)
        .unwrap()
        .run(Val::set_of([]))
        .unwrap();
    assert_eq!(value, Val::Num(7.0));
    assert_eq!(ctx, Val::set_of([Val::Num(6.0), Val::Num(4.0)]));
}

#[test]
fn test_plain_yield_fails_when_run() {
    let example = program(BROKEN).compile().unwrap();

    // The first operand is fine, so building succeeds
    let composed = example.call(&[Val::Num(3.0)]).unwrap();

    let err = State::from_val(&composed)
        .unwrap()
        .run(Val::set_of([]))
        .unwrap_err();
    assert!(err.is_capability_violation());
    match err {
        DoError::NotBindable { index, found, at } => {
            assert_eq!(index, 2);
            assert_eq!(found, "number `5`");
            assert_eq!(at.map(|span| span.start_line), Some(3));
        }
        other => panic!("Expected NotBindable, got {:?}", other),
    }
}

#[test]
fn test_plain_first_yield_fails_at_call() {
    let source = r#"
do function example(init) {
    let x = yield init
    return collect_even_numbers(x)
}
"#;
    let example = program(source).compile().unwrap();
    let err = example.call(&[Val::Num(3.0)]).unwrap_err();
    assert!(matches!(err, DoError::NotBindable { index: 1, .. }));
}

#[test]
fn test_running_twice_replays_effects() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let example = Program::parse(EXAMPLE)
        .unwrap()
        .with_native("collect_even_numbers", move |args| {
            counter.set(counter.get() + 1);
            collect_even_numbers(args)
        })
        .compile()
        .unwrap();

    let composed = State::from_val(&example.call(&[Val::Num(3.0)]).unwrap()).unwrap();
    // The first host call happens while building
    assert_eq!(calls.get(), 1);

    let first = composed.run(Val::set_of([])).unwrap();
    let after_first = calls.get();
    let second = composed.run(Val::set_of([])).unwrap();

    assert_eq!(first, second);
    assert_eq!(calls.get() - after_first, after_first - 1);
}

#[test]
fn test_calls_build_independent_values() {
    let example = program(EXAMPLE).compile().unwrap();
    let from_three = State::from_val(&example.call(&[Val::Num(3.0)]).unwrap()).unwrap();
    let from_one = State::from_val(&example.call(&[Val::Num(1.0)]).unwrap()).unwrap();

    let (ctx_one, value_one) = from_one.run(Val::set_of([])).unwrap();
    let (ctx_three, value_three) = from_three.run(Val::set_of([])).unwrap();

    assert_eq!(value_one, Val::Num(5.0));
    assert_eq!(ctx_one, Val::set_of([Val::Num(2.0), Val::Num(4.0)]));
    assert_eq!(value_three, Val::Num(7.0));
    assert_eq!(ctx_three, Val::set_of([Val::Num(4.0), Val::Num(6.0)]));
}

#[test]
fn test_existing_context_is_kept() {
    let example = program(EXAMPLE).compile().unwrap();
    let composed = State::from_val(&example.call(&[Val::Num(3.0)]).unwrap()).unwrap();

    let (ctx, _) = composed.run(Val::set_of([Val::Num(100.0)])).unwrap();
    assert_eq!(
        ctx,
        Val::set_of([Val::Num(100.0), Val::Num(4.0), Val::Num(6.0)])
    );
}
