//! Constructors for the bundled monads
//!
//! Exposed to bodies as the `State`, `Maybe` and `List` namespaces, e.g.
//! `yield State.put(Set.add(s, x))`.

use super::{expect_arity, wrong_type};
use crate::executor::types::{NativeFn, Val};
use crate::monad::{List, Maybe, State};

pub fn state_functions() -> Vec<(&'static str, NativeFn)> {
    vec![
        ("get", NativeFn::new("State.get", |args| {
            expect_arity("State.get", args, 0)?;
            Ok(State::get().into_val())
        })),
        ("put", NativeFn::new("State.put", |args| {
            expect_arity("State.put", args, 1)?;
            Ok(State::put(args[0].clone()).into_val())
        })),
        ("pure", NativeFn::new("State.pure", |args| {
            expect_arity("State.pure", args, 1)?;
            Ok(State::pure(args[0].clone()).into_val())
        })),
    ]
}

pub fn maybe_functions() -> Vec<(&'static str, NativeFn)> {
    vec![
        ("just", NativeFn::new("Maybe.just", |args| {
            expect_arity("Maybe.just", args, 1)?;
            Ok(Maybe::just(args[0].clone()).into_val())
        })),
        ("nothing", NativeFn::new("Maybe.nothing", |args| {
            expect_arity("Maybe.nothing", args, 0)?;
            Ok(Maybe::nothing().into_val())
        })),
        ("pure", NativeFn::new("Maybe.pure", |args| {
            expect_arity("Maybe.pure", args, 1)?;
            Ok(Maybe::just(args[0].clone()).into_val())
        })),
    ]
}

pub fn list_functions() -> Vec<(&'static str, NativeFn)> {
    vec![
        ("of", NativeFn::new("List.of", |args| {
            expect_arity("List.of", args, 1)?;
            match &args[0] {
                Val::List(items) | Val::Set(items) => Ok(List::of(items.clone()).into_val()),
                other => Err(wrong_type("List.of", 0, "a list", other)),
            }
        })),
        ("pure", NativeFn::new("List.pure", |args| {
            expect_arity("List.pure", args, 1)?;
            Ok(List::pure(args[0].clone()).into_val())
        })),
    ]
}
