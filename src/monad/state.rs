//! State monad: threads a context value through a chain of binds.
//!
//! A State is a description, not a closure chain: leaves produce a
//! `(context, value)` pair and `Bind` nodes attach a continuation. `run`
//! walks the description with an explicit stack of pending continuations,
//! so the Rust stack stays flat however many binds execute.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::{expect_family, Bindable, Continuation, MonadValue};
use crate::error::DoError;
use crate::executor::Val;

type StateFn = dyn Fn(Val) -> Result<(Val, Val), DoError>;

enum Node {
    Pure(Val),
    Get,
    Put(Val),
    Func(Rc<StateFn>),
    Bind(State, Continuation),
}

/// A computation from an incoming context to `(context, value)`.
#[derive(Clone)]
pub struct State(Rc<Node>);

impl State {
    pub const FAMILY: &'static str = "State";

    /// A leaf computation backed by a host closure.
    pub fn new(func: impl Fn(Val) -> Result<(Val, Val), DoError> + 'static) -> Self {
        Self(Rc::new(Node::Func(Rc::new(func))))
    }

    /// Leave the context alone and produce `value`.
    pub fn pure(value: Val) -> Self {
        Self(Rc::new(Node::Pure(value)))
    }

    /// Produce the current context as the value.
    pub fn get() -> Self {
        Self(Rc::new(Node::Get))
    }

    /// Replace the context; the value is `null`.
    pub fn put(ctx: Val) -> Self {
        Self(Rc::new(Node::Put(ctx)))
    }

    /// Run against `ctx`, returning the final context and value.
    ///
    /// Every run starts from the given context; nothing is memoized, so
    /// effects inside host functions happen again on each run.
    pub fn run(&self, ctx: Val) -> Result<(Val, Val), DoError> {
        let mut pending: Vec<Continuation> = Vec::new();
        let mut current = self.clone();
        let mut ctx = ctx;

        loop {
            let (next_ctx, value) = match &*current.0 {
                Node::Bind(inner, k) => {
                    pending.push(k.clone());
                    current = inner.clone();
                    continue;
                }
                Node::Pure(value) => (ctx, value.clone()),
                Node::Get => (ctx.clone(), ctx),
                Node::Put(replacement) => (replacement.clone(), Val::Null),
                Node::Func(func) => func(ctx)?,
            };
            ctx = next_ctx;

            match pending.pop() {
                Some(k) => {
                    trace!(%value, depth = pending.len(), "state bind resuming continuation");
                    current = State::from_val(&k.apply(value)?)?;
                }
                None => return Ok((ctx, value)),
            }
        }
    }

    /// Borrow the State behind a value, if it is one.
    pub fn from_val(value: &Val) -> Result<State, DoError> {
        expect_family::<State>(value, Self::FAMILY)
    }

    pub fn into_val(self) -> Val {
        Val::Monad(MonadValue::new(self))
    }
}

impl Bindable for State {
    fn family(&self) -> &'static str {
        Self::FAMILY
    }

    fn bind(&self, k: Continuation) -> MonadValue {
        MonadValue::new(State(Rc::new(Node::Bind(self.clone(), k))))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("State(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> State {
        State::new(|ctx| {
            let n = ctx.as_num().unwrap_or(0.0);
            Ok((Val::Num(n + 1.0), Val::Num(n)))
        })
    }

    #[test]
    fn test_get_put_pure() {
        assert_eq!(
            State::get().run(Val::Num(3.0)).unwrap(),
            (Val::Num(3.0), Val::Num(3.0))
        );
        assert_eq!(
            State::put(Val::Num(9.0)).run(Val::Num(3.0)).unwrap(),
            (Val::Num(9.0), Val::Null)
        );
        assert_eq!(
            State::pure(Val::Bool(true)).run(Val::Null).unwrap(),
            (Val::Null, Val::Bool(true))
        );
    }

    #[test]
    fn test_bind_threads_context() {
        let chained = counter().bind(Continuation::new(|first| {
            Ok(counter()
                .bind(Continuation::new(move |second| {
                    Ok(State::pure(Val::List(vec![first.clone(), second])).into_val())
                }))
                .into())
        }));

        let state = State::from_val(&chained.into()).unwrap();
        let (ctx, value) = state.run(Val::Num(10.0)).unwrap();
        assert_eq!(ctx, Val::Num(12.0));
        assert_eq!(value, Val::List(vec![Val::Num(10.0), Val::Num(11.0)]));
    }

    #[test]
    fn test_bind_is_lazy() {
        use std::cell::Cell;

        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let bound = State::get().bind(Continuation::new(move |v| {
            seen.set(seen.get() + 1);
            Ok(State::pure(v).into_val())
        }));
        assert_eq!(calls.get(), 0);

        let state = State::from_val(&bound.into()).unwrap();
        state.run(Val::Null).unwrap();
        state.run(Val::Null).unwrap();
        assert_eq!(calls.get(), 2);
    }

    /// `get` bound `n` times, each continuation building the next bind
    fn countdown(n: usize) -> State {
        State::get()
            .bind(Continuation::new(move |ctx| {
                let ctx = ctx.as_num().unwrap_or(0.0);
                let next = State::put(Val::Num(ctx + 1.0));
                Ok(if n == 0 {
                    next.into_val()
                } else {
                    next.bind(Continuation::new(move |_| Ok(countdown(n - 1).into_val())))
                        .into()
                })
            }))
            .downcast_ref::<State>()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_long_chains_run_without_recursion() {
        let (ctx, _) = countdown(50_000).run(Val::Num(0.0)).unwrap();
        assert_eq!(ctx, Val::Num(50_001.0));
    }

    #[test]
    fn test_left_nested_binds_run_in_order() {
        let append = |tag: &'static str| {
            Continuation::new(move |_| {
                Ok(State::new(move |ctx| {
                    let ctx = Val::Str(format!("{}{}", ctx, tag));
                    Ok((ctx, Val::Null))
                })
                .into_val())
            })
        };
        let nested = State::from_val(&State::pure(Val::Null).bind(append("a")).into())
            .unwrap()
            .bind(append("b"));

        let state = State::from_val(&nested.into()).unwrap();
        assert_eq!(state.run(Val::Str(String::new())).unwrap().0, Val::Str("ab".into()));
    }

    #[test]
    fn test_plain_continuation_result_is_rejected() {
        let bound = State::get().bind(Continuation::new(|_| Ok(Val::Num(7.0))));
        let state = State::from_val(&bound.into()).unwrap();

        let err = state.run(Val::Null).unwrap_err();
        assert!(matches!(
            err,
            DoError::UnexpectedValue {
                expected: "State",
                ..
            }
        ));
    }
}
