//! List monad: every continuation runs once per element.
//!
//! This is the monad that resumes one suspension point several times, so it
//! depends on continuations being re-entrant.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::{expect_family, Bindable, Continuation, MonadValue};
use crate::error::DoError;
use crate::executor::Val;

enum Node {
    Of(Vec<Val>),
    Bind(List, Continuation),
}

/// Continuations still to apply, innermost first. Shared between branches.
struct Pending {
    k: Continuation,
    rest: Option<Rc<Pending>>,
}

/// Unit of work for `run`.
enum Task {
    /// Evaluate a list, then feed each element through `pending`.
    Eval(List, Option<Rc<Pending>>),
    /// Apply the head of `pending` to one element.
    Apply(Val, Rc<Pending>),
}

/// A deferred sequence of alternatives.
#[derive(Clone)]
pub struct List(Rc<Node>);

impl List {
    pub const FAMILY: &'static str = "List";

    pub fn of(items: Vec<Val>) -> Self {
        Self(Rc::new(Node::Of(items)))
    }

    pub fn pure(value: Val) -> Self {
        Self::of(vec![value])
    }

    /// Evaluate the chain, concatenating the results of every branch.
    ///
    /// Branches are explored depth first from an explicit work stack, so
    /// results (and continuation calls) come in element order.
    pub fn run(&self) -> Result<Vec<Val>, DoError> {
        let mut out = Vec::new();
        let mut work = vec![Task::Eval(self.clone(), None)];

        while let Some(task) = work.pop() {
            match task {
                Task::Eval(list, pending) => match &*list.0 {
                    Node::Bind(inner, k) => {
                        let pending = Rc::new(Pending {
                            k: k.clone(),
                            rest: pending,
                        });
                        work.push(Task::Eval(inner.clone(), Some(pending)));
                    }
                    Node::Of(items) => match pending {
                        None => out.extend(items.iter().cloned()),
                        Some(pending) => {
                            trace!(branches = items.len(), "list bind fanning out");
                            work.extend(
                                items
                                    .iter()
                                    .rev()
                                    .map(|item| Task::Apply(item.clone(), Rc::clone(&pending))),
                            );
                        }
                    },
                },
                Task::Apply(item, pending) => {
                    let next = List::from_val(&pending.k.apply(item)?)?;
                    work.push(Task::Eval(next, pending.rest.clone()));
                }
            }
        }

        Ok(out)
    }

    pub fn from_val(value: &Val) -> Result<List, DoError> {
        expect_family::<List>(value, Self::FAMILY)
    }

    pub fn into_val(self) -> Val {
        Val::Monad(MonadValue::new(self))
    }
}

impl Bindable for List {
    fn family(&self) -> &'static str {
        Self::FAMILY
    }

    fn bind(&self, k: Continuation) -> MonadValue {
        MonadValue::new(List(Rc::new(Node::Bind(self.clone(), k))))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Node::Of(items) => f.debug_tuple("List").field(items).finish(),
            Node::Bind(..) => f.write_str("List(..)"),
        }
    }
}
