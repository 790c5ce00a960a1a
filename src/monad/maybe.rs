//! Maybe monad: a chain that stops at the first missing value.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use super::{expect_family, Bindable, Continuation, MonadValue};
use crate::error::DoError;
use crate::executor::Val;

enum Node {
    Just(Val),
    Nothing,
    Bind(Maybe, Continuation),
}

/// A deferred optional value.
#[derive(Clone)]
pub struct Maybe(Rc<Node>);

impl Maybe {
    pub const FAMILY: &'static str = "Maybe";

    pub fn just(value: Val) -> Self {
        Self(Rc::new(Node::Just(value)))
    }

    pub fn nothing() -> Self {
        Self(Rc::new(Node::Nothing))
    }

    /// Evaluate the chain. Continuations after a `nothing` never run.
    pub fn run(&self) -> Result<Option<Val>, DoError> {
        let mut pending: Vec<Continuation> = Vec::new();
        let mut current = self.clone();

        loop {
            let value = match &*current.0 {
                Node::Bind(inner, k) => {
                    pending.push(k.clone());
                    current = inner.clone();
                    continue;
                }
                Node::Just(value) => value.clone(),
                Node::Nothing => {
                    trace!(skipped = pending.len(), "maybe short-circuited");
                    return Ok(None);
                }
            };

            match pending.pop() {
                Some(k) => current = Maybe::from_val(&k.apply(value)?)?,
                None => return Ok(Some(value)),
            }
        }
    }

    pub fn from_val(value: &Val) -> Result<Maybe, DoError> {
        expect_family::<Maybe>(value, Self::FAMILY)
    }

    pub fn into_val(self) -> Val {
        Val::Monad(MonadValue::new(self))
    }
}

impl Bindable for Maybe {
    fn family(&self) -> &'static str {
        Self::FAMILY
    }

    fn bind(&self, k: Continuation) -> MonadValue {
        MonadValue::new(Maybe(Rc::new(Node::Bind(self.clone(), k))))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for Maybe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Node::Just(value) => write!(f, "Just({})", value),
            Node::Nothing => f.write_str("Nothing"),
            Node::Bind(..) => f.write_str("Maybe(..)"),
        }
    }
}
