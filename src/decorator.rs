//! Entry-point decorator
//!
//! [`Do`] wraps a suspendable body. Calling it does not run the body to
//! completion: it starts a fresh computation, hands it to the do-runner and
//! returns the composed monadic value. Running that value is up to the
//! caller, through the concrete monad's own run operation.

use tracing::debug;

use crate::error::DoError;
use crate::executor::Val;
use crate::runner::{self, Yielded};

/// A body that can be started and then suspends at its suspension points.
pub trait Suspendable {
    /// Number of arguments the body expects, if it cares.
    fn arity(&self) -> Option<usize> {
        None
    }

    /// Start a fresh computation and run it to its first suspension point
    /// (or to completion).
    fn start(&self, args: &[Val]) -> Result<Yielded, DoError>;
}

impl<F> Suspendable for F
where
    F: Fn(&[Val]) -> Result<Yielded, DoError>,
{
    fn start(&self, args: &[Val]) -> Result<Yielded, DoError> {
        self(args)
    }
}

/// A decorated do-notation entry point.
#[derive(Debug, Clone)]
pub struct Do<B> {
    name: String,
    body: B,
}

impl<B: Suspendable> Do<B> {
    pub fn new(name: impl Into<String>, body: B) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    /// Build the composed value for these arguments.
    ///
    /// Every call starts a new computation; nothing is cached between calls.
    pub fn call(&self, args: &[Val]) -> Result<Val, DoError> {
        if let Some(expected) = self.body.arity() {
            if expected != args.len() {
                return Err(DoError::Arity {
                    name: self.name.clone(),
                    expected,
                    actual: args.len(),
                });
            }
        }

        debug!(name = %self.name, args = args.len(), "building composed value");
        runner::build(self.body.start(args)?)
    }
}
