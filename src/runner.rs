//! The do-runner
//!
//! Folds a suspendable computation into one composed monadic value. Each
//! suspension point's operand is bound to a continuation that resumes the
//! computation with the plain value it receives and folds whatever the
//! computation does next:
//!
//! ```text
//! yield m1 ; yield m2 ; return r   ==>   m1.bind(x1 -> m2.bind(x2 -> r))
//! ```
//!
//! Nothing is run here. The first operand is checked immediately; later ones
//! are checked when the concrete monad invokes the continuation, that is,
//! while the composed value executes.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::DoError;
use crate::executor::{Span, Val};
use crate::monad::Continuation;

/// Resumes a suspended computation with a plain value.
///
/// Calling it more than once resumes the same suspension point again from
/// scratch; implementations must not consume their captured state.
#[derive(Clone)]
pub struct Resume(Rc<dyn Fn(Val) -> Result<Yielded, DoError>>);

impl Resume {
    pub fn new(f: impl Fn(Val) -> Result<Yielded, DoError> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn apply(&self, value: Val) -> Result<Yielded, DoError> {
        (self.0)(value)
    }
}

impl fmt::Debug for Resume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Resume(..)")
    }
}

/// What a suspendable computation did when it last ran.
#[derive(Debug, Clone)]
pub enum Yielded {
    /// Paused at a suspension point with `operand`.
    Suspend {
        operand: Val,
        /// Location of the `yield`, if the computation came from source.
        site: Option<Span>,
        resume: Resume,
    },
    /// Finished with a result.
    Return(Val),
}

impl Yielded {
    /// A suspension point without a source location.
    pub fn suspend(
        operand: Val,
        resume: impl Fn(Val) -> Result<Yielded, DoError> + 'static,
    ) -> Self {
        Yielded::Suspend {
            operand,
            site: None,
            resume: Resume::new(resume),
        }
    }
}

/// Fold a computation, starting at its first step, into a composed value.
///
/// A computation that returns without ever suspending yields its return
/// value unchanged; it is neither checked nor lifted.
pub fn build(first: Yielded) -> Result<Val, DoError> {
    fold(first, 1)
}

fn fold(step: Yielded, index: usize) -> Result<Val, DoError> {
    match step {
        Yielded::Return(value) => {
            trace!(index, %value, "computation returned");
            Ok(value)
        }
        Yielded::Suspend {
            operand: Val::Monad(monad),
            resume,
            ..
        } => {
            trace!(index, family = monad.family(), "binding suspension point");
            let k = Continuation::new(move |x| fold(resume.apply(x)?, index + 1));
            Ok(Val::Monad(monad.bind(k)))
        }
        Yielded::Suspend { operand, site, .. } => {
            let found = operand.describe();
            debug!(index, %found, "suspension point operand is not bindable");
            Err(DoError::NotBindable {
                index,
                found,
                at: site,
            })
        }
    }
}
