//! Monad capability contract
//!
//! A value may appear at a suspension point only if it can be *bound*: given
//! a continuation from plain value to monadic value, it produces a new
//! monadic value meaning "run me, then run the continuation on my result".
//! Nothing else is required of it. [`Bindable`] is that single operation;
//! [`MonadValue`] is the opaque handle bodies pass around.
//!
//! Binding never executes anything. Each concrete monad decides what
//! "running" means and exposes its own run operation:
//!
//! - [`State`]: threads a context, `run(ctx) -> (ctx, value)`
//! - [`Maybe`]: short-circuits on nothing, `run() -> Option<value>`
//! - [`List`]: nondeterminism, `run() -> Vec<value>`

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::DoError;
use crate::executor::Val;

pub mod list;
pub mod maybe;
pub mod state;

pub use list::List;
pub use maybe::Maybe;
pub use state::State;

/// The capability a suspension point operand must have.
pub trait Bindable: fmt::Debug + 'static {
    /// Name of the monad family, used in diagnostics.
    fn family(&self) -> &'static str;

    /// Sequence `self` with `k`, without running either.
    fn bind(&self, k: Continuation) -> MonadValue;

    fn as_any(&self) -> &dyn Any;
}

/// Opaque, immutable handle to a capability-conforming value.
#[derive(Clone)]
pub struct MonadValue(Rc<dyn Bindable>);

impl MonadValue {
    pub fn new<M: Bindable>(monad: M) -> Self {
        Self(Rc::new(monad))
    }

    pub fn family(&self) -> &'static str {
        self.0.family()
    }

    pub fn bind(&self, k: Continuation) -> MonadValue {
        self.0.bind(k)
    }

    /// Recover the concrete monad, e.g. to call its run operation.
    pub fn downcast_ref<M: Bindable>(&self) -> Option<&M> {
        self.0.as_any().downcast_ref::<M>()
    }

    /// Identity comparison; two handles are equal only if they share the
    /// same underlying value.
    pub fn ptr_eq(&self, other: &MonadValue) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for MonadValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The rest of a computation after a suspension point.
#[derive(Clone)]
pub struct Continuation(Rc<dyn Fn(Val) -> Result<Val, DoError>>);

impl Continuation {
    pub fn new(k: impl Fn(Val) -> Result<Val, DoError> + 'static) -> Self {
        Self(Rc::new(k))
    }

    pub fn apply(&self, value: Val) -> Result<Val, DoError> {
        (self.0)(value)
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Continuation(..)")
    }
}

/// Require `value` to be a monad of the concrete family `M`.
///
/// Concrete monads call this on whatever a continuation returned before
/// running it; a plain value or a monad of another family is rejected.
pub fn expect_family<M: Bindable + Clone>(value: &Val, family: &'static str) -> Result<M, DoError> {
    value
        .as_monad()
        .and_then(|m| m.downcast_ref::<M>())
        .cloned()
        .ok_or_else(|| DoError::UnexpectedValue {
            expected: family,
            found: value.describe(),
        })
}
