//! Do-notation for Rust values
//!
//! A `do function` body is a straight-line sequence of suspension points
//! (`yield m`). Decorating it gives a [`Do`] whose `call` folds those
//! suspension points into a nested chain of `bind` operations over whatever
//! monad the body yields, and returns the composed value without running it.
//!
//! ```ignore
//! use donotation_core::{Program, State, Val};
//!
//! let bump = Program::parse(source)?.compile()?;
//! let composed = bump.call(&[Val::Num(1.0)])?;
//! let (ctx, value) = State::from_val(&composed)?.run(Val::Num(0.0))?;
//! ```

pub mod cli;
pub mod config;
pub mod decorator;
pub mod error;
pub mod executor;
pub mod monad;
pub mod parser;
pub mod program;
pub mod runner;

// Re-export main types
pub use decorator::{Do, Suspendable};
pub use error::DoError;
pub use executor::{NativeFn, Span, Val};
pub use monad::{Bindable, Continuation, List, Maybe, MonadValue, State};
pub use program::Program;
pub use runner::{build, Resume, Yielded};
