//! Error types.
//!
//! Two families of failure exist and they never mix:
//!
//! - [`ArgumentError`] is returned synchronously by the `try_start*`
//!   constructors, before anything is scheduled.
//! - [`StartError`] is the error *item* of a Start sequence. It travels through
//!   [`Observer::error`](crate::observer::Observer::error) and is never raised
//!   as a panic.

use std::{any::Any, convert::Infallible};

/// A required argument was absent when building an observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum ArgumentError {
  #[error("a computation is required")]
  MissingComputation,
  #[error("a scheduler was explicitly requested but none was supplied")]
  MissingScheduler,
}

/// The reason a Start computation did not produce a value.
///
/// `E` is the error type of a fallible computation; plain computations use the
/// default `Infallible`, so only the `Panicked` arm can occur for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
pub enum StartError<E = Infallible> {
  /// The computation returned `Err`.
  #[error("computation failed: {0}")]
  Failed(E),
  /// The computation panicked. Holds the panic message.
  #[error("computation panicked: {0}")]
  Panicked(String),
}

impl<E> StartError<E> {
  pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
    let msg = match payload.downcast::<&'static str>() {
      Ok(s) => (*s).to_owned(),
      Err(payload) => match payload.downcast::<String>() {
        Ok(s) => *s,
        Err(_) => "Box<dyn Any>".to_owned(),
      },
    };
    StartError::Panicked(msg)
  }

  pub fn is_panic(&self) -> bool { matches!(self, StartError::Panicked(_)) }

  /// The error returned by the computation, if it did not panic.
  pub fn failure(&self) -> Option<&E> {
    match self {
      StartError::Failed(e) => Some(e),
      StartError::Panicked(_) => None,
    }
  }
}
