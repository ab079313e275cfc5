//! Notifications reify the three kinds of event a sequence can produce.
//!
//! A sequence is a run of zero or more [`Notification::Next`] followed by at
//! most one terminal: [`Notification::Error`] or [`Notification::Completed`].

use std::fmt::{Display, Formatter};

use crate::observer::Observer;

/// One event of an observable sequence, as data.
///
/// Equality is structural, so two `Error` notifications compare equal when
/// their errors do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Completed,
}

impl<Item, Err> Notification<Item, Err> {
  #[inline]
  pub fn next(value: Item) -> Self { Notification::Next(value) }

  #[inline]
  pub fn error(err: Err) -> Self { Notification::Error(err) }

  #[inline]
  pub fn completed() -> Self { Notification::Completed }

  /// `Error` and `Completed` end a sequence.
  #[inline]
  pub fn is_terminal(&self) -> bool { !self.is_next() }

  #[inline]
  pub fn is_next(&self) -> bool { matches!(self, Notification::Next(_)) }

  pub fn value(&self) -> Option<&Item> {
    match self {
      Notification::Next(v) => Some(v),
      _ => None,
    }
  }

  pub fn err(&self) -> Option<&Err> {
    match self {
      Notification::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Delivers this notification to `observer`.
  ///
  /// Terminal notifications consume the observer; a `Next` hands it back so
  /// the caller can keep feeding it.
  pub fn accept<O>(self, mut observer: O) -> Option<O>
  where
    O: Observer<Item, Err>,
  {
    match self {
      Notification::Next(v) => {
        observer.next(v);
        Some(observer)
      }
      Notification::Error(e) => {
        observer.error(e);
        None
      }
      Notification::Completed => {
        observer.complete();
        None
      }
    }
  }

  /// Dispatches to whichever closure matches the variant.
  pub fn accept_with<R>(
    self, next: impl FnOnce(Item) -> R, error: impl FnOnce(Err) -> R, complete: impl FnOnce() -> R,
  ) -> R {
    match self {
      Notification::Next(v) => next(v),
      Notification::Error(e) => error(e),
      Notification::Completed => complete(),
    }
  }

  /// `None` for `Completed`, otherwise the value or error as a `Result`.
  pub fn into_result(self) -> Option<Result<Item, Err>> {
    match self {
      Notification::Next(v) => Some(Ok(v)),
      Notification::Error(e) => Some(Err(e)),
      Notification::Completed => None,
    }
  }
}

impl<Item: Display, Err: Display> Display for Notification<Item, Err> {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Notification::Next(v) => write!(f, "OnNext({v})"),
      Notification::Error(e) => write!(f, "OnError({e})"),
      Notification::Completed => f.write_str("OnCompleted()"),
    }
  }
}
