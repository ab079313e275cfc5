//! The observable contract.
//!
//! An observable is a *description* of a sequence. Nothing runs until
//! [`Observable::actual_subscribe`] hands it an observer, and the call
//! consumes the description; clone it to subscribe again.

use std::convert::Infallible;

use crate::{
  observer::{FnMutObserver, Observer, ObserverAll},
  ops::{
    blocking::{BlockingIter, ChannelObserver},
    materialize::MaterializeOp,
  },
};

pub mod start;
pub use start::*;

/// A sequence of `Item`s that may fail with `Err`, subscribable by `O`.
pub trait Observable<Item, Err, O>
where
  O: Observer<Item, Err>,
{
  type Unsub: crate::subscription::Subscription;

  fn actual_subscribe(self, observer: O) -> Self::Unsub;
}

/// User facing methods, implemented by every observable in the crate.
pub trait ObservableExt<Item, Err>: Sized {
  /// Subscribe with any observer.
  fn subscribe<O>(self, observer: O) -> <Self as Observable<Item, Err, O>>::Unsub
  where
    O: Observer<Item, Err>,
    Self: Observable<Item, Err, O>,
  {
    self.actual_subscribe(observer)
  }

  /// Subscribe with a `next` closure. Only for sequences that cannot fail.
  fn subscribe_next<N>(
    self, next: N,
  ) -> <Self as Observable<Item, Infallible, FnMutObserver<N>>>::Unsub
  where
    N: FnMut(Item),
    Self: Observable<Item, Infallible, FnMutObserver<N>>,
  {
    self.actual_subscribe(FnMutObserver(next))
  }

  /// Subscribe with one closure per callback.
  fn subscribe_all<N, E, C>(
    self, next: N, error: E, complete: C,
  ) -> <Self as Observable<Item, Err, ObserverAll<N, E, C>>>::Unsub
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    C: FnOnce(),
    Self: Observable<Item, Err, ObserverAll<N, E, C>>,
  {
    self.actual_subscribe(ObserverAll::new(next, error, complete))
  }

  /// Re-expresses every event, terminal ones included, as a
  /// [`Notification`](crate::notification::Notification) value. The result
  /// never fails and always completes.
  fn materialize(self) -> MaterializeOp<Self> { MaterializeOp::new(self) }

  /// Subscribes and returns an iterator that blocks the calling thread
  /// until each event arrives.
  ///
  /// Only meaningful with real-time schedulers: nothing advances a
  /// `TestScheduler` while the caller is blocked.
  fn into_blocking_iter(self) -> BlockingIter<Item, Err>
  where
    Self: Observable<Item, Err, ChannelObserver<Item, Err>>,
  {
    BlockingIter::subscribe(self)
  }

  /// Blocks until the sequence terminates and returns every value, or the
  /// error that ended it.
  fn collect_blocking(self) -> Result<Vec<Item>, Err>
  where
    Self: Observable<Item, Err, ChannelObserver<Item, Err>>,
  {
    self.into_blocking_iter().collect()
  }
}
