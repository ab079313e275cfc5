use std::convert::Infallible;

use crate::{
  notification::Notification,
  observable::{Observable, ObservableExt},
  observer::Observer,
};

/// Turns every event of `source` into a [`Notification`] value.
#[derive(Clone)]
pub struct MaterializeOp<S> {
  source: S,
}

impl<S> MaterializeOp<S> {
  #[inline]
  pub(crate) fn new(source: S) -> Self { Self { source } }
}

impl<Item, Err, S, O> Observable<Notification<Item, Err>, Infallible, O> for MaterializeOp<S>
where
  O: Observer<Notification<Item, Err>, Infallible>,
  S: Observable<Item, Err, MaterializeObserver<O>>,
{
  type Unsub = S::Unsub;

  fn actual_subscribe(self, observer: O) -> Self::Unsub {
    self.source.actual_subscribe(MaterializeObserver(observer))
  }
}

impl<Item, Err, S> ObservableExt<Notification<Item, Err>, Infallible> for MaterializeOp<S> where
  S: ObservableExt<Item, Err>
{
}

pub struct MaterializeObserver<O>(O);

impl<Item, Err, O> Observer<Item, Err> for MaterializeObserver<O>
where
  O: Observer<Notification<Item, Err>, Infallible>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.0.next(Notification::Next(value)) }

  fn error(mut self, err: Err) {
    self.0.next(Notification::Error(err));
    self.0.complete()
  }

  fn complete(mut self) {
    self.0.next(Notification::Completed);
    self.0.complete()
  }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}
