//! Bridges an observable to a thread that wants to wait for its events.

use futures::{
  channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender},
  executor::{block_on_stream, BlockingStream},
};

use crate::{notification::Notification, observable::Observable, observer::Observer};

/// Forwards every event into a channel.
pub struct ChannelObserver<Item, Err>(UnboundedSender<Notification<Item, Err>>);

impl<Item, Err> Observer<Item, Err> for ChannelObserver<Item, Err> {
  // A dropped receiver just means nobody is listening any more.
  fn next(&mut self, value: Item) { let _ = self.0.unbounded_send(Notification::Next(value)); }

  fn error(self, err: Err) { let _ = self.0.unbounded_send(Notification::Error(err)); }

  fn complete(self) { let _ = self.0.unbounded_send(Notification::Completed); }

  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// Iterator over the events of an observable, blocking between them.
///
/// Yields `Ok(value)` per `next`, a final `Err(e)` on error, and ends after
/// the terminal event. It also ends if the source is dropped without
/// terminating, e.g. when its task was cancelled.
pub struct BlockingIter<Item, Err> {
  inner: BlockingStream<UnboundedReceiver<Notification<Item, Err>>>,
  done: bool,
}

impl<Item, Err> BlockingIter<Item, Err> {
  pub(crate) fn subscribe<S>(source: S) -> Self
  where
    S: Observable<Item, Err, ChannelObserver<Item, Err>>,
  {
    let (tx, rx) = unbounded();
    // The channel closes when the observer is dropped, which is all the
    // iterator needs; the subscription handle itself is not kept.
    let _ = source.actual_subscribe(ChannelObserver(tx));
    Self { inner: block_on_stream(rx), done: false }
  }
}

impl<Item, Err> Iterator for BlockingIter<Item, Err> {
  type Item = Result<Item, Err>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    match self.inner.next() {
      Some(Notification::Next(v)) => Some(Ok(v)),
      Some(Notification::Error(e)) => {
        self.done = true;
        Some(Err(e))
      }
      Some(Notification::Completed) | None => {
        self.done = true;
        None
      }
    }
  }
}
