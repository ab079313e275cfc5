//! Recording observers and lifecycle runs on top of [`TestScheduler`].
//!
//! A lifecycle run creates the observable at `created`, subscribes a
//! recording observer at `subscribed` and disposes the subscription at
//! `disposed`. The fixed lifecycle is `{ created: 100, subscribed: 200,
//! disposed: 1000 }`, so a source that emits as soon as it is subscribed
//! records its events at tick 200.

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
  notification::Notification,
  observable::Observable,
  observer::Observer,
  scheduler::{Task, TestScheduler, VirtualTime},
  subscription::Subscription,
};

/// A value stamped with the virtual time it was observed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Recorded<T> {
  pub time: VirtualTime,
  pub value: T,
}

impl<T: fmt::Display> fmt::Display for Recorded<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}", self.value, self.time)
  }
}

pub fn on_next<Item, Err>(time: VirtualTime, value: Item) -> Recorded<Notification<Item, Err>> {
  Recorded { time, value: Notification::Next(value) }
}

pub fn on_error<Item, Err>(time: VirtualTime, err: Err) -> Recorded<Notification<Item, Err>> {
  Recorded { time, value: Notification::Error(err) }
}

pub fn on_completed<Item, Err>(time: VirtualTime) -> Recorded<Notification<Item, Err>> {
  Recorded { time, value: Notification::Completed }
}

/// Virtual instants of a lifecycle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
  pub created: VirtualTime,
  pub subscribed: VirtualTime,
  pub disposed: VirtualTime,
}

impl Default for Lifecycle {
  fn default() -> Self { Self { created: 100, subscribed: 200, disposed: 1000 } }
}

/// Records every event with the scheduler's clock at delivery time.
pub struct TestObserver<Item, Err> {
  scheduler: TestScheduler,
  messages: Rc<RefCell<Vec<Recorded<Notification<Item, Err>>>>>,
}

impl<Item, Err> Clone for TestObserver<Item, Err> {
  fn clone(&self) -> Self {
    Self { scheduler: self.scheduler.clone(), messages: self.messages.clone() }
  }
}

impl<Item: Clone, Err: Clone> TestObserver<Item, Err> {
  /// Snapshot of the events recorded so far.
  pub fn messages(&self) -> Vec<Recorded<Notification<Item, Err>>> {
    self.messages.borrow().clone()
  }
}

impl<Item, Err> TestObserver<Item, Err> {
  fn record(&self, value: Notification<Item, Err>) {
    let time = self.scheduler.now();
    self.messages.borrow_mut().push(Recorded { time, value });
  }
}

impl<Item, Err> Observer<Item, Err> for TestObserver<Item, Err> {
  fn next(&mut self, value: Item) { self.record(Notification::Next(value)) }

  fn error(self, err: Err) { self.record(Notification::Error(err)) }

  fn complete(self) { self.record(Notification::Completed) }

  fn is_closed(&self) -> bool { false }
}

impl TestScheduler {
  pub fn create_observer<Item, Err>(&self) -> TestObserver<Item, Err> {
    TestObserver { scheduler: self.clone(), messages: Rc::default() }
  }

  /// Runs `factory` under the default [`Lifecycle`] and returns what the
  /// observer recorded.
  pub fn run_with_fixed_lifecycle<S, Item, Err>(
    &self, factory: impl FnOnce() -> S,
  ) -> Vec<Recorded<Notification<Item, Err>>>
  where
    S: Observable<Item, Err, TestObserver<Item, Err>> + 'static,
    <S as Observable<Item, Err, TestObserver<Item, Err>>>::Unsub: 'static,
    Item: Clone + 'static,
    Err: Clone + 'static,
  {
    self.run_with_lifecycle(factory, Lifecycle::default())
  }

  /// Advances to `lifecycle.created` and calls `factory`, schedules the
  /// subscription and its disposal, then runs the queue dry.
  ///
  /// Disposal is queued before anything the subscription schedules, so
  /// work falling due exactly at `disposed` is cancelled rather than run.
  ///
  /// # Panics
  ///
  /// If the instants are out of order (`created <= subscribed <= disposed`).
  pub fn run_with_lifecycle<S, Item, Err>(
    &self, factory: impl FnOnce() -> S, lifecycle: Lifecycle,
  ) -> Vec<Recorded<Notification<Item, Err>>>
  where
    S: Observable<Item, Err, TestObserver<Item, Err>> + 'static,
    <S as Observable<Item, Err, TestObserver<Item, Err>>>::Unsub: 'static,
    Item: Clone + 'static,
    Err: Clone + 'static,
  {
    type Slot<U> = Rc<RefCell<Option<U>>>;

    let Lifecycle { created, subscribed, disposed } = lifecycle;
    assert!(
      created <= subscribed && subscribed <= disposed,
      "lifecycle out of order: created {created}, subscribed {subscribed}, disposed {disposed}"
    );
    self.run_to(created);
    let source = factory();
    let observer = self.create_observer::<Item, Err>();
    let slot: Slot<<S as Observable<Item, Err, TestObserver<Item, Err>>>::Unsub> = Rc::default();

    self.schedule_absolute(
      subscribed,
      Task::new((source, observer.clone(), slot.clone()), |(source, observer, slot)| {
        let sub = source.actual_subscribe(observer);
        *slot.borrow_mut() = Some(sub);
      }),
    );
    self.schedule_absolute(
      disposed,
      Task::new(slot, |slot| {
        let sub = slot.borrow_mut().take();
        sub.unsubscribe();
      }),
    );
    self.run();

    observer.messages()
  }
}
