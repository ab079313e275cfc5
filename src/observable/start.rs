//! `start`: run a computation on a scheduler and publish its outcome.
//!
//! Every subscription schedules exactly one task. The task runs the
//! computation, then delivers either `next(value)` followed by `complete()`,
//! or a single `error(..)`. Panics raised by the computation are caught at
//! the task boundary and delivered as [`StartError::Panicked`]; they never
//! reach the scheduler.
//!
//! The observable is cold: it holds the computation, not its result, so each
//! subscription (of a clone) runs the computation again.

use std::{
  future::Future,
  panic::{catch_unwind, AssertUnwindSafe},
  pin::Pin,
  task::{Context, Poll},
};

use tracing::{debug, warn};

#[cfg(feature = "futures-scheduler")]
use crate::scheduler::DefaultScheduler;
use crate::{
  error::{ArgumentError, StartError},
  observable::{Observable, ObservableExt},
  observer::Observer,
  scheduler::{Scheduler, Task, TaskHandle},
  subscription::{Gate, Subscription},
};

// ==================== Computations ====================

/// A deferred, one-shot computation that yields a value or an error.
pub trait Computation {
  type Item;
  type Err;

  fn compute(self) -> Result<Self::Item, Self::Err>;
}

/// A computation that cannot fail except by panicking.
#[derive(Clone)]
pub struct ValueComputation<F>(F);

impl<F, Item> Computation for ValueComputation<F>
where
  F: FnOnce() -> Item,
{
  type Item = Item;
  type Err = std::convert::Infallible;

  #[inline]
  fn compute(self) -> Result<Item, Self::Err> { Ok((self.0)()) }
}

/// A computation that reports failure through `Result`.
#[derive(Clone)]
pub struct ResultComputation<F>(F);

impl<F, Item, E> Computation for ResultComputation<F>
where
  F: FnOnce() -> Result<Item, E>,
{
  type Item = Item;
  type Err = E;

  #[inline]
  fn compute(self) -> Result<Item, E> { (self.0)() }
}

// ==================== Factories ====================

/// Runs `func` on the default scheduler and emits its return value.
///
/// ```rust
/// use rxcore::prelude::*;
///
/// let values = observable::start(|| 40 + 2).collect_blocking();
/// assert_eq!(values, Ok(vec![42]));
/// ```
#[cfg(feature = "futures-scheduler")]
pub fn start<F, Item>(func: F) -> StartObservable<ValueComputation<F>, DefaultScheduler>
where
  F: FnOnce() -> Item,
{
  start_on(func, DefaultScheduler::default())
}

/// Runs `func` on `scheduler` and emits its return value.
pub fn start_on<F, Item, S>(func: F, scheduler: S) -> StartObservable<ValueComputation<F>, S>
where
  F: FnOnce() -> Item,
{
  StartObservable { computation: ValueComputation(func), scheduler }
}

/// Runs `action` on the default scheduler and emits a single `()` once it
/// has run.
#[cfg(feature = "futures-scheduler")]
pub fn start_action<F>(action: F) -> StartObservable<ValueComputation<F>, DefaultScheduler>
where
  F: FnOnce(),
{
  start(action)
}

/// Runs `action` on `scheduler` and emits a single `()` once it has run.
pub fn start_action_on<F, S>(action: F, scheduler: S) -> StartObservable<ValueComputation<F>, S>
where
  F: FnOnce(),
{
  start_on(action, scheduler)
}

/// Runs a fallible `func` on the default scheduler. `Err(e)` is delivered as
/// [`StartError::Failed`].
#[cfg(feature = "futures-scheduler")]
pub fn start_result<F, Item, E>(func: F) -> StartObservable<ResultComputation<F>, DefaultScheduler>
where
  F: FnOnce() -> Result<Item, E>,
{
  start_result_on(func, DefaultScheduler::default())
}

pub fn start_result_on<F, Item, E, S>(
  func: F, scheduler: S,
) -> StartObservable<ResultComputation<F>, S>
where
  F: FnOnce() -> Result<Item, E>,
{
  StartObservable { computation: ResultComputation(func), scheduler }
}

/// Like [`start`], for callers that may not have a computation. Fails
/// before anything is scheduled.
#[cfg(feature = "futures-scheduler")]
pub fn try_start<F, Item>(
  func: Option<F>,
) -> Result<StartObservable<ValueComputation<F>, DefaultScheduler>, ArgumentError>
where
  F: FnOnce() -> Item,
{
  try_start_on(func, Some(DefaultScheduler::default()))
}

/// Like [`start_on`], validating both arguments. The computation is checked
/// first.
pub fn try_start_on<F, Item, S>(
  func: Option<F>, scheduler: Option<S>,
) -> Result<StartObservable<ValueComputation<F>, S>, ArgumentError>
where
  F: FnOnce() -> Item,
{
  let func = func.ok_or(ArgumentError::MissingComputation);
  let scheduler = scheduler.ok_or(ArgumentError::MissingScheduler);
  match (func, scheduler) {
    (Ok(func), Ok(scheduler)) => Ok(start_on(func, scheduler)),
    (Err(e), _) | (_, Err(e)) => {
      warn!(%e, "start rejected its arguments");
      Err(e)
    }
  }
}

// ==================== Observable ====================

/// The observable returned by the `start*` factories.
#[derive(Clone)]
pub struct StartObservable<C, S> {
  computation: C,
  scheduler: S,
}

impl<C, S> StartObservable<C, S> {
  pub fn scheduler(&self) -> &S { &self.scheduler }
}

/// Everything the scheduled task owns.
pub struct StartState<C, O> {
  computation: C,
  observer: O,
  gate: Gate,
}

fn run_start<C, O>(state: StartState<C, O>)
where
  C: Computation,
  O: Observer<C::Item, StartError<C::Err>>,
{
  let StartState { computation, mut observer, gate } = state;
  if gate.is_closed() {
    return;
  }

  let outcome = match catch_unwind(AssertUnwindSafe(|| computation.compute())) {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(e)) => {
      debug!("start computation returned an error");
      Err(StartError::Failed(e))
    }
    Err(payload) => {
      let err = StartError::from_panic(payload);
      if let StartError::Panicked(msg) = &err {
        debug!(%msg, "start computation panicked");
      }
      Err(err)
    }
  };

  // Disposal while the computation ran suppresses delivery.
  if gate.is_closed() {
    debug!("subscription closed before delivery; outcome dropped");
    return;
  }
  match outcome {
    Ok(value) => {
      observer.next(value);
      if !gate.is_closed() {
        observer.complete();
      }
    }
    Err(err) => observer.error(err),
  }
}

impl<C, S, O> Observable<C::Item, StartError<C::Err>, O> for StartObservable<C, S>
where
  C: Computation,
  O: Observer<C::Item, StartError<C::Err>>,
  S: Scheduler<StartState<C, O>>,
{
  type Unsub = StartSubscription;

  fn actual_subscribe(self, observer: O) -> StartSubscription {
    let gate = Gate::new();
    let state = StartState { computation: self.computation, observer, gate: gate.clone() };
    let task = self.scheduler.schedule(Task::new(state, run_start::<C, O>), None);
    StartSubscription { task, gate }
  }
}

impl<C: Computation, S> ObservableExt<C::Item, StartError<C::Err>> for StartObservable<C, S> {}

// ==================== Subscription ====================

/// Cancels a pending Start task and suppresses any delivery still to come.
///
/// Also a `Future` that resolves once the task has run or been cancelled.
#[derive(Clone, Debug)]
pub struct StartSubscription {
  task: TaskHandle,
  gate: Gate,
}

impl Subscription for StartSubscription {
  fn unsubscribe(self) {
    if self.gate.close() && !self.task.is_finished() {
      debug!("start subscription cancelled before its task finished");
    }
    self.task.unsubscribe();
  }

  fn is_closed(&self) -> bool { self.gate.is_closed() || self.task.is_finished() }
}

impl Future for StartSubscription {
  type Output = ();

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
    Pin::new(&mut self.task).poll(cx)
  }
}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use crate::prelude::*;

  #[test]
  fn it_shall_emit_closure_value() {
    let scheduler = TestScheduler::new();
    let actual = Rc::new(Cell::new(0));
    let is_completed = Rc::new(Cell::new(false));
    let (a, c) = (actual.clone(), is_completed.clone());

    observable::start_on(|| 123, scheduler.clone()).subscribe_all(
      move |n| a.set(n),
      |e| panic!("unexpected {e}"),
      move || c.set(true),
    );
    assert_eq!(actual.get(), 0);

    scheduler.run();
    assert_eq!(actual.get(), 123);
    assert!(is_completed.get());
  }

  #[derive(PartialEq, Debug, Clone)]
  struct S {
    i: i32,
    f: f32,
    s: String,
  }

  fn function() -> S { S { i: 1, f: 2.5, s: String::from("aString") } }

  #[test]
  fn it_shall_emit_function_value() {
    let scheduler = TestScheduler::new();
    let messages =
      scheduler.run_with_fixed_lifecycle(|| observable::start_on(function, scheduler.clone()));
    assert_eq!(messages, vec![on_next(200, function()), on_completed(200)]);
  }

  #[test]
  fn unit_for_action() {
    let scheduler = TestScheduler::new();
    let done = Rc::new(Cell::new(false));
    let messages = scheduler.run_with_fixed_lifecycle(|| {
      let d = done.clone();
      observable::start_action_on(move || d.set(true), scheduler.clone())
    });
    assert_eq!(messages, vec![on_next(200, ()), on_completed(200)]);
    assert!(done.get());
  }

  #[test]
  fn failed_result_is_error_only() {
    let scheduler = TestScheduler::new();
    let messages = scheduler.run_with_fixed_lifecycle(|| {
      observable::start_result_on(|| Err::<i32, _>("nope"), scheduler.clone())
    });
    assert_eq!(messages, vec![on_error(200, StartError::Failed("nope"))]);
  }

  #[test]
  fn panic_is_error_only() {
    let scheduler = TestScheduler::new();
    let messages = scheduler.run_with_fixed_lifecycle(|| {
      observable::start_on(|| -> i32 { panic!("kaboom") }, scheduler.clone())
    });
    assert_eq!(messages, vec![on_error(200, StartError::Panicked("kaboom".into()))]);
  }

  #[test]
  fn panic_with_opaque_error_type() {
    #[derive(Debug)]
    struct Opaque;

    let scheduler = TestScheduler::new();
    let caught = Rc::new(RefCell::new(None));
    let c = caught.clone();
    let failing = || -> Result<i32, Opaque> { panic!("no display") };
    observable::start_result_on(failing, scheduler.clone()).subscribe_all(
      |_| {},
      move |e| {
        *c.borrow_mut() = Some(e);
      },
      || {},
    );
    scheduler.run();

    let caught = caught.borrow_mut().take();
    assert!(matches!(caught, Some(StartError::Panicked(msg)) if msg == "no display"));
  }

  #[test]
  fn nothing_runs_before_subscribe() {
    let scheduler = TestScheduler::new();
    let runs = Rc::new(Cell::new(0));
    let r = runs.clone();
    let _obs = observable::start_on(move || r.set(r.get() + 1), scheduler.clone());
    scheduler.run();
    assert_eq!(runs.get(), 0);
    assert!(scheduler.is_empty());
  }

  #[test]
  fn each_subscription_reruns() {
    let scheduler = TestScheduler::new();
    let runs = Rc::new(Cell::new(0));
    let r = runs.clone();
    let obs = observable::start_on(
      move || {
        r.set(r.get() + 1);
        r.get()
      },
      scheduler.clone(),
    );
    let seen = Rc::new(RefCell::new(vec![]));
    let (s1, s2) = (seen.clone(), seen.clone());
    obs.clone().subscribe_all(move |v| s1.borrow_mut().push(v), |_| {}, || {});
    obs.subscribe_all(move |v| s2.borrow_mut().push(v), |_| {}, || {});
    scheduler.run();

    assert_eq!(runs.get(), 2);
    assert_eq!(*seen.borrow(), vec![1, 2]);
  }

  #[test]
  fn dispose_before_due_prevents_run() {
    let scheduler = TestScheduler::new();
    let runs = Rc::new(Cell::new(0));
    let r = runs.clone();
    let events = Rc::new(Cell::new(0));
    let (e1, e2, e3) = (events.clone(), events.clone(), events.clone());

    let sub = observable::start_on(move || r.set(r.get() + 1), scheduler.clone()).subscribe_all(
      move |_| e1.set(e1.get() + 1),
      move |_| e2.set(e2.get() + 1),
      move || e3.set(e3.get() + 1),
    );
    sub.clone().unsubscribe();
    sub.clone().unsubscribe();
    assert!(sub.is_closed());
    scheduler.run();

    assert_eq!(runs.get(), 0);
    assert_eq!(events.get(), 0);
  }

  #[test]
  fn dispose_during_computation_suppresses_delivery() {
    let scheduler = TestScheduler::new();
    let slot: Rc<RefCell<Option<StartSubscription>>> = Rc::default();
    let s = slot.clone();
    let events = Rc::new(Cell::new(0));
    let (e1, e2, e3) = (events.clone(), events.clone(), events.clone());

    let sub = observable::start_on(
      move || {
        if let Some(sub) = s.borrow_mut().take() {
          sub.unsubscribe();
        }
        7
      },
      scheduler.clone(),
    )
    .subscribe_all(
      move |_| e1.set(e1.get() + 1),
      move |_| e2.set(e2.get() + 1),
      move || e3.set(e3.get() + 1),
    );
    *slot.borrow_mut() = Some(sub.clone());
    scheduler.run();

    assert_eq!(events.get(), 0);
    assert!(sub.is_closed());
  }

  #[test]
  fn dispose_after_completion_is_noop() {
    let scheduler = TestScheduler::new();
    let sub = observable::start_on(|| 1, scheduler.clone()).subscribe_all(|_| {}, |_| {}, || {});
    scheduler.run();
    assert!(sub.is_closed());
    sub.clone().unsubscribe();
    sub.unsubscribe();
  }

  #[test]
  fn argument_validation() {
    let none_fn: Option<fn() -> i32> = None;
    let scheduler = TestScheduler::new();

    assert_eq!(
      observable::try_start_on(none_fn, Some(scheduler.clone())).err(),
      Some(ArgumentError::MissingComputation)
    );
    assert_eq!(
      observable::try_start_on(Some(|| 1), None::<TestScheduler>).err(),
      Some(ArgumentError::MissingScheduler)
    );
    assert_eq!(
      observable::try_start_on(none_fn, None::<TestScheduler>).err(),
      Some(ArgumentError::MissingComputation)
    );
    assert!(scheduler.is_empty());
  }
}
