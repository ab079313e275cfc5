//! Integration tests for the Start factory.
//!
//! Real-time schedulers are driven through the blocking adapter; exact
//! timing is checked on the virtual clock.
#![cfg(feature = "futures-scheduler")]

use std::{
  cell::Cell,
  rc::Rc,
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
  },
  thread,
};

use rxcore::prelude::*;

#[test]
fn start_func_on_default_scheduler() {
  assert_eq!(observable::start(|| 1).collect_blocking(), Ok(vec![1]));
}

#[test]
fn side_effect_happens_once_before_the_value() {
  let calls = Arc::new(AtomicUsize::new(0));
  let c = calls.clone();
  let seen_at_delivery: Vec<_> = observable::start(move || c.fetch_add(1, Ordering::SeqCst) + 1)
    .into_blocking_iter()
    .map(|v| (v, calls.load(Ordering::SeqCst)))
    .collect();

  assert_eq!(seen_at_delivery, vec![(Ok(1), 1)]);
}

#[test]
fn start_action_runs_the_action() {
  let done = Arc::new(AtomicBool::new(false));
  let d = done.clone();
  let values = observable::start_action(move || d.store(true, Ordering::SeqCst)).collect_blocking();

  assert_eq!(values, Ok(vec![()]));
  assert!(done.load(Ordering::SeqCst));
}

#[test]
fn start_func_error_is_materialized() {
  let events = observable::start_result(|| Err::<i32, _>("ex")).materialize().collect_blocking();
  assert_eq!(events, Ok(vec![Notification::Error(StartError::Failed("ex"))]));
}

#[test]
fn start_func_panic_is_materialized() {
  let events = observable::start(|| -> i32 { panic!("ex") }).materialize().collect_blocking();
  assert_eq!(events, Ok(vec![Notification::Error(StartError::Panicked("ex".to_owned()))]));
}

#[test]
fn start_action_panic_is_an_error() {
  let result = observable::start_action(|| panic!("ex")).collect_blocking();
  assert_eq!(result, Err(StartError::Panicked("ex".to_owned())));
}

#[test]
fn runs_off_the_calling_thread() {
  let caller = thread::current().id();
  let ids = observable::start_on(|| thread::current().id(), NewThreadScheduler).collect_blocking();
  let ids = ids.unwrap_or_default();
  assert_eq!(ids.len(), 1);
  assert_ne!(ids[0], caller);
}

#[test]
fn dedicated_pool() {
  let scheduler = ThreadPoolScheduler::builder().pool_size(2).create().unwrap();
  let hits = Arc::new(AtomicUsize::new(0));
  for _ in 0..4 {
    let h = hits.clone();
    let v = observable::start_on(move || h.fetch_add(1, Ordering::SeqCst) + 1, scheduler.clone())
      .collect_blocking()
      .unwrap();
    assert_eq!(v.len(), 1);
  }
  assert_eq!(hits.load(Ordering::SeqCst), 4);
}

#[test]
fn subscription_future_resolves_after_delivery() {
  let seen = Arc::new(AtomicUsize::new(0));
  let s = seen.clone();
  let sub = observable::start(|| 5).subscribe_all(
    move |v| {
      s.store(v, Ordering::SeqCst);
    },
    |_| {},
    || {},
  );
  futures::executor::block_on(sub.clone());
  assert_eq!(seen.load(Ordering::SeqCst), 5);
  assert!(sub.is_closed());
}

// ==================== virtual time ====================

#[test]
fn start_func_fixed_lifecycle() {
  let scheduler = TestScheduler::new();
  let messages =
    scheduler.run_with_fixed_lifecycle(|| observable::start_on(|| 1, scheduler.clone()));
  assert_eq!(messages, vec![on_next(200, 1), on_completed(200)]);
}

#[test]
fn start_action_fixed_lifecycle() {
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
fn start_func_error_fixed_lifecycle() {
  let scheduler = TestScheduler::new();
  let messages = scheduler.run_with_fixed_lifecycle(|| {
    observable::start_result_on(|| Err::<u32, _>(404), scheduler.clone())
  });
  assert_eq!(messages, vec![on_error(200, StartError::Failed(404))]);
}

#[test]
fn work_is_deferred_until_subscribe() {
  let scheduler = TestScheduler::new();
  let runs = Rc::new(Cell::new(0));
  let r = runs.clone();
  let obs = observable::start_on(move || r.set(r.get() + 1), scheduler.clone());

  scheduler.advance_by(500);
  assert_eq!(runs.get(), 0);

  let sub = obs.subscribe_all(|_| {}, |_| {}, || {});
  assert_eq!(runs.get(), 0);
  assert!(!sub.is_closed());
  scheduler.advance_by(0);
  assert_eq!(runs.get(), 1);
  assert!(sub.is_closed());
}

#[test]
fn dispose_before_due_prevents_everything() {
  let scheduler = TestScheduler::new();
  let runs = Rc::new(Cell::new(0));
  let r = runs.clone();
  let messages = scheduler.run_with_lifecycle(
    || observable::start_on(move || r.set(r.get() + 1), scheduler.clone()),
    Lifecycle { created: 100, subscribed: 200, disposed: 200 },
  );

  // Disposal was queued before the computation's task, so it wins the tie.
  assert!(messages.is_empty());
  assert_eq!(runs.get(), 0);
}

#[test]
fn argument_validation() {
  let missing: Option<fn() -> u8> = None;
  assert_eq!(observable::try_start(missing).err(), Some(ArgumentError::MissingComputation));
  assert_eq!(
    observable::try_start_on(Some(|| 1), None::<NewThreadScheduler>).err(),
    Some(ArgumentError::MissingScheduler)
  );

  let obs = observable::try_start_on(Some(|| 9), Some(NewThreadScheduler)).unwrap();
  assert_eq!(obs.collect_blocking(), Ok(vec![9]));
}

#[test]
fn unsubscribe_is_idempotent() {
  let scheduler = TestScheduler::new();
  let sub = observable::start_on(|| 1, scheduler.clone()).subscribe_all(|_| {}, |_| {}, || {});
  let guard = SubscriptionGuard::new(sub.clone());
  sub.clone().unsubscribe();
  sub.clone().unsubscribe();
  drop(guard);
  scheduler.run();
  assert!(sub.is_closed());
}
