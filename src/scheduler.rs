//! Schedulers decide *when* a unit of work runs; [`Task`] describes *what*
//! runs.
//!
//! A scheduler accepts a `Task<S>`, a piece of state plus a plain `fn(S)`
//! handler, and returns a [`TaskHandle`]. The handle is a [`Subscription`]
//! that prevents the task from starting, and a `Future` that resolves once the
//! task has finished or been cancelled.
//!
//! | Scheduler | Clock | Execution |
//! |-----------|-------|-----------|
//! | [`ThreadPoolScheduler`] | real | shared `futures` thread pool (default) |
//! | [`NewThreadScheduler`] | real | one OS thread per task |
//! | `TokioScheduler` | real | `tokio::spawn` (feature `tokio-scheduler`) |
//! | [`TestScheduler`] | virtual | synchronously inside its run loop |

use std::{
  future::Future,
  pin::Pin,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
  task::{Context, Poll},
};

use futures::task::AtomicWaker;

pub use std::time::{Duration, Instant};

use crate::subscription::Subscription;

pub mod test_scheduler;
mod thread_scheduler;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;

pub use test_scheduler::{TestScheduler, VirtualTime};
pub use thread_scheduler::NewThreadScheduler;
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::{ThreadPoolScheduler, ThreadPoolSchedulerBuilder};
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;

/// The scheduler `start` uses when none is given.
#[cfg(feature = "futures-scheduler")]
pub type DefaultScheduler = ThreadPoolScheduler;

// ==================== Task ====================

/// A one-shot unit of work: a state value and the function that consumes it.
///
/// Using a `fn` pointer instead of a boxed closure keeps the state type
/// visible, so a scheduler can put `Send` bounds exactly where they are
/// needed.
pub struct Task<S> {
  pub state: S,
  pub handler: fn(S),
}

impl<S> Task<S> {
  pub fn new(state: S, handler: fn(S)) -> Self { Self { state, handler } }

  #[inline]
  pub fn run(self) { (self.handler)(self.state) }
}

impl<F: FnOnce()> Task<F> {
  /// Wraps a closure as a task.
  pub fn once(f: F) -> Self { Task { state: f, handler: |f| f() } }
}

// ==================== TaskHandle ====================

#[derive(Default)]
struct HandleState {
  cancelled: AtomicBool,
  finished: AtomicBool,
  waker: AtomicWaker,
}

/// A unified handle for any scheduled task.
#[derive(Clone, Default)]
pub struct TaskHandle {
  inner: Arc<HandleState>,
}

impl TaskHandle {
  pub fn new() -> Self { Self::default() }

  /// A handle for work that has already run.
  pub fn finished() -> Self {
    let handle = Self::new();
    handle.mark_finished();
    handle
  }

  pub fn is_cancelled(&self) -> bool { self.inner.cancelled.load(Ordering::Acquire) }

  pub fn is_finished(&self) -> bool { self.inner.finished.load(Ordering::Acquire) }

  /// Runs `task` unless the handle was cancelled first, then marks the handle
  /// finished. Panics from the task are not caught, but the handle is still
  /// marked finished while unwinding.
  pub fn run_task<S>(&self, task: Task<S>) {
    let _finish = FinishOnDrop(self);
    if !self.is_cancelled() {
      task.run();
    }
  }

  pub(crate) fn mark_finished(&self) {
    self.inner.finished.store(true, Ordering::Release);
    self.inner.waker.wake();
  }
}

struct FinishOnDrop<'a>(&'a TaskHandle);

impl Drop for FinishOnDrop<'_> {
  fn drop(&mut self) { self.0.mark_finished() }
}

impl Subscription for TaskHandle {
  fn unsubscribe(self) {
    if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
      self.inner.waker.wake();
    }
  }

  fn is_closed(&self) -> bool { self.is_finished() || self.is_cancelled() }
}

impl Future for TaskHandle {
  type Output = ();

  fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    if self.is_closed() {
      return Poll::Ready(());
    }
    self.inner.waker.register(cx.waker());
    if self.is_closed() {
      Poll::Ready(())
    } else {
      Poll::Pending
    }
  }
}

impl std::fmt::Debug for TaskHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TaskHandle")
      .field("cancelled", &self.is_cancelled())
      .field("finished", &self.is_finished())
      .finish()
  }
}

// ==================== Scheduler ====================

/// A Scheduler is an object to order tasks and schedule their execution.
///
/// `delay` is a minimum wait. Implementations are generic over the task state
/// so each one can state the bounds it needs (`Send + 'static` for real
/// threads, only `'static` for virtual time).
pub trait Scheduler<S> {
  fn schedule(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn task_once_runs_closure() {
    let mut hit = false;
    Task::once(|| hit = true).run();
    assert!(hit);
  }

  #[test]
  fn handle_skips_cancelled_task() {
    let handle = TaskHandle::new();
    handle.clone().unsubscribe();
    let mut hit = false;
    handle.run_task(Task::once(|| hit = true));
    assert!(!hit);
    assert!(handle.is_closed());
  }

  #[test]
  fn unsubscribe_is_idempotent() {
    let handle = TaskHandle::new();
    handle.clone().unsubscribe();
    handle.clone().unsubscribe();
    assert!(handle.is_cancelled());
    assert!(!handle.is_finished());
  }

  #[test]
  fn handle_future_resolves_after_finish() {
    let handle = TaskHandle::new();
    let waiter = handle.clone();
    let runner = std::thread::spawn(move || handle.run_task(Task::once(|| {})));
    futures::executor::block_on(waiter.clone());
    assert!(waiter.is_finished());
    runner.join().unwrap();
  }

  #[test]
  fn panicking_task_still_finishes_handle() {
    let handle = TaskHandle::new();
    let runner = handle.clone();
    let joined =
      std::thread::spawn(move || runner.run_task(Task::once(|| panic!("task panicked")))).join();

    assert!(joined.is_err());
    assert!(handle.is_finished());
    futures::executor::block_on(handle);
  }

  #[test]
  fn finished_handle_is_closed() {
    assert!(TaskHandle::finished().is_closed());
  }
}
