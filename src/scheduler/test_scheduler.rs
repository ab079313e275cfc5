//! Test Scheduler for deterministic testing.
//!
//! Provides virtual time that only advances when explicitly instructed.
//! Tasks execute synchronously, inside [`TestScheduler::run_to`],
//! [`TestScheduler::advance_by`] or [`TestScheduler::run`], at the instant
//! they were scheduled for.
//!
//! Every `TestScheduler::new()` owns an independent clock and queue; clones
//! share them. The scheduler is `Rc`-based and therefore `!Send`, so its
//! queue can only ever be driven from the thread that created it.
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let scheduler = TestScheduler::new();
//! let messages =
//!   scheduler.run_with_fixed_lifecycle(|| start_on(|| 1, scheduler.clone()));
//!
//! assert_eq!(messages, vec![on_next(200, 1), on_completed(200)]);
//! ```

use std::{
  cell::RefCell,
  cmp::Ordering,
  collections::BinaryHeap,
  fmt::{Debug, Formatter},
  rc::Rc,
};

use tracing::trace;

use super::{Duration, Scheduler, Task, TaskHandle};

/// A point on the virtual clock, in ticks. One tick is 100 nanoseconds when
/// converting from a `Duration`.
pub type VirtualTime = u64;

const NANOS_PER_TICK: u128 = 100;

// ==================== Internal State ====================

#[derive(Default)]
struct TestSchedulerState {
  now: VirtualTime,
  queue: BinaryHeap<ScheduledTask>,
  next_seq: u64,
}

struct ScheduledTask {
  due: VirtualTime,
  seq: u64,
  handle: TaskHandle,
  run: Box<dyn FnOnce()>,
}

impl PartialEq for ScheduledTask {
  fn eq(&self, other: &Self) -> bool { self.due == other.due && self.seq == other.seq }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for ScheduledTask {
  fn cmp(&self, other: &Self) -> Ordering {
    // Min-heap: earlier times first, then FIFO by seq
    other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
  }
}

// ==================== TestScheduler ====================

/// A virtual time scheduler for deterministic testing.
#[derive(Clone, Default)]
pub struct TestScheduler(Rc<RefCell<TestSchedulerState>>);

impl TestScheduler {
  pub fn new() -> Self { Self::default() }

  /// Converts a real duration into virtual ticks, rounding down.
  pub fn ticks(duration: Duration) -> VirtualTime {
    let ticks = duration.as_nanos() / NANOS_PER_TICK;
    VirtualTime::try_from(ticks).unwrap_or(VirtualTime::MAX)
  }

  /// Current virtual time.
  pub fn now(&self) -> VirtualTime { self.0.borrow().now }

  /// Number of queued tasks that have not been cancelled.
  pub fn pending_count(&self) -> usize {
    self.0.borrow().queue.iter().filter(|t| !t.handle.is_cancelled()).count()
  }

  pub fn is_empty(&self) -> bool { self.pending_count() == 0 }

  /// Enqueues `task` at the absolute instant `at`. An instant in the past is
  /// treated as "now".
  pub fn schedule_absolute<S: 'static>(&self, at: VirtualTime, task: Task<S>) -> TaskHandle {
    self.purge_cancelled();
    let handle = TaskHandle::new();
    let runner = handle.clone();
    let mut state = self.0.borrow_mut();
    let due = at.max(state.now);
    let seq = state.next_seq;
    state.next_seq += 1;
    trace!(due, seq, now = state.now, "virtual task scheduled");
    let run = Box::new(move || runner.run_task(task));
    state.queue.push(ScheduledTask { due, seq, handle: handle.clone(), run });
    handle
  }

  /// Drops every cancelled task from the queue.
  fn purge_cancelled(&self) {
    let mut state = self.0.borrow_mut();
    if state.queue.iter().all(|t| !t.handle.is_cancelled()) {
      return;
    }
    let (live, dead): (Vec<_>, Vec<_>) =
      std::mem::take(&mut state.queue).into_iter().partition(|t| !t.handle.is_cancelled());
    state.queue = live.into();
    drop(state);
    // Task state is dropped outside the borrow; it may own scheduler clones.
    drop(dead);
  }

  /// Enqueues `task` `ticks` after the current virtual time.
  pub fn schedule_relative<S: 'static>(&self, ticks: VirtualTime, task: Task<S>) -> TaskHandle {
    let at = self.now().saturating_add(ticks);
    self.schedule_absolute(at, task)
  }

  /// Pops the earliest task due at or before `limit` (any task when `limit`
  /// is `None`) and moves the clock to its due time. A cancelled task at the
  /// head is popped without touching the clock.
  fn pop_due(&self, limit: Option<VirtualTime>) -> Option<ScheduledTask> {
    let mut state = self.0.borrow_mut();
    let head = state.queue.peek()?;
    let (due, cancelled) = (head.due, head.handle.is_cancelled());
    if !cancelled && limit.is_some_and(|limit| due > limit) {
      return None;
    }
    let task = state.queue.pop()?;
    if !cancelled {
      state.now = state.now.max(due);
    }
    Some(task)
  }

  fn drain(&self, limit: Option<VirtualTime>) {
    // The borrow is released before running so tasks may schedule more work.
    while let Some(task) = self.pop_due(limit) {
      if task.handle.is_cancelled() {
        trace!(due = task.due, seq = task.seq, "cancelled virtual task discarded");
        continue;
      }
      trace!(due = task.due, seq = task.seq, "virtual task running");
      (task.run)();
    }
  }

  /// Runs every task due at or before `deadline`, in time order, then leaves
  /// the clock at `deadline` (or later, if it was already past it).
  pub fn run_to(&self, deadline: VirtualTime) {
    self.drain(Some(deadline));
    let mut state = self.0.borrow_mut();
    state.now = state.now.max(deadline);
  }

  /// Alias of [`TestScheduler::run_to`].
  #[inline]
  pub fn run_until(&self, deadline: VirtualTime) { self.run_to(deadline) }

  /// Advances the clock by `ticks`, running everything that falls due.
  pub fn advance_by(&self, ticks: VirtualTime) { self.run_to(self.now().saturating_add(ticks)) }

  /// Runs until the queue is empty. The clock ends at the due time of the
  /// last task run.
  pub fn run(&self) { self.drain(None) }
}

impl<S: 'static> Scheduler<S> for TestScheduler {
  fn schedule(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let ticks = delay.map_or(0, Self::ticks);
    self.schedule_relative(ticks, task)
  }
}

impl Debug for TestScheduler {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let state = self.0.borrow();
    f.debug_struct("TestScheduler")
      .field("now", &state.now)
      .field("pending", &state.queue.len())
      .finish()
  }
}
