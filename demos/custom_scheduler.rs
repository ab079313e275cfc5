//! Example: Custom Scheduler
//!
//! A scheduler is anything that can accept a `Task<S>`. This one logs every
//! task and runs it right away on the calling thread, blocking for delays.
//! Handing it to `start_on` is all it takes to make `start` synchronous.

use std::time::Duration;

use rxcore::prelude::*;

#[derive(Clone, Copy, Default)]
pub struct VerboseScheduler;

impl<S> Scheduler<S> for VerboseScheduler {
  fn schedule(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    println!("[VerboseScheduler] Scheduling new task. Delay: {delay:?}");
    if let Some(d) = delay {
      std::thread::sleep(d);
    }

    let handle = TaskHandle::new();
    handle.run_task(task);
    println!("[VerboseScheduler] Task finished.");
    handle
  }
}

fn main() {
  println!("--- Starting Custom Scheduler Example ---");

  observable::start_on(|| 20 * 2 + 2, VerboseScheduler)
    .materialize()
    .subscribe_next(|n| println!("Consumer received: {n:?}"));

  let sub = observable::start_result_on(|| "abc".parse::<i32>(), VerboseScheduler).subscribe_all(
    |v| println!("parsed {v}"),
    |e| println!("parse failed: {e}"),
    || println!("done"),
  );
  assert!(sub.is_closed());

  println!("--- Example Finished ---");
}
