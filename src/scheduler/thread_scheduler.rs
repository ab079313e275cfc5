use std::thread;

use tracing::trace;

use super::{Duration, Scheduler, Task, TaskHandle};

/// Runs each task on a freshly spawned OS thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct NewThreadScheduler;

impl<S: Send + 'static> Scheduler<S> for NewThreadScheduler {
  fn schedule(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let runner = handle.clone();
    trace!(?delay, "spawning task thread");
    thread::spawn(move || {
      if let Some(d) = delay {
        if !runner.is_cancelled() {
          thread::sleep(d);
        }
      }
      runner.run_task(task);
    });
    handle
  }
}
