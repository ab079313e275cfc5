use tokio::runtime::Handle;
use tracing::trace;

use super::{Duration, Scheduler, Task, TaskHandle};

/// Runs tasks on a tokio runtime.
///
/// `Default` binds to the runtime of the calling context, so it must be
/// created from inside a runtime.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
  runtime: Handle,
}

impl TokioScheduler {
  pub fn new(runtime: Handle) -> Self { Self { runtime } }

  /// Binds to the current runtime, or `None` outside of one.
  pub fn try_current() -> Option<Self> { Handle::try_current().ok().map(Self::new) }
}

impl Default for TokioScheduler {
  fn default() -> Self { Self::new(Handle::current()) }
}

impl<S: Send + 'static> Scheduler<S> for TokioScheduler {
  fn schedule(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let runner = handle.clone();
    trace!(?delay, "spawning task on tokio");
    self.runtime.spawn(async move {
      if let Some(d) = delay {
        if !runner.is_cancelled() {
          tokio::time::sleep(d).await;
        }
      }
      runner.run_task(task);
    });
    handle
  }
}
