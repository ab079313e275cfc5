use std::io;

use futures::{executor::ThreadPool, task::SpawnExt};
use once_cell::sync::Lazy;
use tracing::{error, trace};

use super::{Duration, Scheduler, Task, TaskHandle};

/// The process-wide pool behind `ThreadPoolScheduler::default()`.
///
/// A pool that cannot be built at all is a host fault with no observer to
/// report to, so it panics.
static DEFAULT_POOL: Lazy<ThreadPool> = Lazy::new(|| {
  ThreadPool::builder()
    .name_prefix("rxcore-pool-")
    .create()
    .unwrap_or_else(|e| panic!("failed to build the default thread pool: {e}"))
});

/// Runs tasks on a `futures` thread pool.
///
/// `Default` shares one lazily created, process-wide pool; use
/// [`ThreadPoolScheduler::builder`] for a dedicated one.
#[derive(Clone, Debug)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl Default for ThreadPoolScheduler {
  fn default() -> Self { Self { pool: DEFAULT_POOL.clone() } }
}

impl ThreadPoolScheduler {
  pub fn new(pool: ThreadPool) -> Self { Self { pool } }

  pub fn builder() -> ThreadPoolSchedulerBuilder { ThreadPoolSchedulerBuilder::default() }
}

/// Configuration for a dedicated [`ThreadPoolScheduler`].
#[derive(Debug, Default, Clone)]
pub struct ThreadPoolSchedulerBuilder {
  pool_size: Option<usize>,
  name_prefix: Option<String>,
}

impl ThreadPoolSchedulerBuilder {
  /// Number of worker threads. Defaults to the number of CPUs.
  pub fn pool_size(mut self, size: usize) -> Self {
    self.pool_size = Some(size);
    self
  }

  pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.name_prefix = Some(prefix.into());
    self
  }

  pub fn create(self) -> io::Result<ThreadPoolScheduler> {
    let mut builder = ThreadPool::builder();
    if let Some(size) = self.pool_size {
      builder.pool_size(size);
    }
    if let Some(prefix) = self.name_prefix {
      builder.name_prefix(prefix);
    }
    builder.create().map(ThreadPoolScheduler::new)
  }
}

#[cfg(feature = "timer")]
async fn sleep(d: Duration) { futures_time::task::sleep(d.into()).await; }

#[cfg(not(feature = "timer"))]
async fn sleep(d: Duration) { std::thread::sleep(d) }

impl<S: Send + 'static> Scheduler<S> for ThreadPoolScheduler {
  fn schedule(&self, task: Task<S>, delay: Option<Duration>) -> TaskHandle {
    let handle = TaskHandle::new();
    let runner = handle.clone();
    trace!(?delay, "spawning task on thread pool");
    let spawned = self.pool.spawn(async move {
      if let Some(d) = delay {
        if !runner.is_cancelled() {
          sleep(d).await;
        }
      }
      runner.run_task(task);
    });
    if let Err(e) = spawned {
      // The task was dropped unrun; close the handle so waiters resolve.
      error!(%e, "thread pool refused task");
      handle.mark_finished();
    }
    handle
  }
}
