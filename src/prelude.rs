//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Observable and the Start factory
pub use crate::observable::{self, *};
// Observer types
pub use crate::observer::{FnMutObserver, Observer, ObserverAll};
// Operators
pub use crate::ops::{blocking::BlockingIter, materialize::MaterializeOp};
// Scheduler core types and schedulers
#[cfg(feature = "futures-scheduler")]
pub use crate::scheduler::{DefaultScheduler, ThreadPoolScheduler, ThreadPoolSchedulerBuilder};
#[cfg(feature = "tokio-scheduler")]
pub use crate::scheduler::TokioScheduler;
pub use crate::scheduler::{
  Duration, Instant, NewThreadScheduler, Scheduler, Task, TaskHandle, TestScheduler, VirtualTime,
};
// Subscription
pub use crate::subscription::*;
// Virtual time testing
pub use crate::testing::{on_completed, on_error, on_next, Lifecycle, Recorded, TestObserver};
pub use crate::{
  error::{ArgumentError, StartError},
  notification::Notification,
};
