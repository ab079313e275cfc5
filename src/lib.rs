//! # rxcore: the execution core of a reactive library
//!
//! Observables, observers, subscriptions and schedulers, plus the `start`
//! factory that runs one computation on a scheduler and publishes its result.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! // Runs on the shared thread pool; block until it is done.
//! let answer = observable::start(|| 6 * 7).collect_blocking();
//! assert_eq!(answer, Ok(vec![42]));
//!
//! // Failures and panics arrive as errors, never as panics.
//! let failed = observable::start(|| -> i32 { panic!("boom") }).collect_blocking();
//! assert_eq!(failed, Err(StartError::Panicked("boom".into())));
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A description of a sequence; nothing runs until subscribed |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Subscription`] | Handle to cancel an active subscription |
//! | [`Scheduler`] | Decides where and when a [`Task`] runs |
//! | [`TestScheduler`] | Virtual time for deterministic tests |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): the thread pool scheduler and the
//!   `start*` shortcuts that use it.
//! - **`timer`** (default): non-blocking delays on the thread pool.
//! - **`tokio-scheduler`**: [`TokioScheduler`](scheduler::TokioScheduler).
//!
//! [`Observable`]: observable::Observable
//! [`Observer`]: observer::Observer
//! [`Subscription`]: subscription::Subscription
//! [`Scheduler`]: scheduler::Scheduler
//! [`Task`]: scheduler::Task
//! [`TestScheduler`]: scheduler::TestScheduler

pub mod error;
pub mod notification;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod scheduler;
pub mod subscription;
pub mod testing;

pub use prelude::*;
