//! Subscriptions are the cancellation side of `subscribe`.
//!
//! `unsubscribe` consumes the handle. Every concrete handle in this crate is
//! cheap to clone and its clones share one state, so cancelling through any
//! clone, any number of times, has the effect of a single cancellation.

use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

/// Handle to cancel an active subscription.
pub trait Subscription {
  /// Stop the subscription. Idempotent, and a no-op once the source has
  /// already terminated.
  fn unsubscribe(self);

  fn is_closed(&self) -> bool;
}

/// Unit subscription, always closed.
impl Subscription for () {
  #[inline]
  fn unsubscribe(self) {}

  #[inline]
  fn is_closed(&self) -> bool { true }
}

impl<S: Subscription> Subscription for Option<S> {
  fn unsubscribe(self) {
    if let Some(s) = self {
      s.unsubscribe()
    }
  }

  fn is_closed(&self) -> bool { self.as_ref().map_or(true, Subscription::is_closed) }
}

// ==================== ClosureSubscription ====================

/// Runs a teardown closure on the first `unsubscribe`.
pub struct ClosureSubscription<F>(pub F);

impl<F: FnOnce()> Subscription for ClosureSubscription<F> {
  fn unsubscribe(self) { (self.0)() }

  fn is_closed(&self) -> bool { false }
}

// ==================== Boxed ====================

/// Helper trait for calling unsubscribe on boxed trait objects
///
/// Since `Subscription::unsubscribe(self)` requires `Sized`, we need this
/// workaround trait to enable `Box<dyn Subscription>` to call unsubscribe.
pub trait BoxedSubscriptionInner {
  fn boxed_unsubscribe(self: Box<Self>);
  fn boxed_is_closed(&self) -> bool;
}

impl<T: Subscription> BoxedSubscriptionInner for T {
  #[inline]
  fn boxed_unsubscribe(self: Box<Self>) { (*self).unsubscribe() }

  #[inline]
  fn boxed_is_closed(&self) -> bool { self.is_closed() }
}

/// A type-erased, thread-safe subscription.
pub struct BoxedSubscription(Box<dyn BoxedSubscriptionInner + Send>);

impl BoxedSubscription {
  #[inline]
  pub fn new(subscription: impl Subscription + Send + 'static) -> Self {
    Self(Box::new(subscription))
  }
}

impl Subscription for BoxedSubscription {
  #[inline]
  fn unsubscribe(self) { self.0.boxed_unsubscribe() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.boxed_is_closed() }
}

impl Debug for BoxedSubscription {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BoxedSubscription").field("is_closed", &self.is_closed()).finish()
  }
}

// ==================== Gate ====================

/// A shared closed flag, used by producers to stop delivering once the
/// consumer has unsubscribed.
#[derive(Clone, Debug, Default)]
pub struct Gate(Arc<AtomicBool>);

impl Gate {
  pub fn new() -> Self { Self::default() }

  /// Closes the gate. Returns `true` only for the call that closed it.
  pub fn close(&self) -> bool { !self.0.swap(true, Ordering::AcqRel) }

  #[inline]
  pub fn is_closed(&self) -> bool { self.0.load(Ordering::Acquire) }
}

// ==================== Guard ====================

/// An RAII implementation of a "scoped subscribed" of a subscription.
/// When this structure is dropped (falls out of scope), the subscription will
/// be unsubscribed.
///
/// If you want to drop it immediately, wrap it in its own scope
#[must_use]
pub struct SubscriptionGuard<T: Subscription>(Option<T>);

impl<T: Subscription> SubscriptionGuard<T> {
  pub fn new(subscription: T) -> SubscriptionGuard<T> { SubscriptionGuard(Some(subscription)) }

  /// Releases the subscription without unsubscribing it.
  pub fn into_inner(mut self) -> Option<T> { self.0.take() }
}

impl<T: Subscription> Drop for SubscriptionGuard<T> {
  #[inline]
  fn drop(&mut self) {
    if let Some(s) = self.0.take() {
      s.unsubscribe()
    }
  }
}
