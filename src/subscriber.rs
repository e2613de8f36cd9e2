//! # Push-Stream Contracts
//!
//! The minimal reactive vocabulary the aggregation operators are written
//! against.
//!
//! - [`Publisher`]: a source that pushes items into exactly one [`Subscriber`]
//! - [`Subscriber`]: the upstream-facing side. The source calls it strictly
//!   one notification at a time, never after a terminal notification, so it
//!   takes `&mut self` and needs no synchronization.
//! - [`Observer`]: the consumer of an aggregate. It may be called from
//!   whichever context wins the emission race (the source's or the one
//!   issuing demand), so it takes `&self` and must be `Send + Sync`. Calls
//!   into one observer are still never concurrent.
//! - [`Subscription`]: the demand and cancellation handle handed out on
//!   subscribe. It can be cloned and used from any thread.

use crate::error::AggregateError;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

/// Demand value meaning "send everything".
pub const UNBOUNDED: i64 = i64::MAX;

/// Upstream-facing receiver of a stream's notifications.
pub trait Subscriber<T>: Send {
  /// Called once, before any other notification.
  ///
  /// The default requests unbounded demand.
  fn on_subscribe(&mut self, subscription: Subscription) {
    subscription.request(UNBOUNDED);
  }

  /// Delivers the next item.
  fn on_next(&mut self, item: T);

  /// Terminal error. No further notifications follow.
  fn on_error(&mut self, error: AggregateError);

  /// Terminal completion. No further notifications follow.
  fn on_complete(&mut self);
}

/// Consumer of an aggregation result.
pub trait Observer<R>: Send + Sync {
  /// Called once with the subscription, before the source is subscribed.
  ///
  /// Requesting from here is allowed and exercises the demand-first path.
  fn on_subscribe(&self, _subscription: &Subscription) {}

  /// Delivers the aggregate.
  fn on_next(&self, value: R);

  /// Terminal error.
  fn on_error(&self, error: AggregateError);

  /// Terminal completion.
  fn on_complete(&self);
}

/// A push-based source of items consumed by a single subscriber.
pub trait Publisher<T>: Send + 'static {
  /// Attaches `subscriber` and starts pushing.
  ///
  /// Synchronous publishers may run to completion before returning.
  fn subscribe(self, subscriber: Box<dyn Subscriber<T>>);
}

/// Receiving end of a demand signal.
pub trait Demand: Send + Sync {
  /// Requests `n` more items. Values `<= 0` are ignored.
  fn request(&self, n: i64);

  /// Stops delivery. Idempotent.
  fn cancel(&self);

  /// Returns `true` once [`Demand::cancel`] has been called.
  fn is_cancelled(&self) -> bool;
}

/// Cloneable handle to a [`Demand`].
#[derive(Clone)]
pub struct Subscription {
  demand: Arc<dyn Demand>,
}

impl Subscription {
  /// Wraps a demand receiver.
  pub fn new(demand: Arc<dyn Demand>) -> Self {
    Self { demand }
  }

  /// Requests `n` more items. Values `<= 0` are ignored.
  pub fn request(&self, n: i64) {
    if n > 0 {
      self.demand.request(n);
    }
  }

  /// Cancels the subscription. Safe to call repeatedly and from any thread.
  pub fn cancel(&self) {
    self.demand.cancel();
  }

  /// Returns `true` once the subscription has been cancelled.
  pub fn is_cancelled(&self) -> bool {
    self.demand.is_cancelled()
  }
}

impl fmt::Debug for Subscription {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Subscription")
      .field("cancelled", &self.is_cancelled())
      .finish()
  }
}

/// Demand receiver for sources that push eagerly and only honor cancellation.
///
/// Async sources await [`CancelFlag::cancelled`] alongside their next item so
/// a stalled source is released as soon as the consumer cancels.
#[derive(Debug, Default)]
pub struct CancelFlag {
  cancelled: AtomicBool,
  notify: Notify,
}

impl CancelFlag {
  /// Creates an uncancelled flag.
  pub fn new() -> Arc<Self> {
    Arc::new(Self::default())
  }

  /// Resolves once the flag is cancelled.
  pub async fn cancelled(&self) {
    while !self.is_cancelled() {
      self.notify.notified().await;
    }
  }
}

impl Demand for CancelFlag {
  fn request(&self, _n: i64) {}

  fn cancel(&self) {
    if !self.cancelled.swap(true, Ordering::SeqCst) {
      // notify_one keeps a permit, so a waiter that has not registered yet
      // still wakes.
      self.notify.notify_one();
    }
  }

  fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }
}
