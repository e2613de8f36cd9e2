//! # Deferred Scalar Emission
//!
//! [`Deferred`] holds at most one final value and hands it to its observer
//! exactly once, when both of these have happened, in either order:
//!
//! - the upstream accumulator produced the value ([`Deferred::complete`])
//! - the consumer requested at least one item ([`Demand::request`])
//!
//! The two halves are encoded in a single atomic word holding one of four
//! states. Each side performs one compare-and-swap that checks the other
//! side's half and records its own; whichever CAS observes the other half
//! already satisfied performs the emission. The loser stores its half and
//! returns. There is no lock and no blocking.
//!
//! ```text
//!                 request                       complete
//! NoRequestNoValue ------> HasRequestNoValue ------------> HasRequestHasValue
//!        |                                                        ^
//!        | complete                      request                  |
//!        +---------------> NoRequestHasValue ---------------------+
//! ```
//!
//! Errors bypass demand: [`Deferred::fail`] retires the state machine and
//! forwards the error at once. Cancellation retires it as well, drops any
//! held value and cancels the upstream subscription.

use crate::error::{AggregateError, ComponentInfo};
use crate::subscriber::{Demand, Observer, Subscription};
use std::cell::UnsafeCell;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering, fence};
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

const NO_REQUEST_NO_VALUE: u8 = 0;
const HAS_REQUEST_NO_VALUE: u8 = 1;
const NO_REQUEST_HAS_VALUE: u8 = 2;
const HAS_REQUEST_HAS_VALUE: u8 = 3;

/// Observable snapshot of a [`Deferred`] state word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredState {
  /// Initial state.
  NoRequestNoValue,
  /// The consumer asked, the value is not ready.
  HasRequestNoValue,
  /// The value is ready, the consumer has not asked.
  NoRequestHasValue,
  /// Terminal: emitted, failed or cancelled.
  HasRequestHasValue,
}

impl DeferredState {
  fn from_raw(raw: u8) -> Self {
    match raw {
      NO_REQUEST_NO_VALUE => Self::NoRequestNoValue,
      HAS_REQUEST_NO_VALUE => Self::HasRequestNoValue,
      NO_REQUEST_HAS_VALUE => Self::NoRequestHasValue,
      _ => Self::HasRequestHasValue,
    }
  }
}

/// Lock-free single-value emission coordinator.
///
/// Created per subscription and shared (`Arc`) between the upstream
/// accumulator, which calls [`complete`](Self::complete) /
/// [`fail`](Self::fail), and the consumer's [`Subscription`], which drives
/// [`Demand`].
pub struct Deferred<R> {
  observer: Arc<dyn Observer<R>>,
  state: AtomicU8,
  // Written only while the state carries no value (by the producer), read
  // only by whoever wins the transition out of NO_REQUEST_HAS_VALUE.
  value: UnsafeCell<Option<R>>,
  cancelled: AtomicBool,
  upstream: OnceLock<Subscription>,
  component: ComponentInfo,
}

// SAFETY: `value` is never accessed by two threads at once. See the
// state-word protocol in the module docs and the SAFETY notes at each access.
unsafe impl<R: Send> Send for Deferred<R> {}
// SAFETY: as above; everything else is atomics or already `Sync`.
unsafe impl<R: Send> Sync for Deferred<R> {}

impl<R: Send + 'static> Deferred<R> {
  /// Creates a coordinator that will emit into `observer`.
  pub fn new(observer: Arc<dyn Observer<R>>, component: ComponentInfo) -> Arc<Self> {
    Arc::new(Self {
      observer,
      state: AtomicU8::new(NO_REQUEST_NO_VALUE),
      value: UnsafeCell::new(None),
      cancelled: AtomicBool::new(false),
      upstream: OnceLock::new(),
      component,
    })
  }

  /// Returns a consumer-facing subscription backed by this coordinator.
  pub fn subscription(self: &Arc<Self>) -> Subscription {
    Subscription::new(self.clone())
  }
}

impl<R> Deferred<R> {
  /// Current state, for diagnostics.
  pub fn state(&self) -> DeferredState {
    DeferredState::from_raw(self.state.load(Ordering::Acquire))
  }

  /// Returns `true` once the consumer cancelled.
  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }

  /// Hands the final value over.
  ///
  /// Emits immediately (value then completion) if demand is already
  /// present, otherwise parks the value until the first request. A value
  /// produced after cancellation is dropped.
  pub fn complete(&self, value: R) {
    let mut value = Some(value);
    loop {
      if self.is_cancelled() {
        debug!(component = %self.component, "dropping aggregate produced after cancellation");
        return;
      }
      let state = self.state.load(Ordering::Acquire);
      match state {
        NO_REQUEST_HAS_VALUE | HAS_REQUEST_HAS_VALUE => {
          trace!(component = %self.component, "complete after terminal state ignored");
          return;
        }
        HAS_REQUEST_NO_VALUE => {
          if self.transition(state, HAS_REQUEST_HAS_VALUE) {
            if let Some(value) = value.take() {
              self.emit(value);
            }
            return;
          }
        }
        _ => {
          // SAFETY: the state carries no value, so no consumer-side reader
          // touches the slot until our CAS below publishes it.
          unsafe { *self.value.get() = value.take() };
          if self.transition(state, NO_REQUEST_HAS_VALUE) {
            trace!(component = %self.component, "aggregate parked until requested");
            return;
          }
          // SAFETY: the CAS failed, the slot was never published.
          value = unsafe { (*self.value.get()).take() };
        }
      }
    }
  }

  /// Forwards `error` to the observer immediately, regardless of demand.
  ///
  /// Any held value is dropped. Suppressed if the consumer cancelled or a
  /// terminal signal was already delivered.
  pub fn fail(&self, error: AggregateError) {
    let previous = self.retire();
    if previous == HAS_REQUEST_HAS_VALUE || self.is_cancelled() {
      debug!(component = %self.component, %error, "error suppressed after terminal state");
      return;
    }
    debug!(component = %self.component, %error, "forwarding error");
    self.observer.on_error(error);
  }

  /// Signals that the source finished without an element to aggregate.
  pub fn complete_empty(&self) {
    self.fail(AggregateError::NoSuchElement);
  }

  /// Records the upstream subscription so cancellation can reach it.
  pub fn attach_upstream(&self, subscription: Subscription) {
    if self.upstream.set(subscription.clone()).is_err() {
      debug!(component = %self.component, "upstream already attached");
      return;
    }
    fence(Ordering::SeqCst);
    if self.is_cancelled() {
      subscription.cancel();
    }
  }

  /// Cancels the upstream subscription, if one is attached.
  pub fn cancel_upstream(&self) {
    if let Some(upstream) = self.upstream.get() {
      upstream.cancel();
    }
  }

  fn transition(&self, from: u8, to: u8) -> bool {
    self
      .state
      .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
      .is_ok()
  }

  /// Moves to the terminal state, dropping a parked value. Returns the
  /// previous state.
  fn retire(&self) -> u8 {
    let previous = self.state.swap(HAS_REQUEST_HAS_VALUE, Ordering::AcqRel);
    if previous == NO_REQUEST_HAS_VALUE {
      // SAFETY: we performed the only transition out of NO_REQUEST_HAS_VALUE.
      drop(unsafe { (*self.value.get()).take() });
    }
    previous
  }

  fn emit(&self, value: R) {
    trace!(component = %self.component, "emitting aggregate");
    self.observer.on_next(value);
    if !self.is_cancelled() {
      self.observer.on_complete();
    }
  }
}

impl<R: Send> Demand for Deferred<R> {
  fn request(&self, n: i64) {
    if n <= 0 {
      return;
    }
    loop {
      if self.is_cancelled() {
        return;
      }
      let state = self.state.load(Ordering::Acquire);
      match state {
        HAS_REQUEST_NO_VALUE | HAS_REQUEST_HAS_VALUE => return,
        NO_REQUEST_HAS_VALUE => {
          if self.transition(state, HAS_REQUEST_HAS_VALUE) {
            // SAFETY: we won the only transition out of NO_REQUEST_HAS_VALUE;
            // the Acquire half of the CAS pairs with the producer's publish.
            if let Some(value) = unsafe { (*self.value.get()).take() } {
              self.emit(value);
            }
            return;
          }
        }
        _ => {
          if self.transition(state, HAS_REQUEST_NO_VALUE) {
            trace!(component = %self.component, n, "demand recorded before value");
            return;
          }
        }
      }
    }
  }

  fn cancel(&self) {
    if self.cancelled.swap(true, Ordering::SeqCst) {
      return;
    }
    trace!(component = %self.component, "cancelled");
    self.retire();
    fence(Ordering::SeqCst);
    self.cancel_upstream();
  }

  fn is_cancelled(&self) -> bool {
    Deferred::is_cancelled(self)
  }
}

impl<R> fmt::Debug for Deferred<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Deferred")
      .field("component", &self.component)
      .field("state", &self.state())
      .field("cancelled", &self.is_cancelled())
      .finish()
  }
}
