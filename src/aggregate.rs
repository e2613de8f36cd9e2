//! # Aggregate Operators
//!
//! Every scalar aggregation follows the same shape: an upstream-facing
//! [`Subscriber`] folds items into private state and, on completion, hands
//! the result to a shared [`Deferred`] coordinator, which releases it to the
//! consumer once demand is present.
//!
//! The fold itself is described by [`Accumulate`]; [`DeferredSubscriber`]
//! adapts any accumulator to the subscriber contract and owns the plumbing
//! (upstream attachment, error routing, cancellation checks).

use crate::config::AggregateConfig;
use crate::deferred::Deferred;
use crate::error::{AggregateError, ComponentInfo};
use crate::stream::AggregateStream;
use crate::subscriber::{Observer, Publisher, Subscriber, Subscription, UNBOUNDED};
use std::sync::Arc;

/// A single-value aggregation over a source.
pub trait Aggregate: Send + Sized + 'static {
  /// The aggregate's type.
  type Output: Send + 'static;

  /// Subscribes `observer` and returns its demand handle.
  ///
  /// Nothing is delivered to the observer before it requests at least one
  /// item, except errors.
  fn subscribe(self, observer: Arc<dyn Observer<Self::Output>>) -> Subscription;

  /// Returns the operator configuration.
  fn config(&self) -> &AggregateConfig;

  /// Returns the operator configuration mutably.
  fn config_mut(&mut self) -> &mut AggregateConfig;

  /// Sets the name used in this operator's log records.
  #[must_use]
  fn with_name(mut self, name: impl Into<String>) -> Self {
    self.config_mut().name = Some(name.into());
    self
  }

  /// Subscribes and exposes the result as a [`futures::Stream`].
  fn into_stream(self) -> AggregateStream<Self::Output> {
    AggregateStream::new(self)
  }
}

/// Fold state of a scalar aggregation.
///
/// Driven by a single upstream subscription, so never accessed concurrently.
pub trait Accumulate<T>: Send {
  /// The aggregate produced by [`finish`](Self::finish).
  type Output;

  /// Folds one item in. An error ends the aggregation.
  fn accumulate(&mut self, item: T) -> Result<(), AggregateError>;

  /// Produces the aggregate once the source completed.
  fn finish(self) -> Result<Self::Output, AggregateError>;
}

/// Adapts an [`Accumulate`] to the [`Subscriber`] contract, feeding its result
/// into a [`Deferred`].
pub struct DeferredSubscriber<R, A> {
  deferred: Arc<Deferred<R>>,
  accumulator: Option<A>,
}

impl<R, A> DeferredSubscriber<R, A> {
  /// Wraps `accumulator`, emitting through `deferred`.
  pub fn new(deferred: Arc<Deferred<R>>, accumulator: A) -> Self {
    Self {
      deferred,
      accumulator: Some(accumulator),
    }
  }
}

impl<T, R, A> Subscriber<T> for DeferredSubscriber<R, A>
where
  A: Accumulate<T, Output = R>,
  R: Send + 'static,
{
  fn on_subscribe(&mut self, subscription: Subscription) {
    self.deferred.attach_upstream(subscription.clone());
    subscription.request(UNBOUNDED);
  }

  fn on_next(&mut self, item: T) {
    if self.deferred.is_cancelled() {
      self.accumulator = None;
      self.deferred.cancel_upstream();
      return;
    }
    let Some(accumulator) = self.accumulator.as_mut() else {
      return;
    };
    if let Err(error) = accumulator.accumulate(item) {
      self.accumulator = None;
      self.deferred.cancel_upstream();
      self.deferred.fail(error);
    }
  }

  fn on_error(&mut self, error: AggregateError) {
    if self.accumulator.take().is_some() {
      self.deferred.fail(error);
    }
  }

  fn on_complete(&mut self) {
    let Some(accumulator) = self.accumulator.take() else {
      return;
    };
    match accumulator.finish() {
      Ok(value) => self.deferred.complete(value),
      Err(AggregateError::NoSuchElement) => self.deferred.complete_empty(),
      Err(error) => self.deferred.fail(error),
    }
  }
}

/// Wires `observer` to a fresh coordinator, then subscribes the accumulator
/// built by `accumulator` to `source`.
///
/// The observer sees its subscription before the source starts, so it can
/// request or cancel up front.
pub(crate) fn subscribe_deferred<T, R, P, A>(
  source: P,
  component: ComponentInfo,
  observer: Arc<dyn Observer<R>>,
  accumulator: A,
) -> Subscription
where
  P: Publisher<T>,
  A: Accumulate<T, Output = R> + 'static,
  R: Send + 'static,
  T: 'static,
{
  let deferred = Deferred::new(observer.clone(), component);
  let subscription = deferred.subscription();
  observer.on_subscribe(&subscription);
  if subscription.is_cancelled() {
    return subscription;
  }
  source.subscribe(Box::new(DeferredSubscriber::new(deferred, accumulator)));
  subscription
}
