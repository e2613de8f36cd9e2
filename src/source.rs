//! # Sources
//!
//! Publishers that adapt ordinary Rust sequences to the push contract.
//!
//! - [`from_iter`] / [`from_results`]: synchronous; the whole sequence is
//!   pushed from inside [`Publisher::subscribe`]
//! - [`from_stream`] / [`from_try_stream`]: drive a [`futures::Stream`] on a
//!   spawned tokio task, so they must be subscribed inside a runtime
//!
//! All of them push eagerly and honor only cancellation. Synchronous sources
//! check it before every item; async sources also stop while waiting for one.

use crate::error::AggregateError;
use crate::subscriber::{CancelFlag, Demand, Publisher, Subscriber, Subscription};
use futures::{Stream, StreamExt};
use std::error::Error;
use std::iter::Map;
use tracing::trace;

/// Synchronous publisher over an iterator of results.
#[derive(Debug, Clone)]
pub struct IterPublisher<I> {
  iter: I,
}

impl<T, I> Publisher<T> for IterPublisher<I>
where
  I: IntoIterator<Item = Result<T, AggregateError>> + Send + 'static,
{
  fn subscribe(self, mut subscriber: Box<dyn Subscriber<T>>) {
    let flag = CancelFlag::new();
    subscriber.on_subscribe(Subscription::new(flag.clone()));
    for item in self.iter {
      if flag.is_cancelled() {
        trace!("iterator source cancelled");
        return;
      }
      match item {
        Ok(item) => subscriber.on_next(item),
        Err(error) => {
          subscriber.on_error(error);
          return;
        }
      }
    }
    if !flag.is_cancelled() {
      subscriber.on_complete();
    }
  }
}

/// Publisher that drives a stream of results on a tokio task.
#[derive(Debug)]
pub struct StreamPublisher<S> {
  stream: S,
}

impl<T, S> Publisher<T> for StreamPublisher<S>
where
  S: Stream<Item = Result<T, AggregateError>> + Send + 'static,
  T: Send + 'static,
{
  fn subscribe(self, mut subscriber: Box<dyn Subscriber<T>>) {
    tokio::spawn(async move {
      let flag = CancelFlag::new();
      subscriber.on_subscribe(Subscription::new(flag.clone()));
      let mut stream = Box::pin(self.stream);
      loop {
        let item = tokio::select! {
          biased;
          _ = flag.cancelled() => {
            trace!("stream source cancelled");
            return;
          }
          item = stream.next() => item,
        };
        let Some(item) = item else {
          break;
        };
        match item {
          Ok(item) => subscriber.on_next(item),
          Err(error) => {
            subscriber.on_error(error);
            return;
          }
        }
      }
      if !flag.is_cancelled() {
        subscriber.on_complete();
      }
    });
  }
}

/// Item adapter wrapping plain items as `Ok`.
pub type OkFn<T> = fn(T) -> Result<T, AggregateError>;

fn upstream_error<T, E>(item: Result<T, E>) -> Result<T, AggregateError>
where
  E: Error + Send + Sync + 'static,
{
  item.map_err(AggregateError::upstream)
}

/// Publishes every item of `iter`, then completes.
pub fn from_iter<I>(iter: I) -> IterPublisher<Map<I::IntoIter, OkFn<I::Item>>>
where
  I: IntoIterator,
  I::IntoIter: Send + 'static,
  I::Item: 'static,
{
  let ok: OkFn<I::Item> = Ok;
  IterPublisher {
    iter: iter.into_iter().map(ok),
  }
}

/// Publishes `Ok` items; the first `Err` terminates the source with it.
pub fn from_results<T, I>(iter: I) -> IterPublisher<I::IntoIter>
where
  I: IntoIterator<Item = Result<T, AggregateError>>,
  I::IntoIter: Send + 'static,
{
  IterPublisher {
    iter: iter.into_iter(),
  }
}

/// Publishes every item of `stream` from a spawned tokio task.
pub fn from_stream<S>(stream: S) -> StreamPublisher<futures::stream::Map<S, OkFn<S::Item>>>
where
  S: Stream + Send + 'static,
  S::Item: Send + 'static,
{
  let ok: OkFn<S::Item> = Ok;
  StreamPublisher {
    stream: stream.map(ok),
  }
}

/// Publishes the `Ok` items of `stream`; an `Err` becomes
/// [`AggregateError::Upstream`] and terminates the source.
#[allow(clippy::type_complexity)]
pub fn from_try_stream<T, E, S>(
  stream: S,
) -> StreamPublisher<futures::stream::Map<S, fn(Result<T, E>) -> Result<T, AggregateError>>>
where
  S: Stream<Item = Result<T, E>> + Send + 'static,
  T: Send + 'static,
  E: Error + Send + Sync + 'static,
{
  let wrap: fn(Result<T, E>) -> Result<T, AggregateError> = upstream_error;
  StreamPublisher {
    stream: stream.map(wrap),
  }
}
