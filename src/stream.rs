//! # Async Bridge
//!
//! [`AggregateStream`] exposes an aggregation as a [`futures::Stream`] of
//! `Result<R, AggregateError>` that yields the aggregate (or the error) and
//! then ends.
//!
//! The polling task is the consumer: demand for one item is signalled on the
//! first poll, which may race the source finishing on another task. Dropping
//! the stream cancels the subscription.
//!
//! ```rust
//! use futures::StreamExt;
//! use streamweave_math::{Aggregate, from_iter, min};
//!
//! # async fn example() {
//! let results: Vec<_> = min(from_iter(vec![3, 1, 2])).into_stream().collect().await;
//! assert_eq!(results.len(), 1);
//! assert_eq!(*results[0].as_ref().unwrap(), 1);
//! # }
//! ```

use crate::aggregate::Aggregate;
use crate::error::AggregateError;
use crate::subscriber::{Observer, Subscription};
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use tokio::sync::mpsc;
use tracing::trace;

pub(crate) enum Signal<R> {
  Next(R),
  Error(AggregateError),
  Complete,
}

/// Observer forwarding every signal into a channel.
pub(crate) struct ChannelObserver<R> {
  pub(crate) sender: mpsc::UnboundedSender<Signal<R>>,
}

impl<R: Send> Observer<R> for ChannelObserver<R> {
  fn on_next(&self, value: R) {
    if self.sender.send(Signal::Next(value)).is_err() {
      trace!("aggregate stream dropped before value");
    }
  }

  fn on_error(&self, error: AggregateError) {
    if self.sender.send(Signal::Error(error)).is_err() {
      trace!("aggregate stream dropped before error");
    }
  }

  fn on_complete(&self) {
    if self.sender.send(Signal::Complete).is_err() {
      trace!("aggregate stream dropped before completion");
    }
  }
}

/// Stream yielding the result of one aggregation.
pub struct AggregateStream<R> {
  receiver: mpsc::UnboundedReceiver<Signal<R>>,
  subscription: Subscription,
  requested: bool,
  done: bool,
}

impl<R: Send + 'static> AggregateStream<R> {
  /// Subscribes `aggregate` and wraps the result.
  pub fn new<A>(aggregate: A) -> Self
  where
    A: Aggregate<Output = R>,
  {
    let (sender, receiver) = mpsc::unbounded_channel();
    let subscription = aggregate.subscribe(Arc::new(ChannelObserver { sender }));
    Self {
      receiver,
      subscription,
      requested: false,
      done: false,
    }
  }

  /// Waits for the aggregate.
  ///
  /// A stream that ends without a value reports
  /// [`AggregateError::NoSuchElement`].
  pub async fn single(mut self) -> Result<R, AggregateError> {
    match self.next().await {
      Some(result) => result,
      None => Err(AggregateError::NoSuchElement),
    }
  }
}

impl<R> AggregateStream<R> {
  /// The demand handle of the underlying subscription.
  pub fn subscription(&self) -> &Subscription {
    &self.subscription
  }
}

impl<R> Unpin for AggregateStream<R> {}

impl<R> Stream for AggregateStream<R> {
  type Item = Result<R, AggregateError>;

  fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    let this = self.get_mut();
    if this.done {
      return Poll::Ready(None);
    }
    if !this.requested {
      this.requested = true;
      this.subscription.request(1);
    }
    match ready!(this.receiver.poll_recv(cx)) {
      Some(Signal::Next(value)) => Poll::Ready(Some(Ok(value))),
      Some(Signal::Error(error)) => {
        this.done = true;
        Poll::Ready(Some(Err(error)))
      }
      Some(Signal::Complete) | None => {
        this.done = true;
        Poll::Ready(None)
      }
    }
  }
}

impl<R> Drop for AggregateStream<R> {
  fn drop(&mut self) {
    self.subscription.cancel();
  }
}
