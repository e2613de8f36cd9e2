//! Generic fold: a seed folded with every item, emitted once on completion.
//!
//! An empty source yields the untouched seed.

use crate::aggregate::{Accumulate, Aggregate, subscribe_deferred};
use crate::config::AggregateConfig;
use crate::error::{AggregateError, ComponentInfo};
use crate::subscriber::{Observer, Publisher, Subscription};
use std::marker::PhantomData;
use std::sync::Arc;

/// Fold state: the accumulator and the combining function.
pub struct Folder<A, F> {
  acc: A,
  fold: F,
}

impl<T, A, F> Accumulate<T> for Folder<A, F>
where
  A: Send,
  F: FnMut(&mut A, T) -> Result<(), AggregateError> + Send,
{
  type Output = A;

  fn accumulate(&mut self, item: T) -> Result<(), AggregateError> {
    (self.fold)(&mut self.acc, item)
  }

  fn finish(self) -> Result<A, AggregateError> {
    Ok(self.acc)
  }
}

/// Fold aggregation built by [`collect`].
pub struct Collect<P, T, S, F> {
  source: P,
  seed: S,
  fold: F,
  kind: &'static str,
  config: AggregateConfig,
  _item: PhantomData<fn(T)>,
}

impl<P, T, S, F> Collect<P, T, S, F> {
  pub(crate) fn with_kind(mut self, kind: &'static str) -> Self {
    self.kind = kind;
    self
  }
}

impl<P, T, A, S, F> Aggregate for Collect<P, T, S, F>
where
  P: Publisher<T>,
  T: 'static,
  A: Send + 'static,
  S: FnOnce() -> A + Send + 'static,
  F: FnMut(&mut A, T) -> Result<(), AggregateError> + Send + 'static,
{
  type Output = A;

  fn subscribe(self, observer: Arc<dyn Observer<A>>) -> Subscription {
    let component = ComponentInfo::new(self.config.name(), self.kind);
    let folder = Folder {
      acc: (self.seed)(),
      fold: self.fold,
    };
    subscribe_deferred(self.source, component, observer, folder)
  }

  fn config(&self) -> &AggregateConfig {
    &self.config
  }

  fn config_mut(&mut self) -> &mut AggregateConfig {
    &mut self.config
  }
}

/// Folds `source` into the value created by `seed`.
///
/// `fold` may fail; the error ends the aggregation and cancels the source.
pub fn collect<P, T, A, S, F>(source: P, seed: S, fold: F) -> Collect<P, T, S, F>
where
  P: Publisher<T>,
  S: FnOnce() -> A,
  F: FnMut(&mut A, T) -> Result<(), AggregateError>,
{
  Collect {
    source,
    seed,
    fold,
    kind: "collect",
    config: AggregateConfig::default(),
    _item: PhantomData,
  }
}
