//! # Min / Max
//!
//! Selects the single smallest or largest item of a source.
//!
//! The held extremum is replaced only when a new item is strictly more
//! extreme, so among equal items the earliest one wins. An empty source is an
//! error ([`AggregateError::NoSuchElement`]); a comparison failure ends the
//! aggregation with that error and cancels the source.

use crate::aggregate::{Accumulate, Aggregate, subscribe_deferred};
use crate::compare::{ByOrdering, Comparator, Direction, NaturalOrder};
use crate::config::AggregateConfig;
use crate::error::{AggregateError, ComponentInfo};
use crate::subscriber::{Observer, Publisher, Subscription};
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::sync::Arc;

/// Running extremum.
pub struct Extremum<T, C> {
  held: Option<T>,
  comparator: C,
  direction: Direction,
}

impl<T, C> Extremum<T, C> {
  /// Starts with nothing held.
  pub fn new(comparator: C, direction: Direction) -> Self {
    Self {
      held: None,
      comparator,
      direction,
    }
  }
}

impl<T, C> Accumulate<T> for Extremum<T, C>
where
  T: Send,
  C: Comparator<T>,
{
  type Output = T;

  fn accumulate(&mut self, item: T) -> Result<(), AggregateError> {
    match &self.held {
      None => self.held = Some(item),
      Some(held) => {
        if self.direction.prefers(self.comparator.compare(held, &item)?) {
          self.held = Some(item);
        }
      }
    }
    Ok(())
  }

  fn finish(self) -> Result<T, AggregateError> {
    self.held.ok_or(AggregateError::NoSuchElement)
  }
}

/// Minimum or maximum of a source under a comparator.
pub struct MinMax<P, T, C> {
  source: P,
  comparator: C,
  direction: Direction,
  config: AggregateConfig,
  _item: PhantomData<fn() -> T>,
}

impl<P, T, C> MinMax<P, T, C>
where
  P: Publisher<T>,
  T: Send + 'static,
  C: Comparator<T>,
{
  /// Creates a min/max aggregation.
  ///
  /// # Arguments
  ///
  /// * `source` - The items to select from.
  /// * `comparator` - The ordering to apply.
  /// * `direction` - Whether to keep the smallest or the largest item.
  pub fn new(source: P, comparator: C, direction: Direction) -> Self {
    Self {
      source,
      comparator,
      direction,
      config: AggregateConfig::default(),
      _item: PhantomData,
    }
  }

  /// Returns the selected direction.
  pub fn direction(&self) -> Direction {
    self.direction
  }
}

impl<P, T, C> Aggregate for MinMax<P, T, C>
where
  P: Publisher<T>,
  T: Send + 'static,
  C: Comparator<T>,
{
  type Output = T;

  fn subscribe(self, observer: Arc<dyn Observer<T>>) -> Subscription {
    let kind = match self.direction {
      Direction::Min => "min",
      Direction::Max => "max",
    };
    let component = ComponentInfo::new(self.config.name(), kind);
    subscribe_deferred(
      self.source,
      component,
      observer,
      Extremum::new(self.comparator, self.direction),
    )
  }

  fn config(&self) -> &AggregateConfig {
    &self.config
  }

  fn config_mut(&mut self) -> &mut AggregateConfig {
    &mut self.config
  }
}

/// Smallest item under the natural ordering.
pub fn min<T, P>(source: P) -> MinMax<P, T, NaturalOrder>
where
  P: Publisher<T>,
  T: PartialOrd + Send + 'static,
{
  MinMax::new(source, NaturalOrder, Direction::Min)
}

/// Largest item under the natural ordering.
pub fn max<T, P>(source: P) -> MinMax<P, T, NaturalOrder>
where
  P: Publisher<T>,
  T: PartialOrd + Send + 'static,
{
  MinMax::new(source, NaturalOrder, Direction::Max)
}

/// Smallest item under `compare`.
pub fn min_with<T, P, F>(source: P, compare: F) -> MinMax<P, T, ByOrdering<F>>
where
  P: Publisher<T>,
  T: Send + 'static,
  F: Fn(&T, &T) -> Ordering + Send + 'static,
{
  MinMax::new(source, ByOrdering(compare), Direction::Min)
}

/// Largest item under `compare`.
pub fn max_with<T, P, F>(source: P, compare: F) -> MinMax<P, T, ByOrdering<F>>
where
  P: Publisher<T>,
  T: Send + 'static,
  F: Fn(&T, &T) -> Ordering + Send + 'static,
{
  MinMax::new(source, ByOrdering(compare), Direction::Max)
}

/// Extremum of `source` under any [`Comparator`], in the given direction.
pub fn min_max<T, P, C>(source: P, comparator: C, direction: Direction) -> MinMax<P, T, C>
where
  P: Publisher<T>,
  T: Send + 'static,
  C: Comparator<T>,
{
  MinMax::new(source, comparator, direction)
}
