//! Orderings and the extremal-replace rule shared by every min/max operator.
//!
//! A [`Comparator`] orders two items and may fail (natural ordering over
//! `PartialOrd` values that have no ordering, e.g. NaN). [`Direction`] turns
//! one comparison routine into "minimum" or "maximum" through a signed
//! multiplier, the compensator: `+1` selects the minimum, `-1` the maximum.

use crate::error::AggregateError;
use std::cmp::Ordering;

/// Orders two values of `T`.
pub trait Comparator<T>: Send + 'static {
  /// Compares `a` with `b`.
  fn compare(&self, a: &T, b: &T) -> Result<Ordering, AggregateError>;
}

/// Natural ordering via [`PartialOrd`]. Stateless; share it freely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

/// The process-wide natural ordering.
pub const NATURAL_ORDER: NaturalOrder = NaturalOrder;

impl<T: PartialOrd> Comparator<T> for NaturalOrder {
  fn compare(&self, a: &T, b: &T) -> Result<Ordering, AggregateError> {
    a.partial_cmp(b).ok_or_else(|| {
      AggregateError::Incomparable(format!(
        "no ordering between two `{}` values",
        std::any::type_name::<T>()
      ))
    })
  }
}

/// Adapts an infallible `Fn(&T, &T) -> Ordering`.
#[derive(Debug, Clone, Copy)]
pub struct ByOrdering<F>(pub F);

impl<T, F> Comparator<T> for ByOrdering<F>
where
  F: Fn(&T, &T) -> Ordering + Send + 'static,
{
  fn compare(&self, a: &T, b: &T) -> Result<Ordering, AggregateError> {
    Ok((self.0)(a, b))
  }
}

/// Adapts a fallible `Fn(&T, &T) -> Result<Ordering, AggregateError>`.
#[derive(Debug, Clone, Copy)]
pub struct TryByOrdering<F>(pub F);

impl<T, F> Comparator<T> for TryByOrdering<F>
where
  F: Fn(&T, &T) -> Result<Ordering, AggregateError> + Send + 'static,
{
  fn compare(&self, a: &T, b: &T) -> Result<Ordering, AggregateError> {
    (self.0)(a, b)
  }
}

/// Which extremum an operator selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  /// Select the smallest value.
  Min,
  /// Select the largest value.
  Max,
}

impl Direction {
  /// Signed multiplier applied to comparator results.
  pub const fn compensator(self) -> i32 {
    match self {
      Direction::Min => 1,
      Direction::Max => -1,
    }
  }

  /// Returns `true` when a new item should replace the held one, given
  /// `compare(held, new)`.
  ///
  /// Only a strictly more extreme item wins, so ties keep the earliest.
  pub fn prefers(self, held_vs_new: Ordering) -> bool {
    self.compensator() * held_vs_new as i32 > 0
  }
}
