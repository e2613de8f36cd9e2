//! # Sum
//!
//! Sums a numeric source into a single value. One generic accumulator serves
//! every numeric kind; [`SumKind`] supplies the additive identity and the
//! native addition (wrapping for integers, IEEE rounding for floats).
//!
//! Two flavours exist:
//!
//! - [`sum`]: an empty source yields the additive identity
//! - [`sum_at_least_one`]: an empty source yields
//!   [`AggregateError::ArgumentRequired`]
//!
//! ```rust
//! use streamweave_math::{Aggregate, from_iter, sum};
//!
//! # async fn example() {
//! let total = sum::<i64, _>(from_iter(vec![1i64, 2, 3, 4]))
//!   .into_stream()
//!   .single()
//!   .await;
//! assert_eq!(total.unwrap(), 10);
//! # }
//! ```

use crate::aggregate::{Accumulate, Aggregate, subscribe_deferred};
use crate::config::AggregateConfig;
use crate::error::{AggregateError, ComponentInfo};
use crate::subscriber::{Observer, Publisher, Subscription};
use num_traits::{WrappingAdd, Zero};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

/// Numeric kinds that can be summed.
pub trait SumKind: Zero + Copy + Debug + Send + 'static {
  /// Adds `item` with the kind's native semantics.
  fn add_native(self, item: Self) -> Self;
}

macro_rules! wrapping_sum_kind {
  ($($ty:ty),*) => {
    $(
      impl SumKind for $ty {
        fn add_native(self, item: Self) -> Self {
          WrappingAdd::wrapping_add(&self, &item)
        }
      }
    )*
  };
}

macro_rules! float_sum_kind {
  ($($ty:ty),*) => {
    $(
      impl SumKind for $ty {
        fn add_native(self, item: Self) -> Self {
          self + item
        }
      }
    )*
  };
}

wrapping_sum_kind!(i32, i64);
float_sum_kind!(f32, f64);

/// Running total of a sum.
#[derive(Debug, Clone, Copy)]
pub struct SumState<K> {
  total: K,
  has_value: bool,
}

impl<K: SumKind> SumState<K> {
  /// Starts a sum. With `zero_default` an empty source yields zero.
  pub fn new(zero_default: bool) -> Self {
    Self {
      total: K::zero(),
      has_value: zero_default,
    }
  }
}

impl<K: SumKind> Accumulate<K> for SumState<K> {
  type Output = K;

  fn accumulate(&mut self, item: K) -> Result<(), AggregateError> {
    self.total = self.total.add_native(item);
    self.has_value = true;
    Ok(())
  }

  fn finish(self) -> Result<K, AggregateError> {
    if self.has_value {
      Ok(self.total)
    } else {
      Err(AggregateError::ArgumentRequired)
    }
  }
}

/// Sum aggregation over a source of `K`.
pub struct Sum<P, K> {
  source: P,
  zero_default: bool,
  config: AggregateConfig,
  _kind: PhantomData<fn() -> K>,
}

impl<P, K> Sum<P, K>
where
  P: Publisher<K>,
  K: SumKind,
{
  /// Creates a sum over `source`.
  ///
  /// # Arguments
  ///
  /// * `source` - The items to add up.
  /// * `zero_default` - Whether an empty source yields zero instead of an error.
  pub fn new(source: P, zero_default: bool) -> Self {
    Self {
      source,
      zero_default,
      config: AggregateConfig::default(),
      _kind: PhantomData,
    }
  }

  /// Returns `true` if an empty source yields zero.
  pub fn zero_default(&self) -> bool {
    self.zero_default
  }
}

impl<P, K> Aggregate for Sum<P, K>
where
  P: Publisher<K>,
  K: SumKind,
{
  type Output = K;

  fn subscribe(self, observer: Arc<dyn Observer<K>>) -> Subscription {
    let kind = if self.zero_default { "sum" } else { "sum_at_least_one" };
    let component = ComponentInfo::new(self.config.name(), kind);
    subscribe_deferred(
      self.source,
      component,
      observer,
      SumState::<K>::new(self.zero_default),
    )
  }

  fn config(&self) -> &AggregateConfig {
    &self.config
  }

  fn config_mut(&mut self) -> &mut AggregateConfig {
    &mut self.config
  }
}

/// Sums `source`; an empty source yields zero.
pub fn sum<K, P>(source: P) -> Sum<P, K>
where
  P: Publisher<K>,
  K: SumKind,
{
  Sum::new(source, true)
}

/// Sums `source`; an empty source yields [`AggregateError::ArgumentRequired`].
pub fn sum_at_least_one<K, P>(source: P) -> Sum<P, K>
where
  P: Publisher<K>,
  K: SumKind,
{
  Sum::new(source, false)
}
