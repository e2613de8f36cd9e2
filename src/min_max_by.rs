//! # Min-By / Max-By
//!
//! Arg-min and arg-max: every item whose derived key is extremal, ties
//! included, in encounter order. Built on [`collect`] rather than on a
//! scalar extremum because the result is a collection.
//!
//! Each new item's key is compared with the key of the first retained item
//! (all retained items share one key):
//!
//! - equal: the item joins the ties
//! - strictly more extreme, per [`Direction::prefers`]: the ties are replaced
//!   by the item
//! - otherwise: the item is discarded
//!
//! The rule is the same one [`min`](crate::min_max::min) and
//! [`max`](crate::min_max::max) use, so `min_by(identity)` starts with the
//! element `min` returns. An empty source yields an empty collection.
//!
//! ```rust
//! use streamweave_math::{Aggregate, from_iter, max_by};
//!
//! # async fn example() {
//! let words = from_iter(vec!["ox", "bee", "cat", "ant"]);
//! let longest = max_by(words, |w: &&str| w.len()).into_stream().single().await;
//! assert_eq!(longest.unwrap(), vec!["bee", "cat", "ant"]);
//! # }
//! ```

use crate::aggregate::Aggregate;
use crate::collect::collect;
use crate::compare::{ByOrdering, Comparator, Direction, NaturalOrder};
use crate::error::AggregateError;
use crate::subscriber::Publisher;
use std::cmp::Ordering;

/// Fold step retaining the items whose key is extremal.
fn retain_extremal<T, K, S, C>(
  selector: S,
  comparator: C,
  direction: Direction,
) -> impl FnMut(&mut Vec<T>, T) -> Result<(), AggregateError> + Send
where
  S: Fn(&T) -> K + Send,
  C: Comparator<K>,
{
  move |ties: &mut Vec<T>, item: T| {
    let Some(first) = ties.first() else {
      ties.push(item);
      return Ok(());
    };
    let ordering = comparator.compare(&selector(first), &selector(&item))?;
    if ordering == Ordering::Equal {
      ties.push(item);
    } else if direction.prefers(ordering) {
      ties.clear();
      ties.push(item);
    }
    Ok(())
  }
}

/// Items of `source` whose key under `selector` is extremal in `direction`.
pub fn min_max_by<P, T, K, S, C>(
  source: P,
  selector: S,
  comparator: C,
  direction: Direction,
) -> impl Aggregate<Output = Vec<T>>
where
  P: Publisher<T>,
  T: Send + 'static,
  K: 'static,
  S: Fn(&T) -> K + Send + 'static,
  C: Comparator<K>,
{
  let kind = match direction {
    Direction::Min => "min_by",
    Direction::Max => "max_by",
  };
  collect(
    source,
    Vec::new,
    retain_extremal(selector, comparator, direction),
  )
  .with_kind(kind)
}

/// Items with the smallest key, under the key's natural ordering.
pub fn min_by<P, T, K, S>(source: P, selector: S) -> impl Aggregate<Output = Vec<T>>
where
  P: Publisher<T>,
  T: Send + 'static,
  K: PartialOrd + 'static,
  S: Fn(&T) -> K + Send + 'static,
{
  min_max_by(source, selector, NaturalOrder, Direction::Min)
}

/// Items with the largest key, under the key's natural ordering.
pub fn max_by<P, T, K, S>(source: P, selector: S) -> impl Aggregate<Output = Vec<T>>
where
  P: Publisher<T>,
  T: Send + 'static,
  K: PartialOrd + 'static,
  S: Fn(&T) -> K + Send + 'static,
{
  min_max_by(source, selector, NaturalOrder, Direction::Max)
}

/// Items with the smallest key under `compare`.
pub fn min_by_with<P, T, K, S, F>(
  source: P,
  selector: S,
  compare: F,
) -> impl Aggregate<Output = Vec<T>>
where
  P: Publisher<T>,
  T: Send + 'static,
  K: 'static,
  S: Fn(&T) -> K + Send + 'static,
  F: Fn(&K, &K) -> Ordering + Send + 'static,
{
  min_max_by(source, selector, ByOrdering(compare), Direction::Min)
}

/// Items with the largest key under `compare`.
pub fn max_by_with<P, T, K, S, F>(
  source: P,
  selector: S,
  compare: F,
) -> impl Aggregate<Output = Vec<T>>
where
  P: Publisher<T>,
  T: Send + 'static,
  K: 'static,
  S: Fn(&T) -> K + Send + 'static,
  F: Fn(&K, &K) -> Ordering + Send + 'static,
{
  min_max_by(source, selector, ByOrdering(compare), Direction::Max)
}
