//! # StreamWeave Math
//!
//! Single-value aggregations (sum, min, max, arg-min, arg-max) over
//! push-based, demand-controlled streams with exactly one consumer.
//!
//! The consumer's demand may arrive from a different thread than the one
//! producing items, before or after the aggregate is ready. A lock-free
//! coordinator ([`deferred::Deferred`]) resolves that race so the value is
//! delivered exactly once, followed by one completion signal.
//!
//! ## Key Features
//!
//! - **Lock-Free Hand-Off**: one atomic state word, compare-and-swap only
//! - **Generic Sums**: one accumulator for `i32`, `i64`, `f32` and `f64`
//! - **Stable Extremes**: ties keep the earliest item
//! - **Arg-Min/Arg-Max**: every tied item, in encounter order
//! - **Async-Friendly**: sources from `futures::Stream`, results as a `Stream`
//!
//! ## Quick Start
//!
//! ```rust
//! use streamweave_math::{Aggregate, from_iter, max_with, sum};
//!
//! # async fn example() {
//! let total = sum::<f64, _>(from_iter(vec![1.5, 2.5])).into_stream().single().await;
//! assert_eq!(total.unwrap(), 4.0);
//!
//! let smallest = max_with(from_iter(vec![1, 2, 3]), |a: &i32, b: &i32| b.cmp(a))
//!   .with_name("reverse-max")
//!   .into_stream()
//!   .single()
//!   .await;
//! assert_eq!(smallest.unwrap(), 1);
//! # }
//! ```

#![deny(missing_docs)]

/// Operator trait and the accumulator-to-coordinator adapter.
pub mod aggregate;
/// Generic fold.
pub mod collect;
/// Comparators and the min/max direction rule.
pub mod compare;
/// Operator configuration.
pub mod config;
/// The deferred scalar emission coordinator.
pub mod deferred;
/// Error types.
pub mod error;
/// Minimum and maximum.
pub mod min_max;
/// Arg-min and arg-max.
pub mod min_max_by;
/// Publishers over iterators and async streams.
pub mod source;
/// Aggregation results as a `futures::Stream`.
pub mod stream;
/// Push-stream contracts.
pub mod subscriber;
/// Sums.
pub mod sum;

pub use aggregate::{Accumulate, Aggregate, DeferredSubscriber};
pub use collect::{Collect, collect};
pub use compare::{ByOrdering, Comparator, Direction, NATURAL_ORDER, NaturalOrder, TryByOrdering};
pub use config::AggregateConfig;
pub use deferred::{Deferred, DeferredState};
pub use error::{AggregateError, ComponentInfo};
pub use min_max::{MinMax, max, max_with, min, min_max, min_with};
pub use min_max_by::{max_by, max_by_with, min_by, min_by_with, min_max_by};
pub use source::{from_iter, from_results, from_stream, from_try_stream};
pub use stream::AggregateStream;
pub use subscriber::{Demand, Observer, Publisher, Subscriber, Subscription, UNBOUNDED};
pub use sum::{Sum, SumKind, sum, sum_at_least_one};

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod deferred_test;
