//! # Aggregation Errors
//!
//! Every failure an aggregation can surface to its consumer. All of them are
//! terminal: once one is delivered the subscription is finished and no value
//! or completion signal follows.
//!
//! ## Error Kinds
//!
//! - **NoSuchElement**: `min`/`max` over a source that completed empty
//! - **ArgumentRequired**: a sum without zero-default over an empty source
//! - **Incomparable**: the comparator (or natural ordering) could not order two items
//! - **Upstream**: any error raised by the source, forwarded verbatim
//!
//! ## Example
//!
//! ```rust
//! use streamweave_math::AggregateError;
//!
//! let io = std::io::Error::other("disk went away");
//! let error = AggregateError::upstream(io);
//! assert!(error.is_upstream());
//! assert_eq!(error.to_string(), "upstream error: disk went away");
//! ```

use std::error::Error;
use std::sync::Arc;
use thiserror::Error;

/// Error delivered to the consumer of an aggregation.
///
/// Cloning is cheap: upstream causes are shared behind an [`Arc`].
#[derive(Error, Debug, Clone)]
pub enum AggregateError {
  /// The source completed without producing any element to aggregate.
  #[error("sequence contains no elements")]
  NoSuchElement,
  /// A sum that requires at least one element saw an empty source.
  #[error("sum requires at least one element")]
  ArgumentRequired,
  /// Two items could not be ordered.
  #[error("values are not comparable: {0}")]
  Incomparable(String),
  /// The source stream failed.
  #[error("upstream error: {0}")]
  Upstream(#[source] Arc<dyn Error + Send + Sync>),
}

impl AggregateError {
  /// Wraps an arbitrary source error as [`AggregateError::Upstream`].
  pub fn upstream<E>(error: E) -> Self
  where
    E: Error + Send + Sync + 'static,
  {
    Self::Upstream(Arc::new(error))
  }

  /// Returns `true` if the error originated in the source stream.
  pub fn is_upstream(&self) -> bool {
    matches!(self, Self::Upstream(_))
  }

  /// Returns `true` if the error signals an empty source.
  pub fn is_empty_source(&self) -> bool {
    matches!(self, Self::NoSuchElement | Self::ArgumentRequired)
  }
}

/// Name and kind of the operator that produced an event, attached to log records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
  /// User-assigned name, or the operator kind when none was set.
  pub name: String,
  /// Operator kind, e.g. `"sum"` or `"max_by"`.
  pub type_name: &'static str,
}

impl ComponentInfo {
  /// Creates component info for an operator of the given kind.
  pub fn new(name: Option<String>, type_name: &'static str) -> Self {
    Self {
      name: name.unwrap_or_else(|| type_name.to_string()),
      type_name,
    }
  }
}

impl std::fmt::Display for ComponentInfo {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    if self.name == self.type_name {
      write!(f, "{}", self.type_name)
    } else {
      write!(f, "{}({})", self.name, self.type_name)
    }
  }
}
