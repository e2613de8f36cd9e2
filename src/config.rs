//! Operator configuration.
//!
//! Aggregations carry an [`AggregateConfig`] the same way every operator does:
//! built with chained `with_*` calls and read back through accessors.

/// Configuration shared by all aggregation operators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateConfig {
  /// Optional name for identifying this operator in logs.
  pub name: Option<String>,
}

impl AggregateConfig {
  /// Sets the name for this operator configuration.
  ///
  /// # Arguments
  ///
  /// * `name` - The name to assign to the operator.
  #[must_use]
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  /// Returns the current name, if set.
  pub fn name(&self) -> Option<String> {
    self.name.clone()
  }
}
