//! Error types for grouping

use docgroup_artifact::DescriptorError;

/// Grouping error with the offending location
#[derive(Debug, thiserror::Error)]
pub enum GroupingError {
    /// Descriptor is structurally invalid
    #[error("invalid grouping-key descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),

    /// No strategy registered under this name
    #[error("unknown grouping mode: {0}")]
    UnknownMode(String),
}

impl GroupingError {
    /// Check if error is caused by caller configuration
    ///
    /// Content never fails grouping; every variant is a configuration error.
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidDescriptor(_) | Self::UnknownMode(_))
    }
}

/// JSON kind name used in warnings
#[must_use]
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
