//! Error types for duplicate detection and resolution

/// Errors from duplicate detection and resolution
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DedupError {
    /// Candidate names a group missing from the partition
    #[error("group not found in partition: {0}")]
    UnknownGroup(String),

    /// Resolution decision cannot be applied
    #[error("invalid resolution: {0}")]
    InvalidResolution(String),

    /// Similarity configuration out of range
    #[error("invalid similarity config: {0}")]
    InvalidConfig(String),
}

impl DedupError {
    /// Check if error stems from caller configuration
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }
}
