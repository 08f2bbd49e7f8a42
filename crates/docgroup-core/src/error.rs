//! Error types for the docgroup pipeline
//!
//! Every component error converts into [`DocGroupError`], so pipeline callers
//! handle one type.

use docgroup_artifact::{ArtifactError, DescriptorError};
use docgroup_dedup::DedupError;
use docgroup_grouping::GroupingError;
use docgroup_window::ValidationError;

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum DocGroupError {
    /// Artifact construction failed
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Grouping key descriptor is malformed
    #[error("descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Grouping failed
    #[error("grouping failed: {0}")]
    Grouping(#[from] GroupingError),

    /// A page is owned by two groups
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Duplicate detection or resolution failed
    #[error("dedup failed: {0}")]
    Dedup(#[from] DedupError),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration could not be parsed
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("config render error: {0}")]
    ConfigRender(#[from] toml::ser::Error),
}

impl DocGroupError {
    /// Check if error is a page ownership violation
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if error stems from caller-authored configuration
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Config(_) | Self::ConfigParse(_) | Self::ConfigRender(_) | Self::Descriptor(_) => true,
            Self::Grouping(e) => e.is_configuration(),
            Self::Dedup(e) => e.is_configuration(),
            Self::Artifact(_) | Self::Validation(_) => false,
        }
    }
}

/// Result alias for pipeline operations
pub type Result<T, E = DocGroupError> = std::result::Result<T, E>;
