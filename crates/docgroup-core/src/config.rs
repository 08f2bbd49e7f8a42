//! Pipeline configuration
//!
//! Resolution order (highest priority first):
//! 1. Builder calls (`with_*`)
//! 2. Environment variables (`DOCGROUP_*`, via [`DocGroupConfig::with_env_overrides`])
//! 3. TOML document ([`DocGroupConfig::from_toml_str`])
//! 4. Compiled defaults

use crate::error::{DocGroupError, Result};
use docgroup_dedup::SimilarityConfig;
use docgroup_grouping::GroupingMode;
use serde::{Deserialize, Serialize};

/// Environment variable for [`DocGroupConfig::window_size`]
pub const ENV_WINDOW_SIZE: &str = "DOCGROUP_WINDOW_SIZE";
/// Environment variable for [`DocGroupConfig::max_sample_files`]
pub const ENV_MAX_SAMPLE_FILES: &str = "DOCGROUP_MAX_SAMPLE_FILES";
/// Environment variable for [`DocGroupConfig::default_mode`]
pub const ENV_DEFAULT_MODE: &str = "DOCGROUP_DEFAULT_MODE";
/// Environment variable for the duplicate threshold
pub const ENV_SIMILARITY_THRESHOLD: &str = "DOCGROUP_SIMILARITY_THRESHOLD";

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocGroupConfig {
    /// Files per comparison window
    pub window_size: usize,
    /// Files shown per group in a review payload
    pub max_sample_files: usize,
    /// Grouping mode used when none is given
    pub default_mode: GroupingMode,
    /// Duplicate name scoring
    pub similarity: SimilarityConfig,
}

impl Default for DocGroupConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            max_sample_files: 5,
            default_mode: GroupingMode::default(),
            similarity: SimilarityConfig::default(),
        }
    }
}

impl DocGroupConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With window size
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// With review sample cap
    #[inline]
    #[must_use]
    pub fn with_max_sample_files(mut self, max: usize) -> Self {
        self.max_sample_files = max;
        self
    }

    /// With default grouping mode
    #[inline]
    #[must_use]
    pub fn with_default_mode(mut self, mode: GroupingMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// With similarity weights
    #[inline]
    #[must_use]
    pub fn with_similarity(mut self, similarity: SimilarityConfig) -> Self {
        self.similarity = similarity;
        self
    }

    /// Parse from a TOML document; missing keys take their defaults
    ///
    /// # Errors
    /// - [`DocGroupError::ConfigParse`] for malformed TOML
    /// - [`DocGroupError::Config`] if the values fail [`DocGroupConfig::validate`]
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as a TOML document
    ///
    /// # Errors
    /// Returns [`DocGroupError::ConfigRender`] if serialization fails
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Apply `DOCGROUP_*` environment variables
    ///
    /// # Errors
    /// Returns [`DocGroupError::Config`] for unparsable values
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns [`DocGroupError::Config`] for unparsable values
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup(ENV_WINDOW_SIZE) {
            self.window_size = parse_value(ENV_WINDOW_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_MAX_SAMPLE_FILES) {
            self.max_sample_files = parse_value(ENV_MAX_SAMPLE_FILES, &value)?;
        }
        if let Some(value) = lookup(ENV_DEFAULT_MODE) {
            self.default_mode = value
                .parse()
                .map_err(|e| DocGroupError::Config(format!("{ENV_DEFAULT_MODE}: {e}")))?;
        }
        if let Some(value) = lookup(ENV_SIMILARITY_THRESHOLD) {
            self.similarity.threshold = parse_value(ENV_SIMILARITY_THRESHOLD, &value)?;
        }
        Ok(self)
    }

    /// Validate the configuration values
    ///
    /// # Errors
    /// Returns [`DocGroupError::Config`] naming the offending field
    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            return Err(DocGroupError::Config(format!(
                "window_size must be at least 2, got {}",
                self.window_size
            )));
        }
        self.similarity
            .validate()
            .map_err(|e| DocGroupError::Config(e.to_string()))
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| DocGroupError::Config(format!("{key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = DocGroupConfig::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size, 5);
        assert_eq!(config.default_mode, GroupingMode::Concatenate);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = DocGroupConfig::from_toml_str(
            r#"
            window_size = 8
            default_mode = "split_by_file"

            [similarity]
            threshold = 0.8
            "#,
        )
        .unwrap();

        assert_eq!(config.window_size, 8);
        assert_eq!(config.default_mode, GroupingMode::SplitByFile);
        assert!((config.similarity.threshold - 0.8).abs() < f64::EPSILON);
        assert!((config.similarity.jaccard_weight - 0.6).abs() < f64::EPSILON);
        assert_eq!(config.max_sample_files, 5);
    }

    #[test]
    fn toml_round_trip() {
        let config = DocGroupConfig::new()
            .with_window_size(3)
            .with_default_mode(GroupingMode::Merge);
        let rendered = config.to_toml_string().unwrap();
        assert_eq!(DocGroupConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn invalid_values_rejected() {
        let err = DocGroupConfig::from_toml_str("window_size = 1").unwrap_err();
        assert!(err.is_configuration());

        let err = DocGroupConfig::from_toml_str("[similarity]\nthreshold = 3.0").unwrap_err();
        assert!(matches!(err, DocGroupError::Config(_)));

        let err = DocGroupConfig::from_toml_str("window_size = \"big\"").unwrap_err();
        assert!(matches!(err, DocGroupError::ConfigParse(_)));
    }

    #[test]
    fn overrides_apply() {
        let vars: HashMap<&str, &str> = [
            (ENV_WINDOW_SIZE, "12"),
            (ENV_DEFAULT_MODE, "Overwrite"),
            (ENV_SIMILARITY_THRESHOLD, "0.85"),
        ]
        .into_iter()
        .collect();

        let config = DocGroupConfig::new()
            .with_overrides(|k| vars.get(k).map(|v| (*v).to_string()))
            .unwrap();
        assert_eq!(config.window_size, 12);
        assert_eq!(config.default_mode, GroupingMode::Overwrite);
        assert!((config.similarity.threshold - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_override_rejected() {
        let err = DocGroupConfig::new()
            .with_overrides(|k| (k == ENV_MAX_SAMPLE_FILES).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_SAMPLE_FILES));
    }
}
