//! Duplicate group detection
//!
//! Compares every unordered pair of group names and reports the pairs whose
//! similarity reaches the configured threshold.

use crate::error::DedupError;
use crate::similarity::{HeuristicScorer, MatchKind, SimilarityConfig, SimilarityScorer};
use docgroup_window::{MergedGroup, MergedPartition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name and description of a group under comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GroupSummary {
    /// Create summary without description
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Set description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&MergedGroup> for GroupSummary {
    fn from(group: &MergedGroup) -> Self {
        Self {
            name: group.name.clone(),
            description: group.description.clone(),
        }
    }
}

/// Pair of groups that likely name the same entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCandidate {
    /// Earlier group in input order
    pub group1: String,
    /// Later group in input order
    pub group2: String,
    /// Similarity in `[0, 1]`
    pub similarity: f64,
    /// Rule behind the score
    pub kind: MatchKind,
}

/// Finds near-duplicate group names
#[derive(Debug, Clone)]
pub struct DuplicateGroupDetector {
    scorer: Arc<dyn SimilarityScorer>,
    threshold: f64,
}

impl DuplicateGroupDetector {
    /// Create detector with the heuristic scorer and default weights
    #[must_use]
    pub fn new() -> Self {
        Self {
            scorer: Arc::new(HeuristicScorer::new()),
            threshold: SimilarityConfig::default().threshold,
        }
    }

    /// Create detector with the heuristic scorer and explicit weights
    ///
    /// # Errors
    /// Returns [`DedupError::InvalidConfig`] if the weights fail
    /// [`SimilarityConfig::validate`]
    pub fn with_config(config: SimilarityConfig) -> Result<Self, DedupError> {
        config.validate()?;
        Ok(Self {
            scorer: Arc::new(HeuristicScorer::with_config(config)),
            threshold: config.threshold,
        })
    }

    /// Create detector with a caller-supplied scorer
    ///
    /// # Errors
    /// Returns [`DedupError::InvalidConfig`] if `threshold` is outside `[0, 1]`
    pub fn with_scorer(
        scorer: Arc<dyn SimilarityScorer>,
        threshold: f64,
    ) -> Result<Self, DedupError> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(DedupError::InvalidConfig(format!(
                "threshold must be within [0, 1], got {threshold}"
            )));
        }
        Ok(Self { scorer, threshold })
    }

    /// Reporting threshold
    #[inline]
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Report every pair scoring at or above the threshold
    ///
    /// Blank names are skipped. Candidates are ordered by descending
    /// similarity, ties kept in input pair order.
    #[must_use]
    pub fn identify_duplicate_candidates(&self, groups: &[GroupSummary]) -> Vec<DuplicateCandidate> {
        let named: Vec<&GroupSummary> = groups.iter().filter(|g| !g.name.trim().is_empty()).collect();

        let mut candidates = Vec::new();
        for (i, a) in named.iter().enumerate() {
            for b in &named[i + 1..] {
                let score = self.scorer.score(&a.name, &b.name);
                if score.value >= self.threshold {
                    candidates.push(DuplicateCandidate {
                        group1: a.name.clone(),
                        group2: b.name.clone(),
                        similarity: score.value,
                        kind: score.kind,
                    });
                }
            }
        }
        candidates.sort_by(|x, y| y.similarity.total_cmp(&x.similarity));

        tracing::debug!(
            groups = named.len(),
            candidates = candidates.len(),
            threshold = self.threshold,
            "identified duplicate candidates"
        );
        candidates
    }

    /// Report duplicate candidates among the groups of a partition
    #[must_use]
    pub fn identify_in_partition(&self, partition: &MergedPartition) -> Vec<DuplicateCandidate> {
        let summaries: Vec<GroupSummary> = partition.groups.iter().map(GroupSummary::from).collect();
        self.identify_duplicate_candidates(&summaries)
    }
}

impl Default for DuplicateGroupDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Report duplicate candidates with default weights
#[must_use]
pub fn identify_duplicate_candidates(groups: &[GroupSummary]) -> Vec<DuplicateCandidate> {
    DuplicateGroupDetector::new().identify_duplicate_candidates(groups)
}
