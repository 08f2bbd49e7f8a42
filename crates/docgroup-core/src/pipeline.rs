//! Page pipeline
//!
//! Ties the components together in the order a caller drives them:
//! plan windows, classify them elsewhere, reconcile the results, then review
//! likely duplicate groups.

use crate::config::DocGroupConfig;
use crate::error::Result;
use docgroup_artifact::{Artifact, Group, GroupingKeyDescriptor};
use docgroup_dedup::{
    apply_resolution, prepare_duplicate_for_resolution, DuplicateCandidate, DuplicateGroupDetector,
    ResolutionDecision, ResolutionPayload,
};
use docgroup_grouping::{into_groups, ArtifactsToGroupsMapper, GroupingMode};
use docgroup_window::{ordered_files, MergedPartition, Window, WindowBuilder, WindowMergeReconciler};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reconciled partition with its duplicate candidates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciledBatch {
    /// Reconciled groups
    pub partition: MergedPartition,
    /// Likely duplicate group pairs, most similar first
    pub duplicates: Vec<DuplicateCandidate>,
}

impl ReconciledBatch {
    /// Check if any duplicate candidates need review
    #[inline]
    #[must_use]
    pub fn needs_review(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

/// Document grouping pipeline
#[derive(Debug, Clone)]
pub struct PagePipeline {
    config: DocGroupConfig,
    windows: WindowBuilder,
    reconciler: WindowMergeReconciler,
    detector: DuplicateGroupDetector,
    mapper: ArtifactsToGroupsMapper,
}

impl PagePipeline {
    /// Create pipeline after validating configuration
    ///
    /// # Errors
    /// - [`crate::DocGroupError::Config`] for an invalid window or sample size
    /// - [`crate::DocGroupError::Dedup`] for invalid similarity weights
    pub fn new(config: DocGroupConfig) -> Result<Self> {
        config.validate()?;
        let detector = DuplicateGroupDetector::with_config(config.similarity)?;
        Ok(Self::assemble(config, detector))
    }

    fn assemble(config: DocGroupConfig, detector: DuplicateGroupDetector) -> Self {
        Self {
            windows: WindowBuilder::new(config.window_size),
            reconciler: WindowMergeReconciler::new(),
            detector,
            mapper: ArtifactsToGroupsMapper::new(),
            config,
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DocGroupConfig {
        &self.config
    }

    /// Replace the artifact mapper (custom strategies)
    #[must_use]
    pub fn with_mapper(mut self, mapper: ArtifactsToGroupsMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Split the artifacts' pages into comparison windows
    #[tracing::instrument(skip_all, fields(artifacts = artifacts.len()))]
    #[must_use]
    pub fn plan_windows(&self, artifacts: &[Artifact]) -> Vec<Window> {
        let files = ordered_files(artifacts);
        let windows = self.windows.build(&files);
        tracing::info!(files = files.len(), windows = windows.len(), "planned windows");
        windows
    }

    /// Reconcile raw window results and look for duplicate groups
    ///
    /// # Errors
    /// Returns [`crate::DocGroupError::Validation`] if a window lists a page
    /// under two groups
    #[tracing::instrument(skip_all, fields(results = raw_results.len()))]
    pub fn reconcile(&self, raw_results: &[Value]) -> Result<ReconciledBatch> {
        let partition = self.reconciler.merge(raw_results)?;
        let duplicates = self.detector.identify_in_partition(&partition);
        tracing::info!(
            groups = partition.len(),
            duplicates = duplicates.len(),
            "reconciled batch"
        );
        Ok(ReconciledBatch {
            partition,
            duplicates,
        })
    }

    /// Review payloads for every duplicate candidate of a batch
    ///
    /// # Errors
    /// Returns [`crate::DocGroupError::Dedup`] if a candidate no longer
    /// matches the partition
    pub fn review_payloads(&self, batch: &ReconciledBatch) -> Result<Vec<ResolutionPayload>> {
        batch
            .duplicates
            .iter()
            .map(|candidate| {
                prepare_duplicate_for_resolution(
                    candidate,
                    &batch.partition,
                    self.config.max_sample_files,
                )
                .map_err(Into::into)
            })
            .collect()
    }

    /// Apply a reviewer decision and re-detect duplicates
    ///
    /// # Errors
    /// Returns [`crate::DocGroupError::Dedup`] if the decision cannot be applied
    #[tracing::instrument(skip_all, fields(group1 = %candidate.group1, group2 = %candidate.group2))]
    pub fn resolve(
        &self,
        batch: &ReconciledBatch,
        candidate: &DuplicateCandidate,
        decision: &ResolutionDecision,
    ) -> Result<ReconciledBatch> {
        let partition = apply_resolution(&batch.partition, candidate, decision)?;
        let duplicates = self.detector.identify_in_partition(&partition);
        Ok(ReconciledBatch {
            partition,
            duplicates,
        })
    }

    /// Group artifacts under the configured default mode
    ///
    /// # Errors
    /// Returns [`crate::DocGroupError::Grouping`] for invalid descriptors
    pub fn group_artifacts(
        &self,
        artifacts: &[Artifact],
        descriptor: Option<&GroupingKeyDescriptor>,
    ) -> Result<Vec<Group>> {
        self.group_artifacts_with(artifacts, self.config.default_mode, descriptor)
    }

    /// Group artifacts under an explicit mode
    ///
    /// # Errors
    /// See [`PagePipeline::group_artifacts`]
    #[tracing::instrument(skip_all, fields(artifacts = artifacts.len(), %mode))]
    pub fn group_artifacts_with(
        &self,
        artifacts: &[Artifact],
        mode: GroupingMode,
        descriptor: Option<&GroupingKeyDescriptor>,
    ) -> Result<Vec<Group>> {
        let groups = self.mapper.map(artifacts, mode, descriptor)?;
        Ok(into_groups(groups))
    }
}

impl Default for PagePipeline {
    fn default() -> Self {
        Self::assemble(DocGroupConfig::default(), DuplicateGroupDetector::new())
    }
}
