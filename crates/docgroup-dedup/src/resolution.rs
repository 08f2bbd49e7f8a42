//! Duplicate resolution
//!
//! Builds the review payload for a candidate pair and applies the reviewer's
//! decision to a partition.

use crate::detector::DuplicateCandidate;
use crate::error::DedupError;
use docgroup_window::{FileAssignment, MergedGroup, MergedPartition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One sampled file shown to a reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleFile {
    /// File identifier
    pub file_id: String,
    /// Sequence position
    pub position: u32,
    /// Classifier confidence, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Classifier explanation, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// One side of a review payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupReview {
    /// Group name
    pub name: String,
    /// Group description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// True number of files in the group
    pub file_count: usize,
    /// Leading files, capped
    pub sample_files: Vec<SampleFile>,
}

/// Everything a reviewer needs to decide on a candidate pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionPayload {
    /// First group
    pub group1: GroupReview,
    /// Second group
    pub group2: GroupReview,
    /// Similarity of the names
    pub similarity: f64,
}

/// Reviewer decision for a candidate pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ResolutionDecision {
    /// Fold both groups into `canonical_name`
    MergeInto {
        /// Name of the surviving group
        canonical_name: String,
    },
    /// Leave the partition unchanged
    KeepSeparate,
}

/// Build the review payload for `candidate`
///
/// # Errors
/// Returns [`DedupError::UnknownGroup`] if either name is not in `partition`
pub fn prepare_duplicate_for_resolution(
    candidate: &DuplicateCandidate,
    partition: &MergedPartition,
    max_samples: usize,
) -> Result<ResolutionPayload, DedupError> {
    Ok(ResolutionPayload {
        group1: review(&candidate.group1, partition, max_samples)?,
        group2: review(&candidate.group2, partition, max_samples)?,
        similarity: candidate.similarity,
    })
}

fn review(name: &str, partition: &MergedPartition, max_samples: usize) -> Result<GroupReview, DedupError> {
    let group = partition
        .group(name)
        .ok_or_else(|| DedupError::UnknownGroup(name.to_string()))?;

    let sample_files = group
        .files
        .iter()
        .take(max_samples)
        .map(|file| {
            let meta = partition.file_meta.get(&file.file_id);
            SampleFile {
                file_id: file.file_id.clone(),
                position: file.position,
                confidence: meta.and_then(|m| m.confidence),
                explanation: meta.and_then(|m| m.explanation.clone()),
            }
        })
        .collect();

    Ok(GroupReview {
        name: group.name.clone(),
        description: group.description.clone(),
        file_count: group.len(),
        sample_files,
    })
}

/// Apply a reviewer decision, returning the new partition
///
/// Merging reassigns every file of both groups to `canonical_name` and
/// rebuilds the groups in position order. The canonical group keeps its own
/// description, falling back to the other side's.
///
/// The canonical name must be one of the two candidates or a fresh name; an
/// unrelated existing group is never absorbed.
///
/// # Errors
/// - [`DedupError::UnknownGroup`] if either candidate group is missing
/// - [`DedupError::InvalidResolution`] for a blank canonical name or one that
///   names a third group
pub fn apply_resolution(
    partition: &MergedPartition,
    candidate: &DuplicateCandidate,
    decision: &ResolutionDecision,
) -> Result<MergedPartition, DedupError> {
    let first = partition
        .group(&candidate.group1)
        .ok_or_else(|| DedupError::UnknownGroup(candidate.group1.clone()))?;
    let second = partition
        .group(&candidate.group2)
        .ok_or_else(|| DedupError::UnknownGroup(candidate.group2.clone()))?;

    let canonical = match decision {
        ResolutionDecision::KeepSeparate => return Ok(partition.clone()),
        ResolutionDecision::MergeInto { canonical_name } if canonical_name.trim().is_empty() => {
            return Err(DedupError::InvalidResolution(
                "canonical name must not be blank".to_string(),
            ));
        }
        ResolutionDecision::MergeInto { canonical_name }
            if *canonical_name != first.name
                && *canonical_name != second.name
                && partition.group(canonical_name).is_some() =>
        {
            return Err(DedupError::InvalidResolution(format!(
                "canonical name '{canonical_name}' belongs to a third group"
            )));
        }
        ResolutionDecision::MergeInto { canonical_name } => canonical_name.as_str(),
    };

    let mut descriptions: HashMap<String, String> = partition
        .groups
        .iter()
        .filter_map(|g| g.description.clone().map(|d| (g.name.clone(), d)))
        .collect();
    let description = [first, second]
        .iter()
        .find(|g| g.name == canonical)
        .and_then(|g| g.description.clone())
        .or_else(|| first.description.clone())
        .or_else(|| second.description.clone());
    if let Some(description) = description {
        descriptions.insert(canonical.to_string(), description);
    }

    let assignments = partition.groups.iter().flat_map(|group| {
        let target = if group.name == first.name || group.name == second.name {
            canonical
        } else {
            group.name.as_str()
        };
        group
            .files
            .iter()
            .map(move |file| (group, target, file))
    });
    let assignments: Vec<(String, FileAssignment)> = assignments
        .map(|(group, target, file)| {
            let mut assignment = partition
                .file_meta
                .get(&file.file_id)
                .cloned()
                .unwrap_or_else(|| bare_assignment(group, file.position));
            assignment.group_name = target.to_string();
            assignment.position = file.position;
            (file.file_id.clone(), assignment)
        })
        .collect();

    let merged = MergedPartition::from_assignments(assignments, &descriptions);
    tracing::info!(
        group1 = %first.name,
        group2 = %second.name,
        canonical,
        groups = merged.len(),
        "merged duplicate groups"
    );
    Ok(merged)
}

fn bare_assignment(group: &MergedGroup, position: u32) -> FileAssignment {
    FileAssignment {
        group_name: group.name.clone(),
        position,
        confidence: None,
        explanation: None,
        belongs_to_previous_confidence: None,
        window_index: 0,
    }
}
