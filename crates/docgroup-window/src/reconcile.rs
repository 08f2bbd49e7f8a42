//! Window merge reconciliation
//!
//! Folds per-window classifications into one partition of the file sequence.
//! Windows are applied in ascending start order against a single
//! `file_to_group` map owned by one [`WindowMergeReconciler::merge`] call, so a
//! later window overwrites an earlier assignment for the same file.

use crate::result::{Classification, FileRef, WindowResult};
use crate::validation::{PageOwnershipValidator, ValidationError};
use crate::window::WindowFile;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Group in a reconciled partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedGroup {
    /// Group name
    pub name: String,

    /// Last non-empty description reported for the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Files in ascending position
    pub files: Vec<WindowFile>,
}

impl MergedGroup {
    /// Create group without description
    #[must_use]
    pub fn new(name: impl Into<String>, files: Vec<WindowFile>) -> Self {
        Self {
            name: name.into(),
            description: None,
            files,
        }
    }

    /// Number of files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if group has no files
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// File ids in order
    #[must_use]
    pub fn file_ids(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.file_id.as_str()).collect()
    }

    /// Positions in order
    #[must_use]
    pub fn positions(&self) -> Vec<u32> {
        self.files.iter().map(|f| f.position).collect()
    }
}

/// Winning assignment for one file, with its classifier metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAssignment {
    /// Assigned group
    pub group_name: String,
    /// Sequence position of the file
    pub position: u32,
    /// Classifier confidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Classifier explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Confidence that the file continues the previous file's group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub belongs_to_previous_confidence: Option<f64>,
    /// Window that made the winning assignment
    pub window_index: usize,
}

/// Reconciled partition of the file sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedPartition {
    /// Groups ordered by their first file's position
    pub groups: Vec<MergedGroup>,

    /// File id to group name, in position order
    pub file_to_group: IndexMap<String, String>,

    /// File id to winning assignment, in position order
    pub file_meta: IndexMap<String, FileAssignment>,
}

impl MergedPartition {
    /// Check if partition has no groups
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of groups
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Number of assigned files
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.file_to_group.len()
    }

    /// Look up group by name
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&MergedGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Group owning a file
    #[must_use]
    pub fn group_of(&self, file_id: &str) -> Option<&str> {
        self.file_to_group.get(file_id).map(String::as_str)
    }

    /// Group names in order
    #[must_use]
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Rebuild a partition from per-file assignments
    ///
    /// Groups are derived by inversion: files sorted by position, groups
    /// ordered by first file, descriptions taken from `descriptions`.
    #[must_use]
    pub fn from_assignments(
        assignments: impl IntoIterator<Item = (String, FileAssignment)>,
        descriptions: &HashMap<String, String>,
    ) -> Self {
        let mut entries: Vec<(String, FileAssignment)> = assignments.into_iter().collect();
        entries.sort_by(|(a_id, a), (b_id, b)| a.position.cmp(&b.position).then_with(|| a_id.cmp(b_id)));

        let mut grouped: IndexMap<String, Vec<WindowFile>> = IndexMap::new();
        for (file_id, assignment) in &entries {
            grouped
                .entry(assignment.group_name.clone())
                .or_default()
                .push(WindowFile::new(file_id.clone(), assignment.position));
        }

        let groups = grouped
            .into_iter()
            .map(|(name, files)| MergedGroup {
                description: descriptions.get(&name).cloned(),
                name,
                files,
            })
            .collect();

        let file_to_group = entries
            .iter()
            .map(|(id, a)| (id.clone(), a.group_name.clone()))
            .collect();

        Self {
            groups,
            file_to_group,
            file_meta: entries.into_iter().collect(),
        }
    }
}

/// Position and file id lookups gathered from window metadata
#[derive(Debug, Default)]
struct FileCatalog {
    by_position: HashMap<u32, String>,
    by_id: HashMap<String, u32>,
}

impl FileCatalog {
    fn from_results(results: &[WindowResult]) -> Self {
        let mut catalog = Self::default();
        for file in results.iter().flat_map(|r| &r.window.files) {
            catalog
                .by_position
                .entry(file.position)
                .or_insert_with(|| file.file_id.clone());
            catalog
                .by_id
                .entry(file.file_id.clone())
                .or_insert(file.position);
        }
        catalog
    }

    /// Resolve a reference to (file id, position)
    ///
    /// Positions missing from the catalog use their decimal form as id;
    /// unknown file ids cannot be placed and resolve to `None`.
    fn resolve(&self, file_ref: &FileRef) -> Option<(String, u32)> {
        match file_ref {
            FileRef::Position(position) => Some((
                self.by_position
                    .get(position)
                    .cloned()
                    .unwrap_or_else(|| position.to_string()),
                *position,
            )),
            FileRef::FileId(id) => self.by_id.get(id).map(|position| (id.clone(), *position)),
        }
    }
}

/// Merges per-window classifications into one partition
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowMergeReconciler {
    validator: PageOwnershipValidator,
}

impl WindowMergeReconciler {
    /// Create new reconciler
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            validator: PageOwnershipValidator::new(),
        }
    }

    /// Merge raw JSON window results
    ///
    /// Entries that cannot be parsed are skipped with a warning.
    ///
    /// # Errors
    /// Returns [`ValidationError`] if any window lists a page under two groups
    pub fn merge(&self, raw_results: &[Value]) -> Result<MergedPartition, ValidationError> {
        let parsed = raw_results
            .iter()
            .enumerate()
            .filter_map(|(i, raw)| match WindowResult::from_json(raw) {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::warn!(entry = i, error = %e, "skipping window result");
                    None
                }
            })
            .collect();
        self.merge_parsed(parsed)
    }

    /// Merge typed window results
    ///
    /// # Errors
    /// Returns [`ValidationError`] if any window lists a page under two groups
    pub fn merge_parsed(
        &self,
        mut results: Vec<WindowResult>,
    ) -> Result<MergedPartition, ValidationError> {
        if results.is_empty() {
            return Ok(MergedPartition::default());
        }

        for result in &results {
            self.validator.validate_window_result(result)?;
        }
        results.sort_by_key(WindowResult::sort_key);

        let catalog = FileCatalog::from_results(&results);
        let mut assignments: HashMap<String, FileAssignment> = HashMap::new();
        let mut descriptions: HashMap<String, String> = HashMap::new();
        let mut overwritten = 0usize;

        for result in &results {
            let window_index = result.window.index;
            let mut assign = |file_id: String, assignment: FileAssignment| {
                if let Some(previous) = assignments.insert(file_id, assignment) {
                    overwritten += 1;
                    tracing::trace!(
                        from = %previous.group_name,
                        window = window_index,
                        "file reassigned by later window"
                    );
                }
            };

            match &result.classification {
                Classification::Groups(groups) => {
                    let mut owners: HashMap<String, &str> = HashMap::new();
                    for group in groups {
                        if group.group_name.trim().is_empty() {
                            tracing::warn!(window = window_index, "skipping unnamed group");
                            continue;
                        }
                        if let Some(description) =
                            group.description.as_deref().filter(|d| !d.trim().is_empty())
                        {
                            descriptions.insert(group.group_name.clone(), description.to_string());
                        }
                        for file_ref in &group.file_refs {
                            let Some((file_id, position)) = catalog.resolve(file_ref) else {
                                tracing::warn!(
                                    window = window_index,
                                    file_ref = ?file_ref,
                                    "skipping unknown file reference"
                                );
                                continue;
                            };
                            match owners.get(&file_id) {
                                Some(owner) if *owner != group.group_name => {
                                    return Err(ValidationError::DuplicatePage {
                                        group1: (*owner).to_string(),
                                        group2: group.group_name.clone(),
                                        page_number: position,
                                    });
                                }
                                Some(_) => {}
                                None => {
                                    owners.insert(file_id.clone(), &group.group_name);
                                }
                            }
                            assign(
                                file_id,
                                FileAssignment {
                                    group_name: group.group_name.clone(),
                                    position,
                                    confidence: None,
                                    explanation: None,
                                    belongs_to_previous_confidence: None,
                                    window_index,
                                },
                            );
                        }
                    }
                }
                Classification::Files(files) => {
                    for file in files {
                        if file.group_name.trim().is_empty() {
                            tracing::warn!(
                                window = window_index,
                                page = file.page_number,
                                "skipping file without group"
                            );
                            continue;
                        }
                        let Some((file_id, position)) =
                            catalog.resolve(&FileRef::Position(file.page_number))
                        else {
                            continue;
                        };
                        assign(
                            file_id,
                            FileAssignment {
                                group_name: file.group_name.clone(),
                                position,
                                confidence: file.confidence,
                                explanation: file.explanation.clone(),
                                belongs_to_previous_confidence: file.belongs_to_previous_confidence,
                                window_index,
                            },
                        );
                    }
                }
            }
        }

        let partition = MergedPartition::from_assignments(assignments, &descriptions);
        self.validator.validate_partition(&partition.groups)?;

        tracing::debug!(
            windows = results.len(),
            files = partition.file_count(),
            groups = partition.len(),
            overwritten,
            "reconciled window results"
        );
        Ok(partition)
    }
}

/// Merge raw JSON window results with a default reconciler
///
/// # Errors
/// See [`WindowMergeReconciler::merge`]
#[inline]
pub fn merge_window_results(raw_results: &[Value]) -> Result<MergedPartition, ValidationError> {
    WindowMergeReconciler::new().merge(raw_results)
}
