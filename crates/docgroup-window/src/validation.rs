//! Single-owner validation for pages
//!
//! Every page may belong to at most one group, both inside a single window
//! result and in a reconciled partition.

use crate::reconcile::MergedGroup;
use crate::result::{Classification, FileRef, WindowResult};
use std::collections::HashMap;

/// Page ownership validation
#[derive(Debug, Clone, Copy)]
pub struct PageOwnershipValidator;

impl PageOwnershipValidator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate that no page of a window result sits in two groups
    ///
    /// References are resolved through the window's file metadata first, so a
    /// page named by position in one group and by file id in another is caught.
    /// Listing a page twice under the same group is tolerated.
    ///
    /// # Errors
    /// - [`ValidationError::DuplicatePage`] for a page claimed twice
    /// - [`ValidationError::DuplicateFile`] for a file id claimed twice whose
    ///   position is unknown
    pub fn validate_window_result(&self, result: &WindowResult) -> Result<(), ValidationError> {
        let mut by_page: HashMap<u32, &str> = HashMap::new();
        let mut by_file: HashMap<&str, &str> = HashMap::new();

        let ids: HashMap<u32, &str> = result
            .window
            .files
            .iter()
            .map(|f| (f.position, f.file_id.as_str()))
            .collect();
        let positions: HashMap<&str, u32> = result
            .window
            .files
            .iter()
            .map(|f| (f.file_id.as_str(), f.position))
            .collect();

        match &result.classification {
            Classification::Groups(groups) => {
                for group in groups {
                    for file_ref in &group.file_refs {
                        let (page, file_id) = match file_ref {
                            FileRef::Position(page) => (Some(*page), ids.get(page).copied()),
                            FileRef::FileId(id) => {
                                (positions.get(id.as_str()).copied(), Some(id.as_str()))
                            }
                        };
                        if let Some(page) = page {
                            claim_page(&mut by_page, page, &group.group_name)?;
                        }
                        if let Some(file_id) = file_id {
                            claim_file(&mut by_file, file_id, &group.group_name)?;
                        }
                    }
                }
            }
            Classification::Files(files) => {
                for file in files {
                    claim_page(&mut by_page, file.page_number, &file.group_name)?;
                }
            }
        }
        Ok(())
    }

    /// Validate that every file of a partition appears in exactly one group
    ///
    /// # Errors
    /// Returns [`ValidationError::DuplicatePage`] naming both groups
    pub fn validate_partition(&self, groups: &[MergedGroup]) -> Result<(), ValidationError> {
        let mut by_page: HashMap<u32, &str> = HashMap::new();
        let mut by_file: HashMap<&str, &str> = HashMap::new();

        for group in groups {
            for file in &group.files {
                claim_page(&mut by_page, file.position, &group.name)?;
                claim_file(&mut by_file, &file.file_id, &group.name)?;
            }
        }
        Ok(())
    }
}

impl Default for PageOwnershipValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn claim_page<'a>(
    owners: &mut HashMap<u32, &'a str>,
    page: u32,
    group: &'a str,
) -> Result<(), ValidationError> {
    match owners.insert(page, group) {
        Some(previous) if previous != group => Err(ValidationError::DuplicatePage {
            group1: previous.to_string(),
            group2: group.to_string(),
            page_number: page,
        }),
        _ => Ok(()),
    }
}

fn claim_file<'a>(
    owners: &mut HashMap<&'a str, &'a str>,
    file_id: &'a str,
    group: &'a str,
) -> Result<(), ValidationError> {
    match owners.insert(file_id, group) {
        Some(previous) if previous != group => Err(ValidationError::DuplicateFile {
            file_id: file_id.to_string(),
            group1: previous.to_string(),
            group2: group.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Validate a single window result
///
/// # Errors
/// See [`PageOwnershipValidator::validate_window_result`]
#[inline]
pub fn validate_window_result(result: &WindowResult) -> Result<(), ValidationError> {
    PageOwnershipValidator::new().validate_window_result(result)
}

/// Validate a reconciled partition
///
/// # Errors
/// See [`PageOwnershipValidator::validate_partition`]
#[inline]
pub fn validate_partition(groups: &[MergedGroup]) -> Result<(), ValidationError> {
    PageOwnershipValidator::new().validate_partition(groups)
}

/// Page ownership violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Page listed in two groups
    #[error("page {page_number} assigned to both '{group1}' and '{group2}'")]
    DuplicatePage {
        /// Group that claimed the page first
        group1: String,
        /// Group that claimed it again
        group2: String,
        /// Page number in question
        page_number: u32,
    },

    /// File id listed in two groups
    #[error("file '{file_id}' assigned to both '{group1}' and '{group2}'")]
    DuplicateFile {
        /// File in question
        file_id: String,
        /// Group that claimed the file first
        group1: String,
        /// Group that claimed it again
        group2: String,
    },
}

impl ValidationError {
    /// Names of the two conflicting groups
    #[must_use]
    pub fn groups(&self) -> (&str, &str) {
        match self {
            Self::DuplicatePage { group1, group2, .. } | Self::DuplicateFile { group1, group2, .. } => {
                (group1, group2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{FileClassification, GroupAssignment};
    use crate::window::{Window, WindowFile};

    fn window() -> Window {
        Window {
            index: 0,
            start_index: 0,
            end_index: 2,
            files: Vec::new(),
        }
    }

    #[test]
    fn distinct_pages_pass() {
        let result = WindowResult::with_groups(
            window(),
            vec![
                GroupAssignment::new("A", [FileRef::Position(0), FileRef::Position(1)]),
                GroupAssignment::new("B", [FileRef::Position(2)]),
            ],
        );
        assert!(validate_window_result(&result).is_ok());
    }

    #[test]
    fn page_in_two_groups_fails_with_both_names() {
        let result = WindowResult::with_groups(
            window(),
            vec![
                GroupAssignment::new("A", [FileRef::Position(0), FileRef::Position(1)]),
                GroupAssignment::new("B", [FileRef::Position(1)]),
            ],
        );
        assert_eq!(
            validate_window_result(&result),
            Err(ValidationError::DuplicatePage {
                group1: "A".to_string(),
                group2: "B".to_string(),
                page_number: 1,
            })
        );
    }

    #[test]
    fn repeated_page_same_group_tolerated() {
        let result = WindowResult::with_files(
            window(),
            vec![FileClassification::new(0, "A"), FileClassification::new(0, "A")],
        );
        assert!(validate_window_result(&result).is_ok());
    }

    #[test]
    fn flat_shape_conflict_detected() {
        let result = WindowResult::with_files(
            window(),
            vec![FileClassification::new(3, "A"), FileClassification::new(3, "B")],
        );
        let err = validate_window_result(&result).unwrap_err();
        assert_eq!(err.groups(), ("A", "B"));
        assert!(err.to_string().contains("page 3"));
    }

    #[test]
    fn file_id_conflict_detected() {
        let result = WindowResult::with_groups(
            window(),
            vec![
                GroupAssignment::new("A", [FileRef::from("f1")]),
                GroupAssignment::new("B", [FileRef::from("f1")]),
            ],
        );
        assert!(matches!(
            validate_window_result(&result),
            Err(ValidationError::DuplicateFile { .. })
        ));
    }

    #[test]
    fn position_and_file_id_for_same_page_conflict() {
        let mut window = window();
        window.files = vec![
            WindowFile::new("f0", 0),
            WindowFile::new("f1", 1),
            WindowFile::new("f2", 2),
        ];
        let result = WindowResult::with_groups(
            window,
            vec![
                GroupAssignment::new("A", [FileRef::Position(0), FileRef::Position(1)]),
                GroupAssignment::new("B", [FileRef::from("f1"), FileRef::from("f2")]),
            ],
        );
        assert_eq!(
            validate_window_result(&result),
            Err(ValidationError::DuplicatePage {
                group1: "A".to_string(),
                group2: "B".to_string(),
                page_number: 1,
            })
        );
    }

    #[test]
    fn partition_with_shared_file_fails() {
        let groups = vec![
            MergedGroup::new("A", vec![WindowFile::new("f0", 0)]),
            MergedGroup::new("B", vec![WindowFile::new("f0", 0)]),
        ];
        assert!(matches!(
            validate_partition(&groups),
            Err(ValidationError::DuplicatePage { page_number: 0, .. })
        ));
    }
}
