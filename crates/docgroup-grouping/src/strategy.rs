//! Grouping strategy trait and core types
//!
//! Provides the [`GroupingStrategy`] trait: one implementation per
//! [`GroupingMode`], each turning one bucket of members into labelled
//! partitions.

use crate::error::GroupingError;
use docgroup_artifact::{Artifact, Member, Page};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Grouping strategy applied within each bucket
///
/// # Contract
/// - `partition()` is deterministic and never reorders members it keeps
/// - Partitions with zero members are allowed; the mapper drops them
pub trait GroupingStrategy: Send + Sync + fmt::Debug {
    /// Split one bucket of members into labelled partitions
    fn partition(&self, members: Vec<Member>, ctx: &MappingContext) -> Vec<Partition>;

    /// Mode implemented by this strategy
    fn mode(&self) -> GroupingMode;

    /// Strategy name (registry key)
    fn name(&self) -> &'static str {
        self.mode().as_str()
    }
}

/// Built-in grouping modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Everything in one group, input order
    #[default]
    Concatenate,

    /// One group per member, each seeing the full file set
    Split,

    /// One group per page
    SplitByFile,

    /// Last member wins
    Overwrite,

    /// Deep merge into one record
    Merge,
}

impl GroupingMode {
    /// All built-in modes
    pub const ALL: [GroupingMode; 5] = [
        Self::Concatenate,
        Self::Split,
        Self::SplitByFile,
        Self::Overwrite,
        Self::Merge,
    ];

    /// Stable name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concatenate => "concatenate",
            Self::Split => "split",
            Self::SplitByFile => "split_by_file",
            Self::Overwrite => "overwrite",
            Self::Merge => "merge",
        }
    }
}

impl Display for GroupingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupingMode {
    type Err = GroupingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| GroupingError::UnknownMode(s.to_string()))
    }
}

/// Members destined for one group
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Label appended to the bucket key; `None` uses the bucket key itself
    pub label: Option<String>,

    /// Members in order
    pub members: Vec<Member>,
}

impl Partition {
    /// Partition keyed by its bucket
    #[inline]
    #[must_use]
    pub fn unlabelled(members: Vec<Member>) -> Self {
        Self {
            label: None,
            members,
        }
    }

    /// Partition with its own label
    #[inline]
    #[must_use]
    pub fn labelled(label: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            label: Some(label.into()),
            members,
        }
    }
}

/// Values computed once per mapping call and shared by every bucket
#[derive(Debug, Clone, Default)]
pub struct MappingContext {
    page_union: Vec<Page>,
}

impl MappingContext {
    /// Build context for one mapping call
    ///
    /// The page union keeps the first occurrence of each file id and is
    /// ordered by page number.
    #[must_use]
    pub fn from_artifacts(artifacts: &[Artifact]) -> Self {
        let mut seen = HashSet::new();
        let mut page_union: Vec<Page> = artifacts
            .iter()
            .flat_map(Artifact::pages)
            .filter(|page| seen.insert(page.file_id.clone()))
            .cloned()
            .collect();
        page_union.sort_by_key(|p| p.page_number);
        Self { page_union }
    }

    /// Every page attached to any input artifact
    #[inline]
    #[must_use]
    pub fn page_union(&self) -> &[Page] {
        &self.page_union
    }
}
