//! Group members and groups
//!
//! A [`Group`] holds an ordered list of [`Member`]s: real artifacts or
//! [`SyntheticRecord`]s manufactured while mapping (file unions, merged
//! records, grouping-key slices).

use crate::artifact::{Artifact, ArtifactId, Page};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What produced a synthetic record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticKind {
    /// Pseudo-artifact carrying a set of pages
    Files,

    /// Deep merge of several records
    Merged,

    /// Grouping-key slice of one artifact
    Slice,
}

/// Artifact-like value with no stable identity
///
/// Lives only for the duration of one mapping call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticRecord {
    /// Origin of the record
    pub kind: SyntheticKind,

    /// Record content
    pub json_content: Value,

    /// Pages visible through this record
    pub pages: Vec<Page>,

    /// Ordering position (inherited from the earliest source)
    pub position: i64,

    /// Artifact this record was derived from, when there is exactly one
    pub source: Option<ArtifactId>,
}

impl SyntheticRecord {
    /// Record wrapping a set of pages with empty content
    #[must_use]
    pub fn files(pages: Vec<Page>) -> Self {
        let position = pages.first().map_or(0, |p| i64::from(p.page_number));
        Self {
            kind: SyntheticKind::Files,
            json_content: Value::Object(serde_json::Map::new()),
            pages,
            position,
            source: None,
        }
    }

    /// Slice of an artifact's content produced by grouping-key expansion
    #[must_use]
    pub fn slice(source: &Artifact, json_content: Value) -> Self {
        Self {
            kind: SyntheticKind::Slice,
            json_content,
            pages: source.pages().to_vec(),
            position: source.position(),
            source: Some(source.id()),
        }
    }

    /// Merged record
    #[must_use]
    pub fn merged(json_content: Value, pages: Vec<Page>, position: i64) -> Self {
        Self {
            kind: SyntheticKind::Merged,
            json_content,
            pages,
            position,
            source: None,
        }
    }
}

/// Entry of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum Member {
    /// Untouched input artifact
    Artifact(Artifact),

    /// Record manufactured during mapping
    Synthetic(SyntheticRecord),
}

impl Member {
    /// JSON content of the member
    #[inline]
    #[must_use]
    pub fn json_content(&self) -> &Value {
        match self {
            Self::Artifact(a) => a.json_content(),
            Self::Synthetic(s) => &s.json_content,
        }
    }

    /// Pages visible through the member
    #[inline]
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        match self {
            Self::Artifact(a) => a.pages(),
            Self::Synthetic(s) => &s.pages,
        }
    }

    /// Ordering position
    #[inline]
    #[must_use]
    pub fn position(&self) -> i64 {
        match self {
            Self::Artifact(a) => a.position(),
            Self::Synthetic(s) => s.position,
        }
    }

    /// Artifact the member stands for, if any
    #[inline]
    #[must_use]
    pub fn source_id(&self) -> Option<ArtifactId> {
        match self {
            Self::Artifact(a) => Some(a.id()),
            Self::Synthetic(s) => s.source,
        }
    }

    /// Synthetic kind, `None` for real artifacts
    #[inline]
    #[must_use]
    pub fn synthetic_kind(&self) -> Option<SyntheticKind> {
        match self {
            Self::Artifact(_) => None,
            Self::Synthetic(s) => Some(s.kind),
        }
    }

    /// Check if this is a true artifact
    #[inline]
    #[must_use]
    pub fn is_artifact(&self) -> bool {
        matches!(self, Self::Artifact(_))
    }
}

impl From<Artifact> for Member {
    fn from(artifact: Artifact) -> Self {
        Self::Artifact(artifact)
    }
}

impl From<SyntheticRecord> for Member {
    fn from(record: SyntheticRecord) -> Self {
        Self::Synthetic(record)
    }
}

/// Named, ordered bucket of members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Group name (key)
    pub name: String,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Members in order
    pub members: Vec<Member>,
}

impl Group {
    /// Create group without description
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, members: Vec<Member>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            members,
        }
    }

    /// Set description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Number of members
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if group has no members
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
