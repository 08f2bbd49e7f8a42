//! Artifacts and their attached pages
//!
//! An [`Artifact`] is the unit of grouping: structured JSON content produced by
//! upstream classification plus the ordered pages it was derived from. Artifacts
//! are owned by an external store; this crate only ever reads them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ulid::Ulid;

/// Stable artifact identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub Ulid);

impl ArtifactId {
    /// Generate new artifact ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArtifactId {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| ArtifactError::InvalidId(format!("{s}: {e}")))
    }
}

/// A single ordered file attached to an artifact
///
/// `page_number` is the page's position in the overall batch sequence, so two
/// pages with the same number are the same page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// External file identifier
    #[serde(alias = "file_id")]
    pub file_id: String,

    /// Sequence position of the page
    #[serde(alias = "page_number")]
    pub page_number: u32,
}

impl Page {
    /// Create new page reference
    #[inline]
    #[must_use]
    pub fn new(file_id: impl Into<String>, page_number: u32) -> Self {
        Self {
            file_id: file_id.into(),
            page_number,
        }
    }
}

/// Errors related to artifact construction
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Malformed artifact identifier
    #[error("invalid artifact id: {0}")]
    InvalidId(String),

    /// Content invariant violation
    #[error("content invariant violated: {0}")]
    InvariantViolation(String),
}

/// Immutable content unit with JSON content and ordered pages
///
/// # Invariants
/// - `pages` are sorted by `page_number` and free of repeated file ids
/// - Immutable after construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    id: ArtifactId,
    #[serde(alias = "json_content")]
    json_content: Value,
    position: i64,
    #[serde(default)]
    pages: Vec<Page>,
}

impl Artifact {
    /// Create artifact with a fresh identifier and no pages
    #[inline]
    #[must_use]
    pub fn new(json_content: Value, position: i64) -> Self {
        Self {
            id: ArtifactId::new(),
            json_content,
            position,
            pages: Vec::new(),
        }
    }

    /// Create artifact with an explicit identifier
    #[inline]
    #[must_use]
    pub fn with_id(id: ArtifactId, json_content: Value, position: i64) -> Self {
        Self {
            id,
            json_content,
            position,
            pages: Vec::new(),
        }
    }

    /// Attach pages (sorted by page number)
    ///
    /// # Errors
    /// Returns error if the same file id is attached twice
    pub fn with_pages(mut self, pages: impl IntoIterator<Item = Page>) -> Result<Self, ArtifactError> {
        let mut pages: Vec<Page> = pages.into_iter().collect();
        pages.sort_by_key(|p| p.page_number);

        for pair in pages.windows(2) {
            if pair[0].file_id == pair[1].file_id || pair[0].page_number == pair[1].page_number {
                return Err(ArtifactError::InvariantViolation(format!(
                    "page {} ({}) attached twice",
                    pair[1].page_number, pair[1].file_id
                )));
            }
        }

        self.pages = pages;
        Ok(self)
    }

    /// Artifact identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> ArtifactId {
        self.id
    }

    /// Reference to JSON content
    #[inline]
    #[must_use]
    pub fn json_content(&self) -> &Value {
        &self.json_content
    }

    /// Ordering position among artifacts
    #[inline]
    #[must_use]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Attached pages in page order
    #[inline]
    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Check if artifact carries any pages
    #[inline]
    #[must_use]
    pub fn has_pages(&self) -> bool {
        !self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn artifact_new_has_no_pages() {
        let artifact = Artifact::new(json!({"name": "Alice"}), 0);
        assert!(!artifact.has_pages());
        assert_eq!(artifact.json_content()["name"], "Alice");
        assert_eq!(artifact.position(), 0);
    }

    #[test]
    fn artifact_pages_sorted_by_number() {
        let artifact = Artifact::new(json!({}), 1)
            .with_pages([Page::new("f3", 3), Page::new("f1", 1)])
            .unwrap();
        let numbers: Vec<_> = artifact.pages().iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn artifact_rejects_repeated_page() {
        let result = Artifact::new(json!({}), 1).with_pages([Page::new("f1", 1), Page::new("f1", 1)]);
        assert!(matches!(result, Err(ArtifactError::InvariantViolation(_))));
    }

    #[test]
    fn artifact_ids_are_unique() {
        let a = Artifact::new(json!(1), 0);
        let b = Artifact::new(json!(1), 0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn artifact_id_parse_round_trip() {
        let id = ArtifactId::new();
        let parsed = ArtifactId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(ArtifactId::from_str("not-a-ulid").is_err());
    }

    #[test]
    fn artifact_deserializes_camel_and_snake_case() {
        let id = ArtifactId::new();
        let camel: Artifact = serde_json::from_value(json!({
            "id": id,
            "jsonContent": {"a": 1},
            "position": 4,
            "pages": [{"fileId": "x", "pageNumber": 2}]
        }))
        .unwrap();
        let snake: Artifact = serde_json::from_value(json!({
            "id": id,
            "json_content": {"a": 1},
            "position": 4,
            "pages": [{"file_id": "x", "page_number": 2}]
        }))
        .unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.pages()[0].page_number, 2);
    }
}
