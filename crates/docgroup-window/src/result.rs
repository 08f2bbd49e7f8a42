//! Window classification results
//!
//! A window result is the classification produced for one [`Window`]. Two
//! payload shapes are accepted:
//!
//! - `groups`: `[{groupName, description, fileRefs: [position | fileId]}]`
//! - `files`: `[{pageNumber, groupName, confidence, explanation, belongsToPreviousConfidence}]`
//!
//! When both are present `groups` is used.

use crate::window::Window;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to a file inside a group assignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileRef {
    /// Sequence position (page number)
    Position(u32),
    /// External file identifier
    FileId(String),
}

impl From<u32> for FileRef {
    fn from(position: u32) -> Self {
        Self::Position(position)
    }
}

impl From<&str> for FileRef {
    fn from(file_id: &str) -> Self {
        Self::FileId(file_id.to_string())
    }
}

/// One group in the `groups` payload shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAssignment {
    /// Group name
    #[serde(alias = "group_name", alias = "name")]
    pub group_name: String,

    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Files assigned to the group
    #[serde(default, alias = "file_refs", alias = "files", alias = "pages")]
    pub file_refs: Vec<FileRef>,
}

impl GroupAssignment {
    /// Create assignment without description
    #[must_use]
    pub fn new(group_name: impl Into<String>, file_refs: impl IntoIterator<Item = FileRef>) -> Self {
        Self {
            group_name: group_name.into(),
            description: None,
            file_refs: file_refs.into_iter().collect(),
        }
    }

    /// Set description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One entry in the flat `files` payload shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileClassification {
    /// Sequence position of the file
    #[serde(alias = "page_number", alias = "position")]
    pub page_number: u32,

    /// Assigned group
    #[serde(alias = "group_name")]
    pub group_name: String,

    /// Classifier confidence in `[0, 1]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Classifier explanation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,

    /// Confidence that the file continues the previous file's group
    #[serde(
        default,
        alias = "belongs_to_previous_confidence",
        skip_serializing_if = "Option::is_none"
    )]
    pub belongs_to_previous_confidence: Option<f64>,
}

impl FileClassification {
    /// Create classification without metadata
    #[must_use]
    pub fn new(page_number: u32, group_name: impl Into<String>) -> Self {
        Self {
            page_number,
            group_name: group_name.into(),
            confidence: None,
            explanation: None,
            belongs_to_previous_confidence: None,
        }
    }

    /// Set confidence
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Set explanation
    #[must_use]
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

/// Payload of a window result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Grouped shape
    Groups(Vec<GroupAssignment>),
    /// Flat per-file shape
    Files(Vec<FileClassification>),
}

/// Classification for one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowResult {
    /// Window metadata
    pub window: Window,

    /// Classification payload
    #[serde(flatten)]
    pub classification: Classification,
}

/// Why a raw window result was rejected
#[derive(Debug, thiserror::Error)]
pub enum WindowParseError {
    /// Entry is not an object or has no `window` field
    #[error("window result has no window metadata")]
    MissingWindow,

    /// Entry has neither `groups` nor `files`
    #[error("window result has no groups or files payload")]
    MissingPayload,

    /// Fields present but malformed
    #[error("malformed window result: {0}")]
    Shape(#[from] serde_json::Error),
}

impl WindowResult {
    /// Create result with the grouped payload
    #[must_use]
    pub fn with_groups(window: Window, groups: Vec<GroupAssignment>) -> Self {
        Self {
            window,
            classification: Classification::Groups(groups),
        }
    }

    /// Create result with the flat payload
    #[must_use]
    pub fn with_files(window: Window, files: Vec<FileClassification>) -> Self {
        Self {
            window,
            classification: Classification::Files(files),
        }
    }

    /// Parse a raw JSON window result, accepting either payload shape
    ///
    /// # Errors
    /// [`WindowParseError`] describing the first problem found
    pub fn from_json(raw: &Value) -> Result<Self, WindowParseError> {
        let object = raw.as_object().ok_or(WindowParseError::MissingWindow)?;
        let window = object
            .get("window")
            .filter(|w| !w.is_null())
            .ok_or(WindowParseError::MissingWindow)?;
        let window: Window = serde_json::from_value(window.clone())?;

        let classification = match (present(object.get("groups")), present(object.get("files"))) {
            (Some(groups), _) => Classification::Groups(serde_json::from_value(groups.clone())?),
            (None, Some(files)) => Classification::Files(serde_json::from_value(files.clone())?),
            (None, None) => return Err(WindowParseError::MissingPayload),
        };

        Ok(Self {
            window,
            classification,
        })
    }

    /// Window ordering key: start index, then window index
    #[inline]
    #[must_use]
    pub fn sort_key(&self) -> (usize, usize) {
        (self.window.start_index, self.window.index)
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn window() -> Value {
        json!({"index": 0, "startIndex": 0, "endIndex": 2, "files": []})
    }

    #[test]
    fn parse_groups_shape() {
        let result = WindowResult::from_json(&json!({
            "window": window(),
            "groups": [{"groupName": "A", "description": "first", "fileRefs": [0, "f2"]}]
        }))
        .unwrap();

        let Classification::Groups(groups) = result.classification else {
            panic!("expected groups shape");
        };
        assert_eq!(groups[0].group_name, "A");
        assert_eq!(groups[0].file_refs, vec![FileRef::Position(0), FileRef::from("f2")]);
    }

    #[test]
    fn parse_files_shape() {
        let result = WindowResult::from_json(&json!({
            "window": window(),
            "files": [{"pageNumber": 1, "groupName": "B", "confidence": 0.8, "belongsToPreviousConfidence": 0.2}]
        }))
        .unwrap();

        let Classification::Files(files) = result.classification else {
            panic!("expected files shape");
        };
        assert_eq!(files[0].page_number, 1);
        assert_eq!(files[0].confidence, Some(0.8));
        assert_eq!(files[0].belongs_to_previous_confidence, Some(0.2));
    }

    #[test]
    fn groups_preferred_over_files() {
        let result = WindowResult::from_json(&json!({
            "window": window(),
            "groups": [{"name": "A", "files": [0]}],
            "files": [{"pageNumber": 0, "groupName": "B"}]
        }))
        .unwrap();
        assert!(matches!(result.classification, Classification::Groups(_)));
    }

    #[test]
    fn missing_parts_are_rejected() {
        assert!(matches!(
            WindowResult::from_json(&json!({"groups": []})),
            Err(WindowParseError::MissingWindow)
        ));
        assert!(matches!(
            WindowResult::from_json(&json!({"window": window(), "files": null})),
            Err(WindowParseError::MissingPayload)
        ));
        assert!(matches!(
            WindowResult::from_json(&json!("not an object")),
            Err(WindowParseError::MissingWindow)
        ));
        assert!(matches!(
            WindowResult::from_json(&json!({"window": window(), "groups": "oops"})),
            Err(WindowParseError::Shape(_))
        ));
    }

    #[test]
    fn serialized_form_parses_back() {
        let original = WindowResult::with_files(
            serde_json::from_value(window()).unwrap(),
            vec![FileClassification::new(0, "A").with_confidence(0.9)],
        );
        let raw = serde_json::to_value(&original).unwrap();
        assert_eq!(WindowResult::from_json(&raw).unwrap(), original);
    }
}
