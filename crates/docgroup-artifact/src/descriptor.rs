//! Grouping-key descriptors
//!
//! A [`GroupingKeyDescriptor`] is a recursive description of which nested fields
//! of an artifact decide its group. Wire form:
//!
//! ```json
//! {"type": "object", "children": {
//!     "addresses": {"type": "array", "children": {"city": {"type": "string"}}}
//! }}
//! ```

use crate::path::{FieldPath, PathError, PathSegment};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node type of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyNodeType {
    /// Descend into named children without duplicating
    Object,

    /// One output record per element
    Array,

    /// Leaf: the value is part of the key
    String,
}

/// Recursive grouping-key descriptor
///
/// # Invariants (checked by [`GroupingKeyDescriptor::validate`])
/// - `string` nodes have no children
/// - an `array` node either nests one inner array under [`ELEMENT_FIELD`] or
///   names element fields, never both
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingKeyDescriptor {
    /// Node type
    #[serde(rename = "type")]
    pub node_type: KeyNodeType,

    /// Child descriptors by field name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, GroupingKeyDescriptor>,
}

impl GroupingKeyDescriptor {
    /// Object node without children (pass-through at the root)
    #[inline]
    #[must_use]
    pub fn object() -> Self {
        Self {
            node_type: KeyNodeType::Object,
            children: BTreeMap::new(),
        }
    }

    /// Array node; without children the elements are treated as scalars
    #[inline]
    #[must_use]
    pub fn array() -> Self {
        Self {
            node_type: KeyNodeType::Array,
            children: BTreeMap::new(),
        }
    }

    /// Leaf node
    #[inline]
    #[must_use]
    pub fn string() -> Self {
        Self {
            node_type: KeyNodeType::String,
            children: BTreeMap::new(),
        }
    }

    /// Add a child descriptor
    #[inline]
    #[must_use]
    pub fn with_child(mut self, field: impl Into<String>, child: GroupingKeyDescriptor) -> Self {
        self.children.insert(field.into(), child);
        self
    }

    /// Build an object descriptor from dotted field paths
    ///
    /// `addresses[].city` declares `addresses` as an array of objects whose
    /// `city` is a leaf; `tags[]` declares an array of scalars.
    ///
    /// # Errors
    /// Returns error if a path is malformed or two paths disagree on a node type
    pub fn from_paths<S: AsRef<str>>(paths: &[S]) -> Result<Self, DescriptorError> {
        let mut root = Self::object();
        for raw in paths {
            let path: FieldPath = raw.as_ref().parse()?;
            if path.is_empty() {
                return Err(DescriptorError::EmptyPath);
            }
            root.insert_path(&path, 0)?;
        }
        root.validate()?;
        Ok(root)
    }

    fn insert_path(&mut self, path: &FieldPath, depth: usize) -> Result<(), DescriptorError> {
        let segments = path.segments();
        let Some(PathSegment::Field(name)) = segments.get(depth) else {
            return Err(DescriptorError::ConflictingPath {
                path: path.to_string(),
            });
        };

        // Count the array markers that follow this field
        let mut next = depth + 1;
        while matches!(segments.get(next), Some(PathSegment::Each)) {
            next += 1;
        }
        let array_depth = next - depth - 1;
        let is_last = next == segments.len();

        let mut node = self.children.entry(name.clone()).or_insert_with(|| {
            if array_depth > 0 {
                Self::array()
            } else if is_last {
                Self::string()
            } else {
                Self::object()
            }
        });

        if array_depth == 0 && node.node_type == KeyNodeType::Array {
            return Err(DescriptorError::ConflictingPath {
                path: path.to_string(),
            });
        }

        for level in 0..array_depth {
            if node.node_type != KeyNodeType::Array {
                return Err(DescriptorError::ConflictingPath {
                    path: path.to_string(),
                });
            }
            if level + 1 < array_depth {
                node = node
                    .children
                    .entry(ELEMENT_FIELD.to_string())
                    .or_insert_with(Self::array);
            }
        }

        if is_last {
            let expected = if array_depth > 0 {
                KeyNodeType::Array
            } else {
                KeyNodeType::String
            };
            if node.node_type != expected || !node.children.is_empty() {
                return Err(DescriptorError::ConflictingPath {
                    path: path.to_string(),
                });
            }
            return Ok(());
        }

        if node.node_type == KeyNodeType::String {
            return Err(DescriptorError::ConflictingPath {
                path: path.to_string(),
            });
        }
        node.insert_path(path, next)
    }

    /// Check structural invariants of the whole tree
    ///
    /// # Errors
    /// Returns error naming the first offending path
    pub fn validate(&self) -> Result<(), DescriptorError> {
        self.validate_at(&FieldPath::root())
    }

    fn validate_at(&self, path: &FieldPath) -> Result<(), DescriptorError> {
        match self.node_type {
            KeyNodeType::String if !self.children.is_empty() => {
                Err(DescriptorError::ChildrenOnLeaf {
                    path: path.to_string(),
                })
            }
            KeyNodeType::String => Ok(()),
            KeyNodeType::Object => self
                .children
                .iter()
                .try_for_each(|(name, child)| child.validate_at(&path.field(name))),
            KeyNodeType::Array => {
                if self.children.contains_key(ELEMENT_FIELD) && self.children.len() > 1 {
                    return Err(DescriptorError::MixedArrayElements {
                        path: path.to_string(),
                    });
                }
                let element = path.each();
                self.children
                    .iter()
                    .try_for_each(|(name, child)| child.validate_at(&element.field(name)))
            }
        }
    }

    /// Check if this descriptor selects nothing (no expansion)
    #[inline]
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.node_type == KeyNodeType::Object && self.children.is_empty()
    }

    /// Check if this is a leaf node
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node_type == KeyNodeType::String
    }

    /// Number of leaf fields reachable from this node
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self.node_type {
            KeyNodeType::String => 1,
            KeyNodeType::Array if self.children.is_empty() => 1,
            _ => self.children.values().map(Self::leaf_count).sum(),
        }
    }
}

impl Default for GroupingKeyDescriptor {
    fn default() -> Self {
        Self::object()
    }
}

/// Field name used for the inner level of nested arrays built by
/// [`GroupingKeyDescriptor::from_paths`] (`matrix[][]`).
pub const ELEMENT_FIELD: &str = "[]";

/// Errors related to grouping-key descriptors
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    /// A leaf declares children
    #[error("string node at '{path}' must not declare children")]
    ChildrenOnLeaf { path: String },

    /// Two paths disagree about a node
    #[error("conflicting descriptor path '{path}'")]
    ConflictingPath { path: String },

    /// Array node mixes a nested array with element fields
    #[error("array node at '{path}' mixes nested array elements with named fields")]
    MixedArrayElements { path: String },

    /// Path names the document root
    #[error("grouping-key path must name at least one field")]
    EmptyPath,

    /// Malformed path text
    #[error(transparent)]
    Path(#[from] PathError),
}
