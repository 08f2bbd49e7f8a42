//! Grouping-key expansion
//!
//! Walks an artifact's JSON content against a [`GroupingKeyDescriptor`] and
//! yields one [`ExpandedRecord`] per path combination. Array descriptors fan a
//! record out into one candidate per element; several arrays compose into a
//! Cartesian product.

use crate::error::{kind_of, GroupingError};
use docgroup_artifact::{FieldPath, GroupingKeyDescriptor, KeyNodeType, ELEMENT_FIELD};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Serialized grouping key of an expanded record
///
/// Compact JSON of exactly the leaf fields the descriptor visited. Keys of
/// JSON objects are sorted, so equal selections always serialize equally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectorKey(String);

impl SelectorKey {
    /// Key of a record that was not expanded
    #[inline]
    #[must_use]
    pub fn passthrough() -> Self {
        Self(String::new())
    }

    /// Key from a visited-fields fragment
    #[inline]
    #[must_use]
    pub fn from_fragment(fragment: &Value) -> Self {
        Self(fragment.to_string())
    }

    /// Key text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into key text
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Check if record was passed through unexpanded
    #[inline]
    #[must_use]
    pub fn is_passthrough(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SelectorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One (selector key, sliced value) pair
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedRecord {
    /// Group identity of the record
    pub selector_key: SelectorKey,

    /// Content with every array selection substituted in
    pub slice: Value,
}

/// Partial expansion result: visited-key fragment plus slice
struct Candidate {
    key: Value,
    slice: Value,
    /// A leaf or array element contributed to the key
    selected: bool,
}

impl Candidate {
    fn leaf(value: &Value) -> Self {
        Self {
            key: value.clone(),
            slice: value.clone(),
            selected: true,
        }
    }

    fn unselected(value: &Value) -> Self {
        Self {
            key: Value::Null,
            slice: value.clone(),
            selected: false,
        }
    }
}

/// Expands nested JSON into grouping candidates
///
/// Stateless; every call is independent.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupingKeyExpander;

impl GroupingKeyExpander {
    /// Create new expander
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Expand `value` along `descriptor`
    ///
    /// When no descriptor leaf or array element is reachable from `value`, the
    /// value passes through as a single record keyed `""`. Content whose JSON
    /// kind contradicts the descriptor selects nothing at that point.
    ///
    /// # Errors
    /// Returns [`GroupingError::InvalidDescriptor`] if the descriptor is malformed
    pub fn expand(
        &self,
        value: &Value,
        descriptor: &GroupingKeyDescriptor,
    ) -> Result<Vec<ExpandedRecord>, GroupingError> {
        descriptor.validate()?;

        if descriptor.is_passthrough() {
            return Ok(vec![ExpandedRecord {
                selector_key: SelectorKey::passthrough(),
                slice: value.clone(),
            }]);
        }

        let candidates = expand_node(value, descriptor, &FieldPath::root());
        if candidates.iter().all(|c| !c.selected) {
            return Ok(vec![ExpandedRecord {
                selector_key: SelectorKey::passthrough(),
                slice: value.clone(),
            }]);
        }
        Ok(candidates
            .into_iter()
            .map(|c| ExpandedRecord {
                selector_key: SelectorKey::from_fragment(&c.key),
                slice: c.slice,
            })
            .collect())
    }
}

fn expand_node(value: &Value, node: &GroupingKeyDescriptor, path: &FieldPath) -> Vec<Candidate> {
    match node.node_type {
        KeyNodeType::String => vec![Candidate::leaf(value)],
        KeyNodeType::Object => expand_object(value, &node.children, path),
        KeyNodeType::Array => expand_array(value, node, path),
    }
}

fn expand_object(
    value: &Value,
    children: &BTreeMap<String, GroupingKeyDescriptor>,
    path: &FieldPath,
) -> Vec<Candidate> {
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return vec![Candidate::unselected(value)],
        other => return contradicted(path, "object", other),
    };

    let mut candidates = vec![Candidate {
        key: Value::Object(Map::new()),
        slice: value.clone(),
        selected: false,
    }];

    for (field, child) in children {
        let field_path = path.field(field);
        let sub = match map.get(field) {
            // Absent fields select nothing; the slice keeps its shape
            None | Some(Value::Null) => {
                for candidate in &mut candidates {
                    set_field(&mut candidate.key, field, Value::Null);
                }
                continue;
            }
            Some(field_value) => expand_node(field_value, child, &field_path),
        };
        candidates = product(candidates, &sub, field);
    }

    candidates
}

fn expand_array(value: &Value, node: &GroupingKeyDescriptor, path: &FieldPath) -> Vec<Candidate> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return vec![Candidate::unselected(value)],
        other => return contradicted(path, "array", other),
    };

    if items.is_empty() {
        return vec![Candidate::unselected(value)];
    }

    let element_path = path.each();
    let nested = node
        .children
        .get(ELEMENT_FIELD)
        .filter(|_| node.children.len() == 1);

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if node.children.is_empty() {
            out.push(Candidate::leaf(item));
        } else {
            let expanded = match nested {
                Some(inner) => expand_node(item, inner, &element_path),
                None => expand_object(item, &node.children, &element_path),
            };
            // Visiting an element is a selection even if its fields are absent
            out.extend(expanded.into_iter().map(|c| Candidate {
                selected: true,
                ..c
            }));
        }
    }
    out
}

/// Cross every existing candidate with every sub-candidate for `field`
fn product(candidates: Vec<Candidate>, sub: &[Candidate], field: &str) -> Vec<Candidate> {
    let mut out = Vec::with_capacity(candidates.len() * sub.len());
    for candidate in candidates {
        for choice in sub {
            let mut key = candidate.key.clone();
            let mut slice = candidate.slice.clone();
            set_field(&mut key, field, choice.key.clone());
            set_field(&mut slice, field, choice.slice.clone());
            out.push(Candidate {
                key,
                slice,
                selected: candidate.selected || choice.selected,
            });
        }
    }
    out
}

fn set_field(target: &mut Value, field: &str, value: Value) {
    if let Value::Object(map) = target {
        map.insert(field.to_string(), value);
    }
}

/// Content of the wrong JSON kind selects nothing and keeps its slice
fn contradicted(path: &FieldPath, expected: &'static str, found: &Value) -> Vec<Candidate> {
    tracing::warn!(
        path = %path,
        expected,
        found = kind_of(found),
        "content contradicts grouping key, left unselected"
    );
    vec![Candidate::unselected(found)]
}
