//! Merge strategy
//!
//! Collapses a bucket into one `Merged` record. Objects merge key by key and
//! arrays index by index; wherever two or more sources provide a scalar the
//! values are collected into an array in source order (no dedup, no overwrite).

use crate::strategy::{GroupingMode, GroupingStrategy, MappingContext, Partition};
use docgroup_artifact::{Member, Page, SyntheticRecord};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Deep-merges every member of a bucket
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeStrategy;

impl MergeStrategy {
    /// Create new merge strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl GroupingStrategy for MergeStrategy {
    fn partition(&self, members: Vec<Member>, _ctx: &MappingContext) -> Vec<Partition> {
        if members.is_empty() {
            return vec![Partition::unlabelled(Vec::new())];
        }

        let contents: Vec<&Value> = members.iter().map(Member::json_content).collect();
        let merged = deep_merge(&contents);
        let position = members.iter().map(Member::position).min().unwrap_or_default();

        let mut seen = HashSet::new();
        let mut pages: Vec<Page> = members
            .iter()
            .flat_map(Member::pages)
            .filter(|p| seen.insert(p.file_id.clone()))
            .cloned()
            .collect();
        pages.sort_by_key(|p| p.page_number);

        let record = SyntheticRecord::merged(merged, pages, position);
        vec![Partition::unlabelled(vec![record.into()])]
    }

    fn mode(&self) -> GroupingMode {
        GroupingMode::Merge
    }
}

/// Deep merge of several JSON values, in order
///
/// - No values → `null`; one value → that value
/// - All objects → union of keys, each merged recursively over the sources
///   that have it
/// - All arrays → merged index by index
/// - Anything else → array of the values in source order
#[must_use]
pub fn deep_merge(values: &[&Value]) -> Value {
    match values {
        [] => Value::Null,
        [single] => (*single).clone(),
        _ if values.iter().all(|v| v.is_object()) => merge_objects(values),
        _ if values.iter().all(|v| v.is_array()) => merge_arrays(values),
        _ => Value::Array(values.iter().map(|v| (*v).clone()).collect()),
    }
}

fn merge_objects(values: &[&Value]) -> Value {
    let mut keys: Vec<&String> = Vec::new();
    for value in values {
        if let Value::Object(map) = value {
            for key in map.keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
    }

    let mut merged = Map::new();
    for key in keys {
        let sources: Vec<&Value> = values.iter().filter_map(|v| v.get(key)).collect();
        merged.insert(key.clone(), deep_merge(&sources));
    }
    Value::Object(merged)
}

fn merge_arrays(values: &[&Value]) -> Value {
    let len = values
        .iter()
        .filter_map(|v| v.as_array().map(Vec::len))
        .max()
        .unwrap_or(0);

    let merged = (0..len)
        .map(|index| {
            let sources: Vec<&Value> = values.iter().filter_map(|v| v.get(index)).collect();
            deep_merge(&sources)
        })
        .collect();
    Value::Array(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgroup_artifact::{Artifact, SyntheticKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn merge_collects_scalars_in_order() {
        let a = json!({"name": "Alice"});
        let b = json!({"name": "Dan"});
        assert_eq!(deep_merge(&[&a, &b]), json!({"name": ["Alice", "Dan"]}));
    }

    #[test]
    fn merge_does_not_deduplicate() {
        let a = json!({"state": "CO"});
        let b = json!({"state": "CO"});
        assert_eq!(deep_merge(&[&a, &b]), json!({"state": ["CO", "CO"]}));
    }

    #[test]
    fn merge_keeps_single_source_fields() {
        let a = json!({"name": "Alice", "age": 30});
        let b = json!({"name": "Dan"});
        assert_eq!(
            deep_merge(&[&a, &b]),
            json!({"name": ["Alice", "Dan"], "age": 30})
        );
    }

    #[test]
    fn merge_recurses_into_objects_and_arrays() {
        let a = json!({"address": {"city": "Denver", "zip": "1"}, "tags": ["x", "y"]});
        let b = json!({"address": {"city": "Boulder"}, "tags": ["z"]});
        assert_eq!(
            deep_merge(&[&a, &b]),
            json!({
                "address": {"city": ["Denver", "Boulder"], "zip": "1"},
                "tags": [["x", "z"], "y"]
            })
        );
    }

    #[test]
    fn merge_mixed_kinds_collects() {
        let a = json!({"v": {"x": 1}});
        let b = json!({"v": 2});
        assert_eq!(deep_merge(&[&a, &b]), json!({"v": [{"x": 1}, 2]}));
    }

    #[test]
    fn merge_strategy_produces_single_record() {
        let members: Vec<Member> = vec![
            Artifact::new(json!({"name": "Alice"}), 4).into(),
            Artifact::new(json!({"name": "Dan"}), 2).into(),
        ];
        let partitions = MergeStrategy::new().partition(members, &MappingContext::default());

        assert_eq!(partitions.len(), 1);
        let record = &partitions[0].members[0];
        assert_eq!(record.synthetic_kind(), Some(SyntheticKind::Merged));
        assert_eq!(record.json_content(), &json!({"name": ["Alice", "Dan"]}));
        assert_eq!(record.position(), 2);
    }
}
