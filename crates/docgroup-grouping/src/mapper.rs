//! Artifact-to-groups mapping
//!
//! Buckets artifacts (optionally expanded along a grouping key) and applies a
//! grouping strategy within each bucket.

use crate::error::GroupingError;
use crate::expander::GroupingKeyExpander;
use crate::registry::StrategyRegistry;
use crate::strategy::{GroupingMode, GroupingStrategy, MappingContext};
use docgroup_artifact::{Artifact, Group, GroupingKeyDescriptor, Member, SyntheticRecord};
use indexmap::IndexMap;

/// Key of the single group produced without a grouping key
pub const DEFAULT_GROUP: &str = "default";

/// Ordered mapping from group key to members
pub type GroupMap = IndexMap<String, Vec<Member>>;

/// Members sharing one selector key
#[derive(Debug)]
struct Bucket {
    base_key: String,
    keyed: bool,
    members: Vec<Member>,
}

/// Maps artifact lists to named groups
///
/// # Determinism
/// Group order is the order in which keys are first produced; groups with
/// zero members are never emitted.
#[derive(Debug, Clone)]
pub struct ArtifactsToGroupsMapper {
    registry: StrategyRegistry,
    expander: GroupingKeyExpander,
}

impl ArtifactsToGroupsMapper {
    /// Create mapper with the built-in strategies
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_registry(StrategyRegistry::with_defaults())
    }

    /// Create mapper with a custom registry
    #[inline]
    #[must_use]
    pub fn with_registry(registry: StrategyRegistry) -> Self {
        Self {
            registry,
            expander: GroupingKeyExpander::new(),
        }
    }

    /// Strategy registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Map artifacts to groups under a built-in mode
    ///
    /// # Errors
    /// - [`GroupingError::UnknownMode`] if the mode is not registered
    /// - Descriptor and content errors from [`GroupingKeyExpander::expand`]
    pub fn map(
        &self,
        artifacts: &[Artifact],
        mode: GroupingMode,
        descriptor: Option<&GroupingKeyDescriptor>,
    ) -> Result<GroupMap, GroupingError> {
        let strategy = self.registry.get(mode)?;
        self.map_with(artifacts, strategy.as_ref(), descriptor)
    }

    /// Map artifacts to groups under a strategy looked up by name
    ///
    /// # Errors
    /// Same as [`ArtifactsToGroupsMapper::map`]
    pub fn map_named(
        &self,
        artifacts: &[Artifact],
        name: &str,
        descriptor: Option<&GroupingKeyDescriptor>,
    ) -> Result<GroupMap, GroupingError> {
        let strategy = self.registry.resolve(name)?;
        self.map_with(artifacts, strategy.as_ref(), descriptor)
    }

    /// Map artifacts to groups under an explicit strategy
    ///
    /// # Errors
    /// Descriptor and content errors from [`GroupingKeyExpander::expand`]
    pub fn map_with(
        &self,
        artifacts: &[Artifact],
        strategy: &dyn GroupingStrategy,
        descriptor: Option<&GroupingKeyDescriptor>,
    ) -> Result<GroupMap, GroupingError> {
        let mut groups = GroupMap::new();
        if artifacts.is_empty() {
            return Ok(groups);
        }

        let ctx = MappingContext::from_artifacts(artifacts);
        let buckets = self.bucket(artifacts, descriptor)?;
        let bucket_count = buckets.len();

        for bucket in buckets {
            for partition in strategy.partition(bucket.members, &ctx) {
                if partition.members.is_empty() {
                    continue;
                }
                let key = match (partition.label, bucket.keyed) {
                    (None, _) => bucket.base_key.clone(),
                    (Some(label), false) => label,
                    (Some(label), true) => format!("{}/{label}", bucket.base_key),
                };
                insert_unique(&mut groups, key, partition.members);
            }
        }

        tracing::debug!(
            strategy = strategy.name(),
            artifacts = artifacts.len(),
            buckets = bucket_count,
            groups = groups.len(),
            "mapped artifacts to groups"
        );
        Ok(groups)
    }

    fn bucket(
        &self,
        artifacts: &[Artifact],
        descriptor: Option<&GroupingKeyDescriptor>,
    ) -> Result<Vec<Bucket>, GroupingError> {
        let descriptor = match descriptor {
            Some(d) => {
                d.validate()?;
                d
            }
            None => return Ok(vec![unkeyed_bucket(artifacts)]),
        };
        if descriptor.is_passthrough() {
            return Ok(vec![unkeyed_bucket(artifacts)]);
        }

        // Unselected records share the passthrough key "" and keep the artifact
        let mut by_key: IndexMap<String, Vec<Member>> = IndexMap::new();
        for artifact in artifacts {
            for record in self.expander.expand(artifact.json_content(), descriptor)? {
                let member = if record.selector_key.is_passthrough() {
                    Member::from(artifact.clone())
                } else {
                    SyntheticRecord::slice(artifact, record.slice).into()
                };
                by_key
                    .entry(record.selector_key.into_string())
                    .or_default()
                    .push(member);
            }
        }

        Ok(by_key
            .into_iter()
            .map(|(base_key, members)| {
                if base_key.is_empty() {
                    Bucket {
                        base_key: DEFAULT_GROUP.to_string(),
                        keyed: false,
                        members,
                    }
                } else {
                    Bucket {
                        base_key,
                        keyed: true,
                        members,
                    }
                }
            })
            .collect())
    }
}

impl Default for ArtifactsToGroupsMapper {
    fn default() -> Self {
        Self::new()
    }
}

fn unkeyed_bucket(artifacts: &[Artifact]) -> Bucket {
    Bucket {
        base_key: DEFAULT_GROUP.to_string(),
        keyed: false,
        members: artifacts.iter().cloned().map(Member::from).collect(),
    }
}

/// Insert under `key`, suffixing `#2`, `#3`, ... on collision
fn insert_unique(groups: &mut GroupMap, key: String, members: Vec<Member>) {
    if !groups.contains_key(&key) {
        groups.insert(key, members);
        return;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{key}#{n}");
        if !groups.contains_key(&candidate) {
            groups.insert(candidate, members);
            return;
        }
        n += 1;
    }
}

/// Convert a group map into [`Group`] values, order kept
#[must_use]
pub fn into_groups(map: GroupMap) -> Vec<Group> {
    map.into_iter()
        .map(|(name, members)| Group::new(name, members))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docgroup_artifact::{Page, SyntheticKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn people() -> Vec<Artifact> {
        vec![
            Artifact::new(json!({"name": "Alice"}), 0),
            Artifact::new(json!({"name": "Dan"}), 1),
        ]
    }

    #[test]
    fn concatenate_default_group() {
        let artifacts = people();
        let groups = ArtifactsToGroupsMapper::new()
            .map(&artifacts, GroupingMode::Concatenate, None)
            .unwrap();

        assert_eq!(groups.len(), 1);
        let members = &groups[DEFAULT_GROUP];
        assert_eq!(members[0], Member::from(artifacts[0].clone()));
        assert_eq!(members[1], Member::from(artifacts[1].clone()));
    }

    #[test]
    fn merge_default_group() {
        let groups = ArtifactsToGroupsMapper::new()
            .map(&people(), GroupingMode::Merge, None)
            .unwrap();
        let members = &groups[DEFAULT_GROUP];
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].json_content(), &json!({"name": ["Alice", "Dan"]}));
    }

    #[test]
    fn split_keys_by_artifact_id() {
        let artifacts = people();
        let groups = ArtifactsToGroupsMapper::new()
            .map(&artifacts, GroupingMode::Split, None)
            .unwrap();
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(
            keys,
            artifacts.iter().map(|a| a.id().to_string()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn empty_input_is_empty_map() {
        let groups = ArtifactsToGroupsMapper::new()
            .map(&[], GroupingMode::Merge, None)
            .unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn grouping_key_buckets_by_selector() {
        let artifacts = vec![
            Artifact::new(json!({"state": "CO", "city": "Denver", "name": "A"}), 0),
            Artifact::new(json!({"state": "NM", "city": "Taos", "name": "B"}), 1),
            Artifact::new(json!({"state": "CO", "city": "Boulder", "name": "C"}), 2),
        ];
        let descriptor = GroupingKeyDescriptor::from_paths(&["state"]).unwrap();

        let groups = ArtifactsToGroupsMapper::new()
            .map(&artifacts, GroupingMode::Merge, Some(&descriptor))
            .unwrap();

        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec![r#"{"state":"CO"}"#, r#"{"state":"NM"}"#]);
        assert_eq!(
            groups[r#"{"state":"CO"}"#][0].json_content(),
            &json!({"state": ["CO", "CO"], "city": ["Denver", "Boulder"], "name": ["A", "C"]})
        );
    }

    #[test]
    fn grouping_key_with_split_prefixes_labels() {
        let artifacts = vec![
            Artifact::new(json!({"k": 1}), 0)
                .with_pages([Page::new("f0", 0)])
                .unwrap(),
            Artifact::new(json!({"k": 1}), 1),
        ];
        let descriptor = GroupingKeyDescriptor::from_paths(&["k"]).unwrap();

        let groups = ArtifactsToGroupsMapper::new()
            .map(&artifacts, GroupingMode::Split, Some(&descriptor))
            .unwrap();

        assert_eq!(groups.len(), 2);
        for (key, members) in &groups {
            assert!(key.starts_with(r#"{"k":1}/"#));
            assert_eq!(members[0].synthetic_kind(), Some(SyntheticKind::Slice));
            assert_eq!(members[1].synthetic_kind(), Some(SyntheticKind::Files));
        }
    }

    #[test]
    fn passthrough_descriptor_behaves_like_none() {
        let artifacts = people();
        let descriptor = GroupingKeyDescriptor::object();
        let groups = ArtifactsToGroupsMapper::new()
            .map(&artifacts, GroupingMode::Concatenate, Some(&descriptor))
            .unwrap();
        assert!(groups[DEFAULT_GROUP].iter().all(Member::is_artifact));
    }

    #[test]
    fn artifacts_without_key_fields_land_in_default_group() {
        let artifacts = vec![
            Artifact::new(json!({"name": "Alice", "addresses": [{"city": "Denver"}]}), 0),
            Artifact::new(json!({"name": "Bob"}), 1),
        ];
        let descriptor = GroupingKeyDescriptor::from_paths(&["addresses[].city"]).unwrap();

        let groups = ArtifactsToGroupsMapper::new()
            .map(&artifacts, GroupingMode::Concatenate, Some(&descriptor))
            .unwrap();

        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec![r#"{"addresses":{"city":"Denver"}}"#, DEFAULT_GROUP]);
        assert!(groups[DEFAULT_GROUP][0].is_artifact());
        assert_eq!(groups[DEFAULT_GROUP][0].json_content()["name"], "Bob");
    }

    #[test]
    fn colliding_keys_are_suffixed() {
        let artifact = Artifact::new(json!({"tags": ["a", "a"]}), 0);
        let descriptor = GroupingKeyDescriptor::from_paths(&["tags[]"]).unwrap();
        let groups = ArtifactsToGroupsMapper::new()
            .map(&[artifact.clone()], GroupingMode::Split, Some(&descriptor))
            .unwrap();

        let base = format!(r#"{{"tags":"a"}}/{}"#, artifact.id());
        let keys: Vec<_> = groups.keys().cloned().collect();
        assert_eq!(keys, vec![base.clone(), format!("{base}#2")]);
    }

    #[test]
    fn map_named_uses_registry() {
        let groups = ArtifactsToGroupsMapper::new()
            .map_named(&people(), "overwrite", None)
            .unwrap();
        assert_eq!(groups[DEFAULT_GROUP][0].json_content()["name"], "Dan");
    }

    #[test]
    fn into_groups_keeps_order() {
        let map = ArtifactsToGroupsMapper::new()
            .map(&people(), GroupingMode::Split, None)
            .unwrap();
        let keys: Vec<_> = map.keys().cloned().collect();
        let groups = into_groups(map);
        assert_eq!(groups.iter().map(|g| g.name.clone()).collect::<Vec<_>>(), keys);
    }
}
