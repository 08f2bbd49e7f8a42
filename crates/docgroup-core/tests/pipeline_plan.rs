//! Functional tests for the page pipeline.
//!
//! Each scenario drives the public pipeline the way a caller would: plan
//! windows over a page sequence, classify every window (here, with fixed
//! answers standing in for the external classifier), reconcile, and review
//! duplicates. Assertions target the guarantees downstream consumers rely on.

use docgroup_core::prelude::*;
use docgroup_core::DocGroupError;
use docgroup_test_utils::{
    files_result, groups_result, init_tracing, person, sequential_artifacts, window,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Tenet: five pages with window size three give two windows sharing page three.
#[test]
fn five_pages_window_three() {
    init_tracing();
    let pipeline = PagePipeline::new(DocGroupConfig::new().with_window_size(3)).unwrap();

    let windows = pipeline.plan_windows(&sequential_artifacts(5));

    let spans: Vec<(usize, usize)> = windows.iter().map(|w| (w.start_index, w.end_index)).collect();
    assert_eq!(spans, vec![(0, 2), (2, 4)]);
    assert_eq!(windows[0].last(), windows[1].first());
}

/// Tenet: a later window overrides an earlier one for the files they share.
///
/// Window A puts files 0-2 in group1, window B puts files 1-3 in group2. File 0
/// is only seen by A and stays; files 1-3 follow B.
#[test]
fn later_window_overrides_shared_files() {
    init_tracing();
    let raw = vec![
        groups_result(&window(0, 0, 2), &[("group1", &[0, 1, 2])]),
        groups_result(&window(1, 1, 3), &[("group2", &[1, 2, 3])]),
    ];

    let batch = PagePipeline::default().reconcile(&raw).unwrap();

    let group1 = batch.partition.group("group1").unwrap();
    let group2 = batch.partition.group("group2").unwrap();
    assert_eq!(group1.file_ids(), vec!["file-0"]);
    assert_eq!(group2.file_ids(), vec!["file-1", "file-2", "file-3"]);
}

/// Tenet: a single window's result passes through, reordered by position.
#[test]
fn single_window_passthrough() {
    init_tracing();
    let raw = vec![groups_result(&window(0, 0, 3), &[("B", &[3, 1]), ("A", &[2, 0])])];

    let batch = PagePipeline::default().reconcile(&raw).unwrap();

    assert_eq!(batch.partition.group_names(), vec!["A", "B"]);
    assert_eq!(batch.partition.group("A").unwrap().positions(), vec![0, 2]);
    assert_eq!(batch.partition.group("B").unwrap().positions(), vec![1, 3]);
}

/// Tenet: a malformed window never sinks the whole merge.
#[test]
fn malformed_windows_are_skipped() {
    init_tracing();
    let raw = vec![
        json!({"window": null, "groups": []}),
        json!(42),
        files_result(&window(1, 2, 3), |_| "Tail"),
        json!({"window": {"startIndex": 0, "endIndex": 1}}),
    ];

    let batch = PagePipeline::default().reconcile(&raw).unwrap();

    assert_eq!(batch.partition.group_names(), vec!["Tail"]);
    assert_eq!(batch.partition.file_count(), 2);
}

/// Tenet: a page claimed by two groups inside one window is a hard error that
/// names both groups and the page.
#[test]
fn duplicate_page_is_surfaced() {
    init_tracing();
    let raw = vec![groups_result(
        &window(0, 0, 2),
        &[("Invoice", &[0, 1]), ("Receipt", &[1, 2])],
    )];

    let err = PagePipeline::default().reconcile(&raw).unwrap_err();

    assert!(err.is_validation());
    match err {
        DocGroupError::Validation(e) => assert_eq!(e.groups(), ("Invoice", "Receipt")),
        other => panic!("unexpected error: {other}"),
    }
}

/// Tenet: near-duplicate group names are flagged and can be merged after review.
#[test]
fn duplicates_reviewed_and_merged() {
    init_tracing();
    let pipeline = PagePipeline::new(DocGroupConfig::new().with_max_sample_files(1)).unwrap();
    let raw: Vec<Value> = vec![files_result(&window(0, 0, 3), |f| {
        if f.position < 3 {
            "ME Physical Therapy"
        } else {
            "ME Physical Therapy (Northglenn)"
        }
    })];

    let batch = pipeline.reconcile(&raw).unwrap();
    assert_eq!(batch.duplicates.len(), 1);
    assert!(batch.duplicates[0].similarity >= 0.7);

    let payloads = pipeline.review_payloads(&batch).unwrap();
    assert_eq!(payloads[0].group1.file_count, 3);
    assert_eq!(payloads[0].group1.sample_files.len(), 1);

    let resolved = pipeline
        .resolve(
            &batch,
            &batch.duplicates[0],
            &ResolutionDecision::MergeInto {
                canonical_name: "ME Physical Therapy".to_string(),
            },
        )
        .unwrap();
    assert_eq!(resolved.partition.group_names(), vec!["ME Physical Therapy"]);
    assert_eq!(resolved.partition.file_count(), 4);
}

/// Tenet: concatenate keeps both artifacts in one default group, in order.
#[test]
fn concatenate_two_people() {
    init_tracing();
    let artifacts = vec![person("Alice", 0), person("Dan", 1)];

    let groups = PagePipeline::default().group_artifacts(&artifacts, None).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "default");
    assert_eq!(groups[0].members[0].json_content()["name"], "Alice");
    assert_eq!(groups[0].members[1].json_content()["name"], "Dan");
}

/// Tenet: merge collapses scalars into arrays in source order.
#[test]
fn merge_two_people() {
    init_tracing();
    let artifacts = vec![person("Alice", 0), person("Dan", 1)];

    let groups = PagePipeline::default()
        .group_artifacts_with(&artifacts, GroupingMode::Merge, None)
        .unwrap();

    assert_eq!(groups[0].members.len(), 1);
    assert_eq!(groups[0].members[0].json_content(), &json!({"name": ["Alice", "Dan"]}));
}

/// Tenet: a nested array grouping key fans one artifact out into one group per
/// element, each holding a slice with only that element substituted in.
#[test]
fn nested_city_key_fans_out() {
    init_tracing();
    let artifact = Artifact::new(
        json!({
            "name": "Alice",
            "addresses": [
                {"city": "Denver"},
                {"city": "Boulder"},
                {"city": "Golden"}
            ]
        }),
        0,
    );
    let key = GroupingKeyDescriptor::from_paths(&["addresses[].city"]).unwrap();

    let groups = PagePipeline::default()
        .group_artifacts(&[artifact], Some(&key))
        .unwrap();

    assert_eq!(groups.len(), 3);
    let cities: Vec<&Value> = groups
        .iter()
        .map(|g| &g.members[0].json_content()["addresses"]["city"])
        .collect();
    assert_eq!(cities, vec!["Denver", "Boulder", "Golden"]);
}

/// Tenet: content that contradicts the grouping key never aborts a batch; the
/// odd artifact falls back to the default group while the rest are keyed.
#[test]
fn contradicting_content_falls_back_to_default() {
    init_tracing();
    let artifacts = vec![
        Artifact::new(json!({"addresses": "not an array"}), 0),
        Artifact::new(json!({"addresses": [{"city": "Denver"}]}), 1),
    ];
    let key = GroupingKeyDescriptor::from_paths(&["addresses[].city"]).unwrap();

    let groups = PagePipeline::default()
        .group_artifacts(&artifacts, Some(&key))
        .unwrap();

    let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["default", r#"{"addresses":{"city":"Denver"}}"#]);
    assert!(groups[0].members[0].is_artifact());
}

/// Tenet: a structurally invalid grouping key fails loudly.
#[test]
fn invalid_descriptor_is_an_error() {
    init_tracing();
    let key = GroupingKeyDescriptor::object().with_child(
        "a",
        GroupingKeyDescriptor::string().with_child("b", GroupingKeyDescriptor::string()),
    );

    let err = PagePipeline::default()
        .group_artifacts(&[person("Alice", 0)], Some(&key))
        .unwrap_err();

    assert!(matches!(err, DocGroupError::Grouping(_)));
}

/// Tenet: a config file drives the pipeline.
#[test]
fn config_from_toml() {
    let config = DocGroupConfig::from_toml_str(
        r#"
        window_size = 4
        max_sample_files = 2
        default_mode = "split"
        "#,
    )
    .unwrap();
    let pipeline = PagePipeline::new(config).unwrap();

    assert_eq!(pipeline.plan_windows(&sequential_artifacts(7)).len(), 2);
    assert_eq!(pipeline.config().default_mode, GroupingMode::Split);
}
