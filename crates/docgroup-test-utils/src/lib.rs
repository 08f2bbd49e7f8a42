//! Testing utilities for the docgroup workspace
//!
//! Shared fixtures for artifacts and window results, and a tracing setup.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use docgroup_artifact::{Artifact, Page};
use docgroup_window::{Window, WindowFile};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber honoring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn person(name: &str, position: i64) -> Artifact {
    Artifact::new(json!({ "name": name }), position)
}

pub fn paged_artifact(position: i64, pages: &[(&str, u32)]) -> Artifact {
    Artifact::new(json!({}), position)
        .with_pages(pages.iter().map(|(id, n)| Page::new(*id, *n)))
        .unwrap()
}

/// `n` artifacts, each owning one page `file-{i}` at position `i`
pub fn sequential_artifacts(n: u32) -> Vec<Artifact> {
    (0..n)
        .map(|i| paged_artifact(i64::from(i), &[(format!("file-{i}").as_str(), i)]))
        .collect()
}

/// Flat-shape window result assigning each file via `group_of`
pub fn files_result<'a>(window: &Window, group_of: impl Fn(&WindowFile) -> &'a str) -> Value {
    let files: Vec<Value> = window
        .files
        .iter()
        .map(|f| json!({ "pageNumber": f.position, "groupName": group_of(f) }))
        .collect();
    json!({ "window": window, "files": files })
}

/// Grouped-shape window result from `(name, positions)` pairs
pub fn groups_result(window: &Window, groups: &[(&str, &[u32])]) -> Value {
    let groups: Vec<Value> = groups
        .iter()
        .map(|(name, positions)| json!({ "groupName": name, "fileRefs": positions }))
        .collect();
    json!({ "window": window, "groups": groups })
}

/// Window over `file-{p}` for every position in `start..=end`
pub fn window(index: usize, start: u32, end: u32) -> Window {
    Window {
        index,
        start_index: start as usize,
        end_index: end as usize,
        files: (start..=end)
            .map(|p| WindowFile::new(format!("file-{p}"), p))
            .collect(),
    }
}
