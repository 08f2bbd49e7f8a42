//! docgroup Window
//!
//! Sliding-window classification support for long page sequences: slicing the
//! sequence into overlapping windows and reconciling the per-window results
//! back into one partition.
//!
//! # Core Concepts
//!
//! - [`WindowBuilder`]: Overlapping windows sharing one boundary file
//! - [`WindowResult`]: Classification of one window, grouped or flat shape
//! - [`WindowMergeReconciler`]: Last-writer-wins fold over windows in start order
//! - [`MergedPartition`]: Groups plus the file-to-group map and winning metadata
//! - [`PageOwnershipValidator`]: A page belongs to at most one group
//!
//! # Example
//!
//! ```rust,ignore
//! use docgroup_window::{build_windows, ordered_files, WindowMergeReconciler};
//!
//! let windows = build_windows(&ordered_files(&artifacts), 5);
//! // classify each window independently, collect the raw JSON results
//! let partition = WindowMergeReconciler::new().merge(&raw_results)?;
//! for group in &partition.groups {
//!     println!("{}: {:?}", group.name, group.file_ids());
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod reconcile;
mod result;
mod validation;
mod window;

pub use reconcile::{
    merge_window_results, FileAssignment, MergedGroup, MergedPartition, WindowMergeReconciler,
};
pub use result::{
    Classification, FileClassification, FileRef, GroupAssignment, WindowParseError, WindowResult,
};
pub use validation::{
    validate_partition, validate_window_result, PageOwnershipValidator, ValidationError,
};
pub use window::{build_windows, ordered_files, Window, WindowBuilder, WindowFile};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn five_files_size_three_then_reconcile() {
        let files: Vec<_> = (1..=5).map(|n| WindowFile::new(n.to_string(), n - 1)).collect();
        let windows = build_windows(&files, 3);
        assert_eq!(windows.len(), 2);

        let raw: Vec<_> = windows
            .iter()
            .map(|w| {
                json!({
                    "window": w,
                    "files": w.files.iter().map(|f| json!({
                        "pageNumber": f.position,
                        "groupName": format!("window-{}", w.index),
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();

        let partition = merge_window_results(&raw).unwrap();
        assert_eq!(partition.group("window-0").unwrap().file_ids(), vec!["1", "2"]);
        assert_eq!(partition.group("window-1").unwrap().file_ids(), vec!["3", "4", "5"]);
    }
}
