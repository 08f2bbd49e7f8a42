//! docgroup Core - document grouping pipeline
//!
//! The entry point that:
//! - Plans overlapping comparison windows over a page sequence
//! - Reconciles per-window classifications into one partition
//! - Flags likely duplicate groups and builds review payloads
//! - Groups structured artifacts by grouping key
//!
//! # Example
//!
//! ```rust,ignore
//! use docgroup_core::prelude::*;
//!
//! let pipeline = PagePipeline::new(DocGroupConfig::from_toml_str(config_toml)?)?;
//! let windows = pipeline.plan_windows(&artifacts);
//! // classify each window, collect raw JSON results
//! let batch = pipeline.reconcile(&raw_results)?;
//! for payload in pipeline.review_payloads(&batch)? {
//!     println!("{} vs {}", payload.group1.name, payload.group2.name);
//! }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::DocGroupConfig;
pub use error::{DocGroupError, Result};
pub use pipeline::{PagePipeline, ReconciledBatch};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with docgroup
    pub use crate::{DocGroupConfig, DocGroupError, PagePipeline, ReconciledBatch};
    pub use docgroup_artifact::{Artifact, Group, GroupingKeyDescriptor, Member, Page};
    pub use docgroup_dedup::{DuplicateCandidate, ResolutionDecision, ResolutionPayload};
    pub use docgroup_grouping::GroupingMode;
    pub use docgroup_window::{MergedGroup, MergedPartition, Window, WindowResult};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use serde_json::json;

    #[test]
    fn pipeline_full_flow() {
        let pipeline = PagePipeline::new(DocGroupConfig::new().with_window_size(3)).unwrap();
        let artifacts: Vec<Artifact> = (0..4)
            .map(|n| {
                Artifact::new(json!({}), i64::from(n))
                    .with_pages([Page::new(format!("p{n}"), n)])
                    .unwrap()
            })
            .collect();

        let windows = pipeline.plan_windows(&artifacts);
        let names = ["Acme Clinic", "Acme Clinic", "Acme Clinic (Aurora)", "Acme Clinic (Aurora)"];
        let raw: Vec<_> = windows
            .iter()
            .map(|w| {
                let files: Vec<_> = w
                    .files
                    .iter()
                    .map(|f| json!({"pageNumber": f.position, "groupName": names[f.position as usize]}))
                    .collect();
                json!({"window": w, "files": files})
            })
            .collect();

        let batch = pipeline.reconcile(&raw).unwrap();
        assert_eq!(batch.partition.len(), 2);
        assert!(batch.needs_review());

        let payloads = pipeline.review_payloads(&batch).unwrap();
        assert_eq!(payloads[0].group1.file_count, 2);

        let resolved = pipeline
            .resolve(
                &batch,
                &batch.duplicates[0],
                &ResolutionDecision::MergeInto {
                    canonical_name: "Acme Clinic".to_string(),
                },
            )
            .unwrap();
        assert_eq!(resolved.partition.len(), 1);
        assert!(!resolved.needs_review());
    }
}
