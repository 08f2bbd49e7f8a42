//! docgroup Dedup
//!
//! Finds groups whose names likely refer to the same entity (`"ABC Medical,
//! LLC"` and `"ABC Medical LLC"`, `"Clinic"` and `"Clinic (Denver)"`) and
//! prepares them for review.
//!
//! # Core Concepts
//!
//! - [`SimilarityScorer`]: Replaceable name scorer, [`HeuristicScorer`] by default
//! - [`SimilarityConfig`]: Band weights and the reporting threshold
//! - [`DuplicateGroupDetector`]: All-pairs comparison, descending similarity
//! - [`prepare_duplicate_for_resolution`]: Capped review payload with true counts
//! - [`apply_resolution`]: Merge or keep a reviewed pair
//!
//! # Example
//!
//! ```rust,ignore
//! use docgroup_dedup::{DuplicateGroupDetector, prepare_duplicate_for_resolution};
//!
//! let detector = DuplicateGroupDetector::new();
//! for candidate in detector.identify_in_partition(&partition) {
//!     let payload = prepare_duplicate_for_resolution(&candidate, &partition, 5)?;
//!     println!("{}", serde_json::to_string_pretty(&payload)?);
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod detector;
mod error;
mod resolution;
mod similarity;

pub use detector::{
    identify_duplicate_candidates, DuplicateCandidate, DuplicateGroupDetector, GroupSummary,
};
pub use error::DedupError;
pub use resolution::{
    apply_resolution, prepare_duplicate_for_resolution, GroupReview, ResolutionDecision,
    ResolutionPayload, SampleFile,
};
pub use similarity::{
    jaccard, normalize, split_qualifier, HeuristicScorer, MatchKind, QualifiedName,
    SimilarityConfig, SimilarityScore, SimilarityScorer, DUPLICATE_THRESHOLD,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
