//! docgroup Grouping
//!
//! Maps lists of artifacts to named groups, optionally expanding nested JSON
//! along a grouping key first.
//!
//! # Core Concepts
//!
//! - [`GroupingKeyExpander`]: One (selector key, slice) pair per path combination
//! - [`GroupingStrategy`]: Core trait, one implementation per [`GroupingMode`]
//! - [`ConcatenateStrategy`]: Everything in one group (default)
//! - [`SplitStrategy`] / [`SplitByFileStrategy`]: One group per member / per page
//! - [`OverwriteStrategy`]: Last value wins
//! - [`MergeStrategy`]: Deep merge, scalars collected into arrays
//! - [`StrategyRegistry`]: Lookup by mode or name
//! - [`ArtifactsToGroupsMapper`]: Buckets by selector key and applies a strategy
//!
//! # Example
//!
//! ```rust,ignore
//! use docgroup_grouping::{ArtifactsToGroupsMapper, GroupingMode};
//! use docgroup_artifact::GroupingKeyDescriptor;
//!
//! let key = GroupingKeyDescriptor::from_paths(&["addresses[].city"])?;
//! let groups = ArtifactsToGroupsMapper::new().map(&artifacts, GroupingMode::Merge, Some(&key))?;
//! for (name, members) in &groups {
//!     println!("{name}: {} members", members.len());
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod concatenate;
mod error;
mod expander;
mod mapper;
mod merge;
mod overwrite;
mod registry;
mod split;
mod strategy;

pub use concatenate::ConcatenateStrategy;
pub use error::GroupingError;
pub use expander::{ExpandedRecord, GroupingKeyExpander, SelectorKey};
pub use mapper::{into_groups, ArtifactsToGroupsMapper, GroupMap, DEFAULT_GROUP};
pub use merge::{deep_merge, MergeStrategy};
pub use overwrite::OverwriteStrategy;
pub use registry::StrategyRegistry;
pub use split::{SplitByFileStrategy, SplitStrategy};
pub use strategy::{GroupingMode, GroupingStrategy, MappingContext, Partition};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
