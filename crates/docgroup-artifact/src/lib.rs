//! docgroup Artifact Model
//!
//! Artifacts, pages, groups and grouping-key descriptors shared by every
//! docgroup crate.
//!
//! # Core Concepts
//!
//! - [`Artifact`]: Immutable JSON content unit with ordered [`Page`]s
//! - [`Member`]: Group entry, either an artifact or a [`SyntheticRecord`]
//! - [`Group`]: Named, ordered bucket of members
//! - [`GroupingKeyDescriptor`]: Which nested fields decide group membership
//! - [`FieldPath`]: Addressing within JSON content (`addresses[].city`)
//!
//! # Example
//!
//! ```rust,ignore
//! use docgroup_artifact::{Artifact, GroupingKeyDescriptor, Page};
//! use serde_json::json;
//!
//! let artifact = Artifact::new(json!({"name": "Alice"}), 0)
//!     .with_pages([Page::new("scan-001", 0)])?;
//! let key = GroupingKeyDescriptor::from_paths(&["addresses[].city"])?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifact;
mod descriptor;
mod member;
mod path;

pub use artifact::{Artifact, ArtifactError, ArtifactId, Page};
pub use descriptor::{DescriptorError, GroupingKeyDescriptor, KeyNodeType, ELEMENT_FIELD};
pub use member::{Group, Member, SyntheticKind, SyntheticRecord};
pub use path::{FieldPath, PathError, PathSegment};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
