//! Overwrite strategy
//!
//! Last value wins: the final member of a bucket replaces everything before it.

use crate::strategy::{GroupingMode, GroupingStrategy, MappingContext, Partition};
use docgroup_artifact::Member;

/// Keeps only the last member of each bucket
#[derive(Debug, Clone, Copy, Default)]
pub struct OverwriteStrategy;

impl OverwriteStrategy {
    /// Create new overwrite strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl GroupingStrategy for OverwriteStrategy {
    fn partition(&self, members: Vec<Member>, _ctx: &MappingContext) -> Vec<Partition> {
        let last: Vec<Member> = members.into_iter().last().into_iter().collect();
        vec![Partition::unlabelled(last)]
    }

    fn mode(&self) -> GroupingMode {
        GroupingMode::Overwrite
    }
}
