//! Concatenate strategy
//!
//! Default mode: every member of a bucket lands in one group, input order kept.

use crate::strategy::{GroupingMode, GroupingStrategy, MappingContext, Partition};
use docgroup_artifact::Member;

/// One group per bucket, members in input order
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatenateStrategy;

impl ConcatenateStrategy {
    /// Create new concatenate strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl GroupingStrategy for ConcatenateStrategy {
    fn partition(&self, members: Vec<Member>, _ctx: &MappingContext) -> Vec<Partition> {
        vec![Partition::unlabelled(members)]
    }

    fn mode(&self) -> GroupingMode {
        GroupingMode::Concatenate
    }
}
