//! Split strategies
//!
//! [`SplitStrategy`] gives every member its own group; [`SplitByFileStrategy`]
//! gives every page its own group.

use crate::strategy::{GroupingMode, GroupingStrategy, MappingContext, Partition};
use docgroup_artifact::{Member, Page, SyntheticRecord};
use indexmap::IndexMap;

/// One group per member
///
/// # Characteristics
/// - Each group also receives one shared `Files` record holding the union of
///   every page across all input artifacts of the mapping call
/// - Without any pages in the input, groups hold the member alone
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitStrategy;

impl SplitStrategy {
    /// Create new split strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl GroupingStrategy for SplitStrategy {
    fn partition(&self, members: Vec<Member>, ctx: &MappingContext) -> Vec<Partition> {
        let shared_files = (!ctx.page_union().is_empty())
            .then(|| Member::from(SyntheticRecord::files(ctx.page_union().to_vec())));

        members
            .into_iter()
            .enumerate()
            .map(|(index, member)| {
                let label = member_label(&member, index);
                let mut group = vec![member];
                group.extend(shared_files.clone());
                Partition::labelled(label, group)
            })
            .collect()
    }

    fn mode(&self) -> GroupingMode {
        GroupingMode::Split
    }
}

/// One group per page
///
/// # Characteristics
/// - Each group holds the member(s) owning the page plus a `Files` record
///   wrapping exactly that page
/// - A member without pages keeps a group of its own so nothing is lost
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitByFileStrategy;

impl SplitByFileStrategy {
    /// Create new split-by-file strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl GroupingStrategy for SplitByFileStrategy {
    fn partition(&self, members: Vec<Member>, _ctx: &MappingContext) -> Vec<Partition> {
        let mut by_page: IndexMap<u32, (Page, Vec<Member>)> = IndexMap::new();
        let mut pageless = Vec::new();

        for (index, member) in members.into_iter().enumerate() {
            if member.pages().is_empty() {
                pageless.push(Partition::labelled(member_label(&member, index), vec![member]));
                continue;
            }
            for page in member.pages() {
                by_page
                    .entry(page.page_number)
                    .or_insert_with(|| (page.clone(), Vec::new()))
                    .1
                    .push(member.clone());
            }
        }

        by_page
            .into_iter()
            .map(|(number, (page, mut owners))| {
                owners.push(SyntheticRecord::files(vec![page]).into());
                Partition::labelled(format!("page-{number}"), owners)
            })
            .chain(pageless)
            .collect()
    }

    fn mode(&self) -> GroupingMode {
        GroupingMode::SplitByFile
    }
}

/// Group label for a single member
fn member_label(member: &Member, index: usize) -> String {
    member
        .source_id()
        .map_or_else(|| format!("record-{index}"), |id| id.to_string())
}
