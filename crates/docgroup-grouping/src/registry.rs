//! Strategy registry for grouping strategies
//!
//! Provides [`StrategyRegistry`] for looking up grouping strategies by mode or
//! by name, including caller-registered custom strategies.

use crate::concatenate::ConcatenateStrategy;
use crate::error::GroupingError;
use crate::merge::MergeStrategy;
use crate::overwrite::OverwriteStrategy;
use crate::split::{SplitByFileStrategy, SplitStrategy};
use crate::strategy::{GroupingMode, GroupingStrategy};
use indexmap::IndexMap;
use std::sync::Arc;

/// Registry of available grouping strategies, keyed by name
#[derive(Debug, Default, Clone)]
pub struct StrategyRegistry {
    strategies: IndexMap<String, Arc<dyn GroupingStrategy>>,
}

impl StrategyRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: IndexMap::new(),
        }
    }

    /// Create registry with the built-in strategies
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ConcatenateStrategy::new()));
        registry.register(Arc::new(SplitStrategy::new()));
        registry.register(Arc::new(SplitByFileStrategy::new()));
        registry.register(Arc::new(OverwriteStrategy::new()));
        registry.register(Arc::new(MergeStrategy::new()));
        registry
    }

    /// Register a strategy under its name, replacing any previous one
    pub fn register(&mut self, strategy: Arc<dyn GroupingStrategy>) {
        self.strategies.insert(strategy.name().to_string(), strategy);
    }

    /// Check if strategy exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Remove strategy
    #[inline]
    pub fn remove(&mut self, name: &str) -> bool {
        self.strategies.shift_remove(name).is_some()
    }

    /// Look up strategy by name
    ///
    /// Names are matched exactly first, then as a [`GroupingMode`] spelling
    /// (`Split-By-File` finds `split_by_file`).
    ///
    /// # Errors
    /// Returns [`GroupingError::UnknownMode`] if nothing matches
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn GroupingStrategy>, GroupingError> {
        if let Some(strategy) = self.strategies.get(name) {
            return Ok(Arc::clone(strategy));
        }
        let mode: GroupingMode = name.parse()?;
        self.get(mode)
    }

    /// Look up strategy for a built-in mode
    ///
    /// # Errors
    /// Returns [`GroupingError::UnknownMode`] if the mode was removed
    pub fn get(&self, mode: GroupingMode) -> Result<Arc<dyn GroupingStrategy>, GroupingError> {
        self.strategies
            .get(mode.as_str())
            .cloned()
            .ok_or_else(|| GroupingError::UnknownMode(mode.to_string()))
    }

    /// List registered names in registration order
    #[inline]
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.strategies.keys().map(String::as_str).collect()
    }

    /// Get number of registered strategies
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{MappingContext, Partition};
    use docgroup_artifact::Member;

    #[derive(Debug)]
    struct ReverseStrategy;

    impl GroupingStrategy for ReverseStrategy {
        fn partition(&self, mut members: Vec<Member>, _ctx: &MappingContext) -> Vec<Partition> {
            members.reverse();
            vec![Partition::unlabelled(members)]
        }

        fn mode(&self) -> GroupingMode {
            GroupingMode::Concatenate
        }

        fn name(&self) -> &'static str {
            "reverse"
        }
    }

    #[test]
    fn registry_new_empty() {
        let registry = StrategyRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn registry_with_defaults() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(registry.len(), 5);
        assert_eq!(
            registry.names(),
            vec!["concatenate", "split", "split_by_file", "overwrite", "merge"]
        );
    }

    #[test]
    fn registry_get_by_mode() {
        let registry = StrategyRegistry::with_defaults();
        for mode in GroupingMode::ALL {
            assert_eq!(registry.get(mode).unwrap().mode(), mode);
        }
    }

    #[test]
    fn registry_resolve_lenient_name() {
        let registry = StrategyRegistry::with_defaults();
        assert_eq!(
            registry.resolve("Split-By-File").unwrap().mode(),
            GroupingMode::SplitByFile
        );
        assert!(matches!(
            registry.resolve("nope"),
            Err(GroupingError::UnknownMode(_))
        ));
    }

    #[test]
    fn registry_custom_strategy() {
        let mut registry = StrategyRegistry::with_defaults();
        registry.register(Arc::new(ReverseStrategy));
        assert!(registry.contains("reverse"));
        assert_eq!(registry.resolve("reverse").unwrap().name(), "reverse");
    }

    #[test]
    fn registry_remove() {
        let mut registry = StrategyRegistry::with_defaults();
        assert!(registry.remove("merge"));
        assert!(!registry.contains("merge"));
        assert!(registry.get(GroupingMode::Merge).is_err());
    }
}
