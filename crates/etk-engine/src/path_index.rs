//! Process-wide cache of compiled path queries

use crate::error::PathError;
use crate::path::CompiledPath;
use crate::segment::Segment;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

type CompileResult = Result<Arc<CompiledPath>, PathError>;

/// Compiles path queries once and shares them
///
/// Failed compilations are cached too, so an invalid query fails the same
/// way on every call and is logged only the first time. Two threads racing
/// on a new query may both compile it; the first insert wins and both
/// results are equivalent.
#[derive(Debug, Default)]
pub struct PathIndex {
    cache: RwLock<HashMap<String, CompileResult>>,
}

impl PathIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `query`, or return the cached result
    pub fn compile(&self, query: &str) -> Result<Arc<CompiledPath>, PathError> {
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(query)
        {
            return cached.clone();
        }

        let compiled = CompiledPath::parse(query).map(Arc::new);

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        match cache.entry(query.to_string()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => {
                match &compiled {
                    Ok(_) => debug!("Compiled path {:?}", query),
                    Err(e) => warn!("{}", e),
                }
                slot.insert(compiled).clone()
            }
        }
    }

    /// Resolve `query` against `tree`, in document order
    pub fn resolve(&self, query: &str, tree: &Value) -> Result<Vec<Segment>, PathError> {
        let path = self.compile(query)?;
        Ok(path
            .resolve(tree)
            .into_iter()
            .map(|(location, value)| Segment::new(query, location, value.clone()))
            .collect())
    }

    /// True when `query` has been compiled before (successfully or not)
    pub fn contains(&self, query: &str) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(query)
    }

    /// Number of cached queries
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when nothing has been compiled yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_is_cached_by_string() {
        let index = PathIndex::new();
        let a = index.compile("projects[*].name").unwrap();
        let b = index.compile("projects[*].name").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_equivalent_strings_are_distinct_entries() {
        let index = PathIndex::new();
        index.compile("$.a").unwrap();
        index.compile("a").unwrap();
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_invalid_path_fails_every_time() {
        let index = PathIndex::new();
        let first = index.compile("projects[").unwrap_err();
        let second = index.compile("projects[").unwrap_err();
        assert_eq!(first, second);
        assert!(index.contains("projects["));
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let index = PathIndex::new();
        let tree = json!({"a": [{"b": 1}, {"b": 2}, {"c": 3}]});
        let first = index.resolve("a[*].b", &tree).unwrap();
        let second = index.resolve("a[*].b", &tree).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].path(), "a[1].b");
    }

    #[test]
    fn test_concurrent_compiles_agree() {
        let index = PathIndex::new();
        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| index.compile("$..members[*]").unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(index.len(), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// Property: resolving twice gives identical ordered results
        #[test]
        fn test_resolve_deterministic(query in "[a-c$.\\[\\]*0-2-]{1,8}") {
            let index = PathIndex::new();
            let tree = json!({
                "a": [{"b": 1, "c": [2, 3]}, {"b": 4}],
                "b": {"a": {"c": 5}},
                "c": "text"
            });
            let first = index.resolve(&query, &tree);
            let second = index.resolve(&query, &tree);
            prop_assert_eq!(first, second);
        }
    }
}
