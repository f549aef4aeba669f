//! Memoized range resolution
//!
//! Resolves the highest version in a registered list that satisfies a range,
//! remembering every answer. The cache key is the exact ordered version list
//! plus the range text, so the same set of versions in a different order is a
//! different entry.

use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::config::ResolverConfig;
use crate::version::matcher::{RangeMatcher, RangeSyntax};

static GLOBAL: LazyLock<VersionResolver> =
    LazyLock::new(|| VersionResolver::new(RangeSyntax::default().matcher()));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    versions: Vec<String>,
    range: String,
}

pub struct VersionResolver {
    matcher: Box<dyn RangeMatcher>,
    cache: Mutex<IndexMap<CacheKey, Option<String>>>,
    capacity: Option<usize>,
}

impl VersionResolver {
    /// Create a resolver with an unbounded cache
    pub fn new(matcher: Box<dyn RangeMatcher>) -> Self {
        Self {
            matcher,
            cache: Mutex::new(IndexMap::new()),
            capacity: None,
        }
    }

    /// Bound the cache; the oldest entry is evicted once `capacity` is reached
    pub fn with_capacity_limit(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn from_config(config: &ResolverConfig) -> Self {
        let resolver = Self::new(config.syntax.matcher());
        match config.cache_capacity {
            Some(capacity) => resolver.with_capacity_limit(capacity),
            None => resolver,
        }
    }

    /// Process-wide resolver shared by every caller of [`crate::find`]
    ///
    /// Uses npm range syntax and never evicts.
    pub fn global() -> &'static VersionResolver {
        &GLOBAL
    }

    pub fn syntax(&self) -> RangeSyntax {
        self.matcher.syntax()
    }

    /// The cache only ever holds plain data, so a poisoned lock is still usable
    fn lock_cache(&self) -> MutexGuard<'_, IndexMap<CacheKey, Option<String>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Highest entry of `versions` satisfying `range`, or `None`
    pub fn max_satisfying(&self, versions: &[String], range: &str) -> Option<String> {
        let key = CacheKey {
            versions: versions.to_vec(),
            range: range.to_string(),
        };

        if let Some(cached) = self.lock_cache().get(&key) {
            trace!("Cache hit for range {:?} over {:?}", range, versions);
            return cached.clone();
        }

        let resolved = self.matcher.max_satisfying(versions, range);
        debug!(
            "Resolved range {:?} over {:?} to {:?} ({})",
            range,
            versions,
            resolved,
            self.syntax().as_str()
        );

        let mut cache = self.lock_cache();
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                return resolved;
            }
            while cache.len() >= capacity {
                cache.shift_remove_index(0);
            }
        }
        cache.entry(key).or_insert_with(|| resolved.clone());

        resolved
    }

    pub fn len(&self) -> usize {
        self.lock_cache().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_cache().is_empty()
    }

    pub fn clear(&self) {
        self.lock_cache().clear();
    }
}

impl std::fmt::Debug for VersionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionResolver")
            .field("syntax", &self.syntax())
            .field("entries", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}
