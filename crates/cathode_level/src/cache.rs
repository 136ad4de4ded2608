//! Index-keyed memo caches for resolved objects

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Memoizes resolved values by a stable table key
///
/// The first value stored for a key is kept; concurrent resolvers of the
/// same key all receive that `Arc`.
pub struct IndexCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash + Copy, V> IndexCache<K, V> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get a cached value
    pub fn get(&self, key: K) -> Option<Arc<V>> {
        self.entries.read().get(&key).cloned()
    }

    /// Get a cached value or compute and store it
    ///
    /// Errors are returned without being cached.
    pub fn get_or_try_insert<E>(&self, key: K, compute: impl FnOnce() -> Result<V, E>) -> Result<Arc<V>, E> {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let value = compute()?;
        let mut entries = self.entries.write();
        Ok(entries.entry(key).or_insert_with(|| Arc::new(value)).clone())
    }

    /// Number of cached values
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K: Eq + Hash + Copy, V> Default for IndexCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memoizes_first_value() {
        let cache: IndexCache<i32, String> = IndexCache::new();
        let a = cache.get_or_try_insert::<()>(1, || Ok("one".into())).unwrap();
        let b = cache.get_or_try_insert::<()>(1, || Ok("other".into())).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, "one");

        assert!(cache.get_or_try_insert(2, || Err("nope")).is_err());
        assert_eq!(cache.len(), 1);
        assert!(cache.get(2).is_none());
        assert!(!cache.is_empty());
    }
}
