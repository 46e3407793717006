//! A process-wide store for coefficient tables that are expensive to build
//! and never change once built.

use core::fmt::Debug;
use core::hash::Hash;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// An append-only map from a structural parameter (a degree, an interval
/// index) to a shared immutable table.
///
/// Tables are built outside of the lock. When two threads miss on the same
/// key they both build, the first one to publish wins, and the other one
/// drops its copy and returns the published table. Readers only ever see
/// complete tables.
pub(crate) struct TableCache<K, V> {
    name: &'static str,
    tables: RwLock<HashMap<K, Arc<V>>>,
}

impl<K: Copy + Eq + Hash + Debug, V> TableCache<K, V> {
    /// Create an empty cache. `name` identifies the cache in log messages.
    pub fn new(name: &'static str) -> Self {
        TableCache {
            name,
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the table for `key` if it was already published.
    pub fn get(&self, key: K) -> Option<Arc<V>> {
        self.tables.read().get(&key).cloned()
    }

    /// Returns the table for `key`, building and publishing it on a miss.
    /// A builder error is returned to the caller and nothing is published.
    pub fn get_or_try_build<E>(
        &self,
        key: K,
        build: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E> {
        if let Some(table) = self.get(key) {
            return Ok(table);
        }

        let table = Arc::new(build()?);
        let mut tables = self.tables.write();
        let published = tables.entry(key).or_insert_with(|| {
            log::trace!("{}: published table for {:?}", self.name, key);
            table
        });
        Ok(Arc::clone(published))
    }

    /// Same as `get_or_try_build`, for builders that can't fail.
    pub fn get_or_build(&self, key: K, build: impl FnOnce() -> V) -> Arc<V> {
        let res: Result<Arc<V>, core::convert::Infallible> =
            self.get_or_try_build(key, || Ok(build()));
        match res {
            Ok(table) => table,
            Err(never) => match never {},
        }
    }

    /// Returns the number of published tables.
    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }
}

#[test]
fn test_cache_builds_once() {
    use core::sync::atomic::{AtomicUsize, Ordering};

    let cache: TableCache<u32, Vec<u32>> = TableCache::new("test");
    let builds = AtomicUsize::new(0);
    let build = |n: u32| {
        builds.fetch_add(1, Ordering::SeqCst);
        (0..n).collect::<Vec<u32>>()
    };

    assert!(cache.get(3).is_none());
    let a = cache.get_or_build(3, || build(3));
    let b = cache.get_or_build(3, || build(3));
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(*a, vec![0, 1, 2]);
    assert_eq!(builds.load(Ordering::SeqCst), 1);

    let c = cache.get_or_build(5, || build(5));
    assert_eq!(c.len(), 5);
    assert_eq!(cache.len(), 2);

    // Failed builds publish nothing.
    let err: Result<_, &str> = cache.get_or_try_build(7, || Err("bad"));
    assert_eq!(err.unwrap_err(), "bad");
    assert!(cache.get(7).is_none());
}

#[test]
fn test_cache_concurrent_publication() {
    let cache: TableCache<u32, Vec<u64>> = TableCache::new("race");
    let tables: Vec<Arc<Vec<u64>>> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| cache.get_or_build(42, || vec![42; 1000])))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Every thread observes the single published table.
    let published = cache.get(42).unwrap();
    for t in &tables {
        assert!(Arc::ptr_eq(t, &published));
        assert_eq!(t.len(), 1000);
    }
    assert_eq!(cache.len(), 1);
}
