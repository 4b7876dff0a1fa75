// src/cache/content.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::debug;

use super::fingerprint::Fingerprint;

/// Lookup failures for [`ContentCache::get`].
///
/// A miss here means some upstream stage referenced a file that was never
/// cached, so callers are expected to surface it instead of recovering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("no existing cache for \"{0}\"")]
    NamespaceNotFound(String),

    #[error("no entry for {key:?} in the cache \"{namespace}\"")]
    KeyNotFound { namespace: String, key: PathBuf },
}

/// Last observed state of one file within a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry<P> {
    pub fingerprint: Fingerprint,
    pub payload: P,
}

type Namespaces<P> = HashMap<String, HashMap<PathBuf, CacheEntry<P>>>;

/// Namespaced map of file path -> [`CacheEntry`].
///
/// Every operation takes the same mutex, so a `put` is never observed half
/// written and a concurrent `is_unchanged` cannot read a stale fingerprint
/// after the `put` returned.
#[derive(Debug)]
pub struct ContentCache<P> {
    namespaces: Mutex<Namespaces<P>>,
}

impl<P> Default for ContentCache<P> {
    fn default() -> Self {
        Self {
            namespaces: Mutex::new(HashMap::new()),
        }
    }
}

impl<P: Clone> ContentCache<P> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Namespaces<P>> {
        // A panic while holding the lock cannot leave an entry half written
        // (inserts are single map operations), so the data is still usable.
        self.namespaces
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert or overwrite the entry for `key` in `namespace`.
    pub fn put(&self, namespace: &str, key: &Path, fingerprint: Fingerprint, payload: P) {
        let mut namespaces = self.lock();
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_path_buf(), CacheEntry { fingerprint, payload });
    }

    /// Fetch a previously stored entry.
    pub fn get(&self, namespace: &str, key: &Path) -> Result<CacheEntry<P>, CacheError> {
        let namespaces = self.lock();
        let entries = namespaces
            .get(namespace)
            .ok_or_else(|| CacheError::NamespaceNotFound(namespace.to_string()))?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| CacheError::KeyNotFound {
                namespace: namespace.to_string(),
                key: key.to_path_buf(),
            })
    }

    /// True iff an entry exists for `key` and its fingerprint equals
    /// `fingerprint` exactly. A miss is reported as "changed".
    pub fn is_unchanged(&self, namespace: &str, key: &Path, fingerprint: &str) -> bool {
        let namespaces = self.lock();
        namespaces
            .get(namespace)
            .and_then(|entries| entries.get(key))
            .is_some_and(|entry| entry.fingerprint == fingerprint)
    }

    /// Compare and store in one critical section.
    ///
    /// Returns `true` when the file is new or its fingerprint differs (the
    /// entry is then replaced), `false` when it is unchanged (the entry is
    /// left as is).
    pub fn observe(&self, namespace: &str, key: &Path, fingerprint: Fingerprint, payload: P) -> bool {
        let mut namespaces = self.lock();
        let entries = namespaces.entry(namespace.to_string()).or_default();

        if entries
            .get(key)
            .is_some_and(|entry| entry.fingerprint == fingerprint)
        {
            debug!(namespace, ?key, "file has not changed");
            return false;
        }

        debug!(namespace, ?key, "file has changed");
        entries.insert(key.to_path_buf(), CacheEntry { fingerprint, payload });
        true
    }

    /// Whether a namespace has been created by a write.
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.lock().contains_key(namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn put_then_is_unchanged_matches_exact_fingerprint_only() {
        let cache = ContentCache::new();
        cache.put("styles", &key("/s/a.scss"), "f1".into(), 1u32);

        assert!(cache.is_unchanged("styles", &key("/s/a.scss"), "f1"));
        assert!(!cache.is_unchanged("styles", &key("/s/a.scss"), "f2"));
        assert!(!cache.is_unchanged("styles", &key("/s/a.scss"), "F1"));
    }

    #[test]
    fn namespaces_are_isolated() {
        let cache = ContentCache::new();
        cache.put("a", &key("x"), "f".into(), ());

        assert_eq!(
            cache.get("b", &key("x")),
            Err(CacheError::NamespaceNotFound("b".into()))
        );
        assert!(!cache.is_unchanged("b", &key("x"), "f"));
    }

    #[test]
    fn unknown_key_in_known_namespace_is_reported_separately() {
        let cache = ContentCache::new();
        cache.put("a", &key("x"), "f".into(), ());

        match cache.get("a", &key("y")) {
            Err(CacheError::KeyNotFound { namespace, key }) => {
                assert_eq!(namespace, "a");
                assert_eq!(key, PathBuf::from("y"));
            }
            other => panic!("expected KeyNotFound, got {other:?}"),
        }
    }

    #[test]
    fn put_is_idempotent_and_overwrites_on_new_fingerprint() {
        let cache = ContentCache::new();
        cache.put("ns", &key("k"), "old".into(), "v1");
        cache.put("ns", &key("k"), "old".into(), "v1");
        assert!(cache.is_unchanged("ns", &key("k"), "old"));

        cache.put("ns", &key("k"), "new".into(), "v2");
        assert!(!cache.is_unchanged("ns", &key("k"), "old"));
        assert!(cache.is_unchanged("ns", &key("k"), "new"));
        assert_eq!(cache.get("ns", &key("k")).unwrap().payload, "v2");
    }

    #[test]
    fn observe_reports_changes_and_keeps_entry_on_hit() {
        let cache = ContentCache::new();
        assert!(cache.observe("lint", &key("a.js"), "h1".into(), "first"));
        assert!(!cache.observe("lint", &key("a.js"), "h1".into(), "second"));
        // A hit does not replace the stored payload.
        assert_eq!(cache.get("lint", &key("a.js")).unwrap().payload, "first");

        assert!(cache.observe("lint", &key("a.js"), "h2".into(), "third"));
        assert_eq!(cache.get("lint", &key("a.js")).unwrap().payload, "third");
    }

    #[test]
    fn namespace_exists_only_after_first_write() {
        let cache: ContentCache<()> = ContentCache::new();
        assert!(!cache.has_namespace("styles-build"));
        cache.observe("styles-build", &key("a"), "f".into(), ());
        assert!(cache.has_namespace("styles-build"));
    }

    #[test]
    fn concurrent_puts_are_all_visible() {
        use std::sync::Arc;
        use std::thread;

        let cache = Arc::new(ContentCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let k = PathBuf::from(format!("/f{i}"));
                    cache.put("ns", &k, format!("fp{i}"), i);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        for i in 0..8 {
            let k = PathBuf::from(format!("/f{i}"));
            assert!(cache.is_unchanged("ns", &k, &format!("fp{i}")));
        }
    }
}
