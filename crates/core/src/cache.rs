//! Content-addressed memo of per-agent results, bounded by LRU eviction.
//! Only successful outcomes are stored, so a transient gateway fault is
//! never memoized.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use sha2::{Digest, Sha256};

use quorum_provider::Issue;

/// Stable key over everything that determines an agent's output.
pub fn cache_key(file_path: &str, code: &str, diff: &str, agent_name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_path.as_bytes());
    hasher.update(b"||");
    hasher.update(code.as_bytes());
    hasher.update(b"||");
    hasher.update(diff.as_bytes());
    hasher.update(b"||");
    hasher.update(agent_name.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub issues: Vec<Issue>,
    /// Wall time of the original computation, in seconds.
    pub execution_time: f64,
}

struct LruInner {
    capacity: usize,
    entries: HashMap<String, CacheEntry>,
    /// Keys ordered least- to most-recently used.
    recency: VecDeque<String>,
}

/// Process-wide LRU shared across concurrent agent tasks. Lookups and
/// inserts each take the lock once, so recency updates and insert+evict
/// are atomic; duplicate computes on the same key are allowed and the
/// later insert simply wins.
#[derive(Clone)]
pub struct ResultCache {
    inner: Arc<Mutex<LruInner>>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LruInner {
                capacity: capacity.max(1),
                entries: HashMap::new(),
                recency: VecDeque::new(),
            })),
        }
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        let Ok(mut inner) = self.inner.lock() else {
            return None;
        };
        let entry = inner.entries.get(key).cloned()?;
        if let Some(pos) = inner.recency.iter().position(|k| k == key) {
            inner.recency.remove(pos);
        }
        inner.recency.push_back(key.to_string());
        Some(entry)
    }

    pub fn insert(&self, key: String, entry: CacheEntry) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        if inner.entries.insert(key.clone(), entry).is_some() {
            if let Some(pos) = inner.recency.iter().position(|k| *k == key) {
                inner.recency.remove(pos);
            }
        }
        inner.recency.push_back(key);
        while inner.entries.len() > inner.capacity {
            let Some(evicted) = inner.recency.pop_front() else {
                break;
            };
            inner.entries.remove(&evicted);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.clear();
            inner.recency.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_provider::{IssueKind, Severity};

    fn entry(description: &str) -> CacheEntry {
        CacheEntry {
            issues: vec![Issue::new(IssueKind::Quality, Severity::Low, description)],
            execution_time: 0.42,
        }
    }

    #[test]
    fn key_is_stable_and_input_sensitive() {
        let a = cache_key("src/app.py", "code", "diff", "security");
        let b = cache_key("src/app.py", "code", "diff", "security");
        assert_eq!(a, b);
        assert_ne!(a, cache_key("src/app.py", "code", "diff", "quality"));
        assert_ne!(a, cache_key("src/app.py", "code2", "diff", "security"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hit_returns_stored_entry() {
        let cache = ResultCache::new(4);
        let key = cache_key("a.py", "c", "d", "security");
        assert!(cache.get(&key).is_none());
        cache.insert(key.clone(), entry("stored"));
        let hit = cache.get(&key).unwrap();
        assert_eq!(hit.issues[0].description, "stored");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = ResultCache::new(2);
        cache.insert("k1".into(), entry("one"));
        cache.insert("k2".into(), entry("two"));
        // Touch k1 so k2 becomes the eviction candidate.
        assert!(cache.get("k1").is_some());
        cache.insert("k3".into(), entry("three"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("k1").is_some());
        assert!(cache.get("k2").is_none());
        assert!(cache.get("k3").is_some());
    }

    #[test]
    fn reinsert_updates_value_without_growth() {
        let cache = ResultCache::new(2);
        cache.insert("k1".into(), entry("old"));
        cache.insert("k1".into(), entry("new"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k1").unwrap().issues[0].description, "new");
    }

    #[test]
    fn clear_empties_everything() {
        let cache = ResultCache::new(8);
        cache.insert("k1".into(), entry("one"));
        cache.insert("k2".into(), entry("two"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("k1").is_none());
    }

    #[test]
    fn concurrent_writers_never_lose_the_map() {
        let cache = ResultCache::new(64);
        let mut handles = Vec::new();
        for t in 0..8 {
            let cache = cache.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    let key = format!("k{}-{}", t, i);
                    cache.insert(key.clone(), entry("x"));
                    let _ = cache.get(&key);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 64);
    }
}
