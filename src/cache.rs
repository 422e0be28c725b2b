//! Time-bounded read-through cache
//! Pure memoization keyed by a caller-supplied string. Entries expire
//! after the configured window; there is no other invalidation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub struct TtlCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, T)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh value for `key`, or None when absent or expired.
    pub fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        entries.get(key).and_then(|(stored, value)| {
            if stored.elapsed() < self.ttl {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    pub fn insert(&self, key: &str, value: T) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(key.to_string(), (Instant::now(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_fresh_entries() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("dataset", 7);
        assert_eq!(cache.get("dataset"), Some(7));
        assert_eq!(cache.get("other"), None);
    }

    #[test]
    fn expires_after_ttl() {
        let cache = TtlCache::new(Duration::from_millis(10));
        cache.insert("dataset", 7);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get("dataset"), None);
    }

    #[test]
    fn insert_refreshes_the_clock() {
        let cache = TtlCache::new(Duration::from_millis(50));
        cache.insert("dataset", 1);
        cache.insert("dataset", 2);
        assert_eq!(cache.get("dataset"), Some(2));
    }
}
