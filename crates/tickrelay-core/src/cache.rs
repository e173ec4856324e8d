//! Bounded in-memory cache for upstream query results.
//!
//! Entries age out after a freshness window and the map is capped at a
//! fixed capacity with least-recently-used eviction. All eviction is lazy,
//! triggered on access; there is no background sweeper and no manual
//! invalidation API. The cache never returns errors: a malfunction
//! degrades to "always miss", never to serving wrong data.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use time::OffsetDateTime;

use crate::clock::Clock;

#[derive(Debug)]
struct CacheEntry<V> {
    value: Arc<V>,
    inserted_at: OffsetDateTime,
    /// LRU recency stamp; larger means more recently used.
    touched: u64,
}

#[derive(Debug)]
struct CacheInner<K, V> {
    map: HashMap<K, CacheEntry<V>>,
    tick: u64,
}

/// Thread-safe LRU cache with a freshness window and injected clock.
///
/// Callers receive `Arc` snapshots and never mutate cached data in place.
/// The interior lock is held only across lookup/insert; upstream fetches
/// happen outside it.
pub struct QueryCache<K, V> {
    inner: Mutex<CacheInner<K, V>>,
    capacity: usize,
    freshness: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn new(capacity: usize, freshness: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                tick: 0,
            }),
            capacity: capacity.max(1),
            freshness,
            clock,
        }
    }

    /// Look up a fresh entry, refreshing its LRU recency on hit.
    ///
    /// A stale entry behaves as a miss and is dropped on observation; it is
    /// superseded only by the next successful fetch.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let now = self.clock.now();
        let mut inner = self
            .inner
            .lock()
            .expect("cache lock should not be poisoned");

        let fresh = match inner.map.get(key) {
            Some(entry) => self.is_fresh(entry.inserted_at, now),
            None => return None,
        };

        if !fresh {
            inner.map.remove(key);
            return None;
        }

        inner.tick += 1;
        let tick = inner.tick;
        let entry = inner
            .map
            .get_mut(key)
            .expect("entry checked above still present under lock");
        entry.touched = tick;
        Some(Arc::clone(&entry.value))
    }

    /// Insert a value, evicting the least-recently-used entry at capacity.
    pub fn put(&self, key: K, value: Arc<V>) {
        let now = self.clock.now();
        let mut inner = self
            .inner
            .lock()
            .expect("cache lock should not be poisoned");

        if !inner.map.contains_key(&key) && inner.map.len() >= self.capacity {
            if let Some(oldest) = inner
                .map
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(k, _)| k.clone())
            {
                inner.map.remove(&oldest);
            }
        }

        inner.tick += 1;
        let touched = inner.tick;
        inner.map.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                touched,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("cache lock should not be poisoned")
            .map
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, inserted_at: OffsetDateTime, now: OffsetDateTime) -> bool {
        let age = now - inserted_at;
        age < self.freshness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use std::sync::Mutex as StdMutex;

    struct ManualClock {
        now: StdMutex<OffsetDateTime>,
    }

    impl ManualClock {
        fn starting_at(now: OffsetDateTime) -> Self {
            Self {
                now: StdMutex::new(now),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> OffsetDateTime {
            *self.now.lock().expect("clock lock")
        }
    }

    fn epoch() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH
    }

    #[test]
    fn miss_then_hit_roundtrip() {
        let cache: QueryCache<String, String> = QueryCache::new(
            4,
            Duration::from_secs(300),
            Arc::new(SystemClock),
        );

        assert!(cache.get(&"k".to_string()).is_none());
        cache.put("k".to_string(), Arc::new("v".to_string()));
        assert_eq!(cache.get(&"k".to_string()).as_deref(), Some(&"v".to_string()));
    }

    #[test]
    fn entry_goes_stale_after_freshness_window() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let cache: QueryCache<&str, u32> =
            QueryCache::new(4, Duration::from_secs(300), Arc::clone(&clock) as Arc<dyn Clock>);

        cache.put("k", Arc::new(7));
        clock.advance(Duration::from_secs(299));
        assert!(cache.get(&"k").is_some());

        clock.advance(Duration::from_secs(2));
        assert!(cache.get(&"k").is_none(), "stale entry must read as a miss");
        assert!(cache.is_empty(), "stale entry is dropped on observation");
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache: QueryCache<&str, u32> = QueryCache::new(
            2,
            Duration::from_secs(300),
            Arc::new(SystemClock),
        );

        cache.put("a", Arc::new(1));
        cache.put("b", Arc::new(2));
        // Touch "a" so "b" becomes the LRU entry.
        assert!(cache.get(&"a").is_some());

        cache.put("c", Arc::new(3));
        assert!(cache.get(&"b").is_none(), "LRU entry must be evicted");
        assert!(cache.get(&"a").is_some());
        assert!(cache.get(&"c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn overwrite_does_not_evict_other_keys() {
        let cache: QueryCache<&str, u32> = QueryCache::new(
            2,
            Duration::from_secs(300),
            Arc::new(SystemClock),
        );

        cache.put("a", Arc::new(1));
        cache.put("b", Arc::new(2));
        cache.put("a", Arc::new(10));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a").as_deref(), Some(&10));
        assert_eq!(cache.get(&"b").as_deref(), Some(&2));
    }

    #[test]
    fn fresh_refetch_supersedes_stale_entry() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let cache: QueryCache<&str, u32> =
            QueryCache::new(4, Duration::from_secs(60), Arc::clone(&clock) as Arc<dyn Clock>);

        cache.put("k", Arc::new(1));
        clock.advance(Duration::from_secs(120));
        assert!(cache.get(&"k").is_none());

        cache.put("k", Arc::new(2));
        assert_eq!(cache.get(&"k").as_deref(), Some(&2));
    }
}
