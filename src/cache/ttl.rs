//! Bounded, time-expiring key/value store.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::cache::clock::{Clock, SystemClock};
use crate::config::CacheConfig;

/// Counters describing cache behavior over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatistics {
    /// Lookups that returned a value.
    pub hits: u64,
    /// Lookups that returned nothing.
    pub misses: u64,
    /// Values stored.
    pub insertions: u64,
    /// Live entries removed to stay within capacity.
    pub evictions: u64,
    /// Entries removed because their TTL elapsed.
    pub expirations: u64,
}

impl CacheStatistics {
    /// Fraction of lookups that hit, or 0.0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    /// `None` when the TTL is too large to represent; the entry never expires.
    expires_at: Option<Instant>,
    last_used: u64,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }
}

#[derive(Debug)]
struct CacheState<K, V> {
    entries: HashMap<K, Entry<V>>,
    tick: u64,
    statistics: CacheStatistics,
}

impl<K: Eq + Hash + Clone, V> CacheState<K, V> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        let purged = before - self.entries.len();
        self.statistics.expirations += purged as u64;
        purged
    }

    fn evict_least_recently_used(&mut self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());

        match oldest {
            Some(key) => {
                self.entries.remove(&key);
                self.statistics.evictions += 1;
                true
            }
            None => false,
        }
    }
}

/// A thread-safe cache whose entries expire after a TTL.
///
/// An entry is visible only while `now < inserted_at + ttl`. When an insert
/// pushes the cache over capacity, expired entries are purged first and then
/// least-recently-used entries are evicted until the cache fits. Recency is a
/// monotonic tick bumped by every hit and every insert, so the victim is
/// always well defined.
///
/// A capacity of zero (or a zero TTL) disables the cache: `put` is a no-op
/// and every `get` misses.
pub struct TtlCache<K, V> {
    capacity: usize,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState<K, V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache driven by the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache driven by `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            capacity: config.capacity,
            ttl: config.ttl,
            clock,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                tick: 0,
                statistics: CacheStatistics::default(),
            }),
        }
    }

    /// Maximum number of live entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Default entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a live entry, returning a copy of its value.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut state = self.lock();

        let expired = match state.entries.get(key) {
            Some(entry) => !entry.is_live(now),
            None => {
                state.statistics.misses += 1;
                return None;
            }
        };

        if expired {
            state.entries.remove(key);
            state.statistics.expirations += 1;
            state.statistics.misses += 1;
            return None;
        }

        let tick = state.next_tick();
        state.statistics.hits += 1;
        state.entries.get_mut(key).map(|entry| {
            entry.last_used = tick;
            entry.value.clone()
        })
    }

    /// Store a value with the default TTL.
    pub fn put(&self, key: K, value: V) {
        self.put_with_ttl(key, value, self.ttl);
    }

    /// Store a value with an explicit TTL, replacing any previous entry.
    pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        if self.capacity == 0 || ttl.is_zero() {
            return;
        }

        let now = self.clock.now();
        let mut state = self.lock();
        let tick = state.next_tick();

        state.entries.insert(
            key,
            Entry {
                value,
                expires_at: now.checked_add(ttl),
                last_used: tick,
            },
        );
        state.statistics.insertions += 1;

        if state.entries.len() > self.capacity {
            state.purge_expired(now);
        }
        while state.entries.len() > self.capacity {
            if !state.evict_least_recently_used() {
                break;
            }
        }
    }

    /// Number of entries that are still live.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.lock()
            .entries
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    /// Check whether no live entries remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        self.lock().purge_expired(now)
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Snapshot of the cache counters.
    pub fn statistics(&self) -> CacheStatistics {
        self.lock().statistics
    }
}

impl<K, V> std::fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use std::thread;

    fn cache(capacity: usize, ttl_secs: u64) -> (TtlCache<&'static str, u32>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = CacheConfig {
            capacity,
            ttl: Duration::from_secs(ttl_secs),
        };
        (TtlCache::with_clock(config, clock.clone()), clock)
    }

    #[test]
    fn test_get_missing_is_none() {
        let (cache, _) = cache(4, 10);
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.statistics().misses, 1);
    }

    #[test]
    fn test_put_then_get() {
        let (cache, _) = cache(4, 10);
        cache.put("a", 1);

        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.len(), 1);

        let stats = cache.statistics();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.insertions, 1);
    }

    #[test]
    fn test_entry_expires_at_ttl_boundary() {
        let (cache, clock) = cache(4, 10);
        cache.put("a", 1);

        clock.advance(Duration::from_millis(9_999));
        assert_eq!(cache.get(&"a"), Some(1));

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.statistics().expirations, 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_with_ttl_overrides_default() {
        let (cache, clock) = cache(4, 10);
        cache.put_with_ttl("short", 1, Duration::from_secs(1));
        cache.put("long", 2);

        clock.advance(Duration::from_secs(2));
        assert_eq!(cache.get(&"short"), None);
        assert_eq!(cache.get(&"long"), Some(2));
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let (cache, clock) = cache(4, 10);
        cache.put_with_ttl("forever", 1, Duration::MAX);

        clock.advance(Duration::from_secs(365 * 24 * 60 * 60));
        assert_eq!(cache.get(&"forever"), Some(1));
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_default_ttl_of_duration_max() {
        let cache = TtlCache::<u32, u32>::new(CacheConfig {
            capacity: 10,
            ttl: Duration::MAX,
        });
        cache.put(1, 1);
        assert_eq!(cache.get(&1), Some(1));
    }

    #[test]
    fn test_put_replaces_and_refreshes() {
        let (cache, clock) = cache(4, 10);
        cache.put("a", 1);
        clock.advance(Duration::from_secs(8));
        cache.put("a", 2);
        clock.advance(Duration::from_secs(8));

        assert_eq!(cache.get(&"a"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let (cache, _) = cache(2, 10);
        cache.put("a", 1);
        cache.put("b", 2);

        // Touch "a" so "b" becomes the oldest.
        assert_eq!(cache.get(&"a"), Some(1));
        cache.put("c", 3);

        assert_eq!(cache.get(&"b"), None);
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"c"), Some(3));
        assert_eq!(cache.statistics().evictions, 1);
    }

    #[test]
    fn test_expired_entries_go_before_live_ones() {
        let (cache, clock) = cache(2, 10);
        cache.put_with_ttl("stale", 1, Duration::from_secs(1));
        cache.put("fresh", 2);
        clock.advance(Duration::from_secs(2));

        cache.put("new", 3);

        let stats = cache.statistics();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.evictions, 0);
        assert_eq!(cache.get(&"fresh"), Some(2));
        assert_eq!(cache.get(&"new"), Some(3));
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let (cache, _) = cache(3, 10);
        for (i, key) in ["a", "b", "c", "d", "e", "f"].into_iter().enumerate() {
            cache.put(key, i as u32);
            assert!(cache.len() <= 3);
        }
        assert_eq!(cache.statistics().evictions, 3);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let (cache, _) = cache(0, 10);
        cache.put("a", 1);

        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.statistics().insertions, 0);
    }

    #[test]
    fn test_purge_and_clear() {
        let (cache, clock) = cache(4, 10);
        cache.put("a", 1);
        cache.put_with_ttl("b", 2, Duration::from_secs(20));
        clock.advance(Duration::from_secs(15));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hit_rate() {
        let (cache, _) = cache(4, 10);
        assert_eq!(cache.statistics().hit_rate(), 0.0);

        cache.put("a", 1);
        cache.get(&"a");
        cache.get(&"b");
        assert_eq!(cache.statistics().hit_rate(), 0.5);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(TtlCache::<u32, u32>::new(CacheConfig::default()));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..50 {
                        cache.put(i % 10, t);
                        cache.get(&(i % 10));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 10);
        let stats = cache.statistics();
        assert_eq!(stats.hits + stats.misses, 400);
    }
}
