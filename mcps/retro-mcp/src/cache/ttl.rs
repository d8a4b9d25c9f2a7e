//! Generic time-to-live cache with hit/miss tracking

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;

/// A value stored with the moment it was written and its freshness window
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    data: V,
    timestamp: Instant,
    ttl_seconds: u64,
}

impl<V> CacheEntry<V> {
    pub fn new(data: V, ttl_seconds: u64) -> Self {
        Self {
            data,
            timestamp: Instant::now(),
            ttl_seconds,
        }
    }

    pub fn data(&self) -> &V {
        &self.data
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn age(&self) -> Duration {
        self.timestamp.elapsed()
    }

    /// A zero TTL is expired from the moment it is written.
    pub fn is_expired(&self) -> bool {
        if self.ttl_seconds == 0 {
            return true;
        }
        match self
            .timestamp
            .checked_add(Duration::from_secs(self.ttl_seconds))
        {
            Some(expiry) => Instant::now() > expiry,
            None => false,
        }
    }
}

/// How a key stands in the cache
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<V> {
    Fresh(V),
    /// Present but past its TTL
    Stale(V),
    Absent,
}

impl<V> Lookup<V> {
    /// The value regardless of freshness
    pub fn into_value(self) -> Option<V> {
        match self {
            Lookup::Fresh(v) | Lookup::Stale(v) => Some(v),
            Lookup::Absent => None,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Lookup::Fresh(_))
    }

    pub(crate) fn and_then<U>(self, f: impl FnOnce(V) -> Option<U>) -> Lookup<U> {
        match self {
            Lookup::Fresh(v) => f(v).map_or(Lookup::Absent, Lookup::Fresh),
            Lookup::Stale(v) => f(v).map_or(Lookup::Absent, Lookup::Stale),
            Lookup::Absent => Lookup::Absent,
        }
    }
}

/// Cache statistics, cumulative since the last `clear()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

struct CacheState<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    hits: u64,
    misses: u64,
}

/// Keyed store whose entries expire after a per-entry TTL
///
/// One mutex guards the table and the hit/miss counters together.
pub struct TtlCache<K, V> {
    state: Mutex<CacheState<K, V>>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
        }
    }
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh value for `key`. Expired entries count as a miss and are evicted.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.state.lock();
        let expired = match state.entries.get(key) {
            None => {
                state.misses += 1;
                return None;
            }
            Some(entry) if !entry.is_expired() => {
                let data = entry.data().clone();
                state.hits += 1;
                return Some(data);
            }
            Some(_) => true,
        };

        if expired {
            state.entries.remove(key);
        }
        state.misses += 1;
        None
    }

    /// Classify `key` without evicting it
    ///
    /// Counts a hit for a fresh entry and a miss otherwise. Stale values
    /// stay in place so a caller that cannot refresh them can still
    /// serve them.
    pub fn lookup(&self, key: &K) -> Lookup<V> {
        let mut state = self.state.lock();
        let lookup = match state.entries.get(key) {
            Some(entry) if entry.is_expired() => Lookup::Stale(entry.data().clone()),
            Some(entry) => Lookup::Fresh(entry.data().clone()),
            None => Lookup::Absent,
        };

        if lookup.is_fresh() {
            state.hits += 1;
        } else {
            state.misses += 1;
        }
        lookup
    }

    /// Insert or replace the entry for `key`
    pub fn set(&self, key: K, value: V, ttl_seconds: u64) {
        let entry = CacheEntry::new(value, ttl_seconds);
        self.state.lock().entries.insert(key, entry);
    }

    /// Like `get` but leaves the hit/miss counters alone
    pub fn has(&self, key: &K) -> bool {
        let mut state = self.state.lock();
        match state.entries.get(key).map(CacheEntry::is_expired) {
            Some(false) => true,
            Some(true) => {
                state.entries.remove(key);
                false
            }
            None => false,
        }
    }

    pub fn invalidate(&self, key: &K) {
        self.state.lock().entries.remove(key);
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.hits = 0;
        state.misses = 0;
    }

    /// Evict every expired entry, returning how many were removed
    pub fn cleanup(&self) -> usize {
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired());
        before - state.entries.len()
    }

    pub fn get_stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entries: state.entries.len(),
        }
    }
}
