//! Bounded, expiring cache for resolution results.
//!
//! [`RefCache`] keeps at most `capacity` entries, each for at most `ttl`.
//! Expired entries are dropped when they are looked up and before every
//! insert; on overflow the least recently used entry is evicted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Default number of repositories kept.
pub const DEFAULT_CAPACITY: usize = 100;

/// Default lifetime of a cached result.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
    last_used: u64,
}

#[derive(Debug)]
struct State<V> {
    entries: HashMap<String, Entry<V>>,
    tick: u64,
}

impl<V> State<V> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// A thread-safe LRU cache with per-entry expiry.
#[derive(Debug)]
pub struct RefCache<V> {
    capacity: usize,
    ttl: Duration,
    state: Mutex<State<V>>,
}

impl<V: Clone> RefCache<V> {
    /// Create a cache. A capacity of zero disables caching.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity,
            ttl,
            state: Mutex::new(State {
                entries: HashMap::new(),
                tick: 0,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, State<V>> {
        // Entries are replaced wholesale, so a poisoned map is still coherent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.duration_since(entry.inserted_at) >= self.ttl
    }

    /// Fetch a live entry and mark it as most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut state = self.lock();
        let expired = self.is_expired(state.entries.get(key)?, now);
        if expired {
            trace!(key, "cache entry expired");
            state.entries.remove(key);
            return None;
        }
        let tick = state.next_tick();
        let entry = state.entries.get_mut(key)?;
        entry.last_used = tick;
        Some(entry.value.clone())
    }

    /// Insert or replace an entry, evicting as needed.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        if self.capacity == 0 {
            return;
        }
        let now = Instant::now();
        let mut state = self.lock();
        state.entries.retain(|_, e| now.duration_since(e.inserted_at) < self.ttl);

        let tick = state.next_tick();
        state.entries.insert(
            key.into(),
            Entry {
                value,
                inserted_at: now,
                last_used: tick,
            },
        );

        while state.entries.len() > self.capacity {
            let Some(oldest) = state
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            trace!(key = %oldest, "evicting least recently used cache entry");
            state.entries.remove(&oldest);
        }
    }

    /// Remove one entry. Returns `true` if it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Number of stored entries, including any not yet purged after expiry.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for RefCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
