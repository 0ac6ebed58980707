//! TTL and capacity bounded cache of first result pages

use crate::github::SearchResultItem;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Raw (pre-filter) results cached for one query
#[derive(Debug, Clone)]
pub struct CachedPage {
    /// Cached query text
    pub key: String,

    /// Items exactly as the API returned them
    pub items: Arc<Vec<SearchResultItem>>,

    /// Total count reported by the API
    pub total_count: u64,

    /// When this entry was stored
    pub inserted_at: Instant,
}

struct Slot {
    page: CachedPage,
    /// Recency stamp; larger is more recent
    stamp: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, Slot>,
    /// Recency stamp -> key, oldest first
    recency: BTreeMap<u64, String>,
    next_stamp: u64,
}

impl CacheState {
    fn touch(&mut self, key: &str) {
        let stamp = self.next_stamp;
        if let Some(slot) = self.entries.get_mut(key) {
            self.recency.remove(&slot.stamp);
            slot.stamp = stamp;
            self.recency.insert(stamp, key.to_string());
            self.next_stamp += 1;
        }
    }

    fn remove(&mut self, key: &str) -> Option<Slot> {
        let slot = self.entries.remove(key)?;
        self.recency.remove(&slot.stamp);
        Some(slot)
    }

    fn evict_least_recent(&mut self) -> Option<String> {
        let (_, key) = self.recency.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// Query-keyed LRU cache with lazy TTL expiry.
///
/// Shared across all searches; every operation completes inside a single
/// critical section so capacity and recency order stay consistent.
pub struct ResultCache {
    state: Mutex<CacheState>,
    ttl: Duration,
    capacity: usize,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` queries for `ttl` each
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a query; expired entries are dropped and reported as misses
    pub fn get(&self, key: &str) -> Option<CachedPage> {
        let mut state = self.lock();

        let expired = match state.entries.get(key) {
            None => return None,
            Some(slot) => slot.page.inserted_at.elapsed() >= self.ttl,
        };

        if expired {
            debug!("Cache entry for {:?} expired", key);
            state.remove(key);
            return None;
        }

        state.touch(key);
        state.entries.get(key).map(|slot| slot.page.clone())
    }

    /// Store the raw first page for a query
    pub fn set(
        &self,
        key: impl Into<String>,
        items: Arc<Vec<SearchResultItem>>,
        total_count: u64,
    ) -> CachedPage {
        let key = key.into();
        let page = CachedPage {
            key: key.clone(),
            items,
            total_count,
            inserted_at: Instant::now(),
        };

        let mut state = self.lock();
        state.remove(&key);

        while state.entries.len() >= self.capacity {
            match state.evict_least_recent() {
                Some(evicted) => debug!("Evicted cache entry for {:?}", evicted),
                None => break,
            }
        }

        let stamp = state.next_stamp;
        state.next_stamp += 1;
        state.recency.insert(stamp, key.clone());
        state.entries.insert(
            key,
            Slot {
                page: page.clone(),
                stamp,
            },
        );

        page
    }

    /// Drop every entry
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.recency.clear();
    }

    /// Number of entries currently held, expired or not
    pub fn size(&self) -> usize {
        self.lock().entries.len()
    }
}
