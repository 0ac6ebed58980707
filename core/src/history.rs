//! Recently executed queries and popular-query ranking

use crate::error::Result;
use crate::storage::{LocalStore, HISTORY_KEY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Maximum number of history entries kept
pub const MAX_HISTORY_ITEMS: usize = 10;

/// Number of queries returned by [`SearchHistoryStore::popular_queries`]
pub const POPULAR_QUERY_LIMIT: usize = 5;

/// Qualifiers recorded alongside a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A single history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryItem {
    pub query: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<HistoryFilters>,
}

/// Newest-first, deduplicated list of executed queries.
///
/// Shared between the orchestrator and the front end, so all access goes
/// through an internal lock.
#[derive(Debug)]
pub struct SearchHistoryStore {
    entries: Mutex<Vec<SearchHistoryItem>>,
    max_items: usize,
}

impl SearchHistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_ITEMS)
    }

    pub fn with_capacity(max_items: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            max_items,
        }
    }

    /// Restore history from the local store
    pub fn from_store(store: &LocalStore) -> Self {
        let history = Self::new();
        let mut entries: Vec<SearchHistoryItem> =
            store.get(HISTORY_KEY).ok().flatten().unwrap_or_default();
        entries.truncate(history.max_items);
        debug!("Loaded {} history entries", entries.len());
        *history.lock() = entries;
        history
    }

    /// Write history into the local store
    pub fn save_to(&self, store: &mut LocalStore) -> Result<()> {
        store.set(HISTORY_KEY, &self.entries())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SearchHistoryItem>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a query, moving an existing entry to the front.
    /// Returns false for blank queries.
    pub fn add(&self, query: &str, filters: Option<HistoryFilters>) -> bool {
        if query.trim().is_empty() {
            return false;
        }

        let mut entries = self.lock();
        entries.retain(|item| item.query != query);
        entries.insert(
            0,
            SearchHistoryItem {
                query: query.to_string(),
                timestamp: chrono::Utc::now().timestamp_millis(),
                filters,
            },
        );
        entries.truncate(self.max_items);
        true
    }

    /// Remove every entry for a query
    pub fn remove(&self, query: &str) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|item| item.query != query);
        entries.len() != before
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Snapshot of the entries, newest first
    pub fn entries(&self) -> Vec<SearchHistoryItem> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Most frequent queries, ties broken by recency.
    ///
    /// Counts come from the retained entries only. Because `add` keeps one
    /// entry per query, every count is currently 1 and the ranking reduces
    /// to recency order.
    pub fn popular_queries(&self) -> Vec<String> {
        let entries = self.lock();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut first_seen: Vec<&str> = Vec::new();
        for item in entries.iter() {
            let count = counts.entry(item.query.as_str()).or_insert(0);
            if *count == 0 {
                first_seen.push(item.query.as_str());
            }
            *count += 1;
        }

        // Stable sort keeps newest-first order among equal counts
        first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));
        first_seen
            .into_iter()
            .take(POPULAR_QUERY_LIMIT)
            .map(str::to_string)
            .collect()
    }
}

impl Default for SearchHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
