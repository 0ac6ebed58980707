//! Accumulated results of the query currently on screen

use crate::config::SearchConfig;
use crate::filter::is_programming_file;
use crate::github::{ItemKey, SearchResultItem};
use std::collections::HashSet;
use std::sync::Arc;

/// Mutable aggregate of one query's pages.
///
/// Owned exclusively by the orchestrator state and only touched while its
/// lock is held.
#[derive(Debug, Clone)]
pub(crate) struct SearchSession {
    pub query: String,
    pub results: Arc<Vec<SearchResultItem>>,
    pub current_page: u32,
    pub total_count: u64,
    pub filtered_out_count: usize,
    pub has_more: bool,
    /// Raw items received from the server, before dedup and filtering
    fetched_items: u64,
    /// Identity keys seen this session, including items since truncated
    seen: HashSet<ItemKey>,
}

impl SearchSession {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            results: Arc::new(Vec::new()),
            current_page: 0,
            total_count: 0,
            filtered_out_count: 0,
            has_more: false,
            fetched_items: 0,
            seen: HashSet::new(),
        }
    }

    /// Merge one page into the session and return how many new items became
    /// visible. Page 1 replaces everything accumulated so far.
    pub fn apply_page(
        &mut self,
        raw: Arc<Vec<SearchResultItem>>,
        page: u32,
        total_count: u64,
        exclude_non_programming: bool,
        config: &SearchConfig,
    ) -> usize {
        if page <= 1 {
            self.results = Arc::new(Vec::new());
            self.seen.clear();
            self.filtered_out_count = 0;
            self.fetched_items = 0;
        }

        self.fetched_items += raw.len() as u64;
        self.current_page = page;
        self.total_count = total_count;

        let mut fresh = Vec::with_capacity(raw.len());
        for item in raw.iter() {
            if !self.seen.insert(item.key()) {
                continue;
            }
            if exclude_non_programming && !is_programming_file(&item.path) {
                self.filtered_out_count += 1;
                continue;
            }
            fresh.push(item.clone());
        }
        let added = fresh.len();

        if page <= 1 && added == raw.len() {
            // Nothing dropped: share the page with the cache
            self.results = raw;
        } else if added > 0 {
            Arc::make_mut(&mut self.results).extend(fresh);
        }

        let overflow = self.results.len().saturating_sub(config.max_stored_results);
        if overflow > 0 {
            Arc::make_mut(&mut self.results).drain(..overflow);
        }

        self.has_more = self.current_page < config.total_pages(self.total_count)
            && self.fetched_items < u64::from(config.max_items);

        added
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}
