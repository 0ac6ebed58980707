//! Resolved configuration types for ghsearch core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in CLI layer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default GitHub REST API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Fully resolved search configuration ready for use by core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the GitHub REST API
    pub base_url: String,
    /// Items requested per page
    pub per_page: u32,
    /// Upper bound on items a single query may page through
    pub max_items: u32,
    /// Retries for network-class failures
    pub max_retries: u32,
    /// Base delay for exponential backoff, in milliseconds
    pub retry_delay_ms: u64,
    /// Results kept in memory per session; oldest are dropped first
    pub max_stored_results: usize,
    /// Time-to-live of cached first pages, in milliseconds
    pub cache_duration_ms: u64,
    /// Number of queries kept in the result cache
    pub cache_capacity: usize,
    /// Quiet period before a typed query is executed, in milliseconds
    pub debounce_delay_ms: u64,
    /// Queries shorter than this are ignored
    pub min_query_length: usize,
    /// Per-request timeout, in milliseconds
    pub request_timeout_ms: u64,
    /// Drop results that are not programming source files
    pub exclude_non_programming: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            per_page: 30,
            max_items: 1000,
            max_retries: 3,
            retry_delay_ms: 1000,
            max_stored_results: 300,
            cache_duration_ms: 5 * 60 * 1000,
            cache_capacity: 100,
            debounce_delay_ms: 500,
            min_query_length: 3,
            request_timeout_ms: 10_000,
            exclude_non_programming: false,
        }
    }
}

impl SearchConfig {
    /// Set the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the page size
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Set the debounce delay
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set retry count and backoff base delay
    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_ms = retry_delay.as_millis() as u64;
        self
    }

    /// Set the per-session stored results cap
    pub fn with_max_stored_results(mut self, max_stored_results: usize) -> Self {
        self.max_stored_results = max_stored_results;
        self
    }

    /// Set the minimum query length
    pub fn with_min_query_length(mut self, min_query_length: usize) -> Self {
        self.min_query_length = min_query_length;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Enable or disable the non-programming file filter
    pub fn with_exclude_non_programming(mut self, exclude: bool) -> Self {
        self.exclude_non_programming = exclude;
        self
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_millis(self.cache_duration_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Number of server pages reachable for a given total count
    pub fn total_pages(&self, total_count: u64) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        let reachable = total_count.min(u64::from(self.max_items));
        reachable.div_ceil(u64::from(self.per_page)) as u32
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Base URL cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("Base URL must start with http:// or https://".to_string());
        }

        // GitHub caps per_page at 100
        if self.per_page == 0 || self.per_page > 100 {
            return Err("per_page must be between 1 and 100".to_string());
        }

        if self.max_items == 0 {
            return Err("max_items must be greater than 0".to_string());
        }

        if self.max_stored_results == 0 {
            return Err("max_stored_results must be greater than 0".to_string());
        }

        if self.cache_capacity == 0 {
            return Err("cache_capacity must be greater than 0".to_string());
        }

        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be greater than 0".to_string());
        }

        Ok(())
    }
}
