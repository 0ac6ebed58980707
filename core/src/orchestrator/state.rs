//! Externally visible search state

use crate::error::SearchError;
use crate::github::SearchResultItem;
use std::fmt;
use std::sync::Arc;

/// Where the orchestrator is in its per-query lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchPhase {
    #[default]
    Idle,
    Debouncing,
    Fetching,
    Error,
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchPhase::Idle => "idle",
            SearchPhase::Debouncing => "debouncing",
            SearchPhase::Fetching => "fetching",
            SearchPhase::Error => "error",
        };
        f.write_str(name)
    }
}

/// An error as presented to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFailure {
    pub kind: SearchError,
    pub message: String,
    /// The user should be pointed at the token settings
    pub suggests_settings: bool,
}

impl From<SearchError> for SearchFailure {
    fn from(kind: SearchError) -> Self {
        Self {
            message: kind.to_string(),
            suggests_settings: kind.suggests_settings(),
            kind,
        }
    }
}

impl fmt::Display for SearchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Read-only view of the orchestrator published after every transition
#[derive(Debug, Clone, Default)]
pub struct SearchSnapshot {
    /// Query being debounced, fetched or shown
    pub query: String,
    pub results: Arc<Vec<SearchResultItem>>,
    pub is_loading: bool,
    pub error: Option<SearchFailure>,
    pub has_more: bool,
    /// Total count reported by the server for the current query
    pub total_results: u64,
    /// Items hidden by the non-programming file filter
    pub filtered_out_count: usize,
    pub phase: SearchPhase,
}

impl SearchSnapshot {
    /// No debounce timer or request outstanding
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, SearchPhase::Idle | SearchPhase::Error)
    }
}
