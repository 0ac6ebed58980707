//! # ghsearch Core
//!
//! Core library for ghsearch - a debounced, cache-aware client for the
//! GitHub code search API.
//!
//! The centre of the crate is [`SearchOrchestrator`], which turns a stream
//! of typed queries into paged, filtered and cached results while making
//! sure a superseded request never reaches the screen.

// Core modules
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod github;
pub mod highlight;
pub mod history;
pub mod orchestrator;
pub mod query;
pub mod storage;
pub mod token;
pub mod validation;

// Re-export commonly used types
pub use cache::ResultCache;
pub use config::SearchConfig;
pub use error::{Error, Result, SearchError, ValidationError};
pub use github::{CodeSearchClient, GitHubClient, SearchResultItem};
pub use history::SearchHistoryStore;
pub use orchestrator::{SearchFailure, SearchOrchestrator, SearchPhase, SearchSnapshot};
pub use storage::LocalStore;
pub use token::TokenManager;
