//! GitHub code search client abstractions and implementation

pub mod client;
pub mod http;
pub mod types;

pub use client::CodeSearchClient;
pub use http::GitHubClient;
pub use types::{
    AuthenticatedUser, ItemKey, MatchSpan, PageRequest, Repository, RepositoryOwner,
    ResultPage, SearchResponse, SearchResultItem, TextMatch,
};
