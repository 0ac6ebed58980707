//! Wire types for the GitHub code search API

use serde::{Deserialize, Serialize};

/// A single highlighted match inside a text fragment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    /// Start and end offsets of the match within the fragment
    pub indices: [usize; 2],

    /// The matched text, when GitHub includes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A fragment of file content with match positions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextMatch {
    pub fragment: String,

    #[serde(default)]
    pub matches: Vec<MatchSpan>,
}

/// Owner of a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,

    #[serde(default)]
    pub avatar_url: String,
}

/// Repository a search hit belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub full_name: String,
    pub html_url: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub stargazers_count: u64,

    #[serde(default)]
    pub forks_count: u64,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,

    pub owner: RepositoryOwner,
}

/// Composite identity of a search hit.
///
/// The same blob sha can appear under several paths or repositories, so the
/// sha alone is not enough to deduplicate aggregated results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub sha: String,
    pub repository: String,
    pub path: String,
}

/// One code search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub sha: String,
    pub path: String,
    pub html_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_matches: Option<Vec<TextMatch>>,
}

impl SearchResultItem {
    /// Identity key used for deduplication within a session
    pub fn key(&self) -> ItemKey {
        ItemKey {
            sha: self.sha.clone(),
            repository: self.repository_name().unwrap_or_default().to_string(),
            path: self.path.clone(),
        }
    }

    /// Full name of the owning repository, if known
    pub fn repository_name(&self) -> Option<&str> {
        self.repository.as_ref().map(|r| r.full_name.as_str())
    }

    /// Final segment of the path
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Raw response body of `GET /search/code`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_count: u64,

    #[serde(default)]
    pub incomplete_results: bool,

    #[serde(default)]
    pub items: Vec<SearchResultItem>,
}

/// Error body returned by the GitHub API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubErrorResponse {
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub documentation_url: Option<String>,
}

/// One page of results produced by a single HTTP call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage {
    pub items: Vec<SearchResultItem>,
    pub total_count: u64,
    pub page: u32,
}

/// Parameters for fetching one page of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(query: impl Into<String>, page: u32, per_page: u32) -> Self {
        Self {
            query: query.into(),
            page,
            per_page,
        }
    }
}

/// Account returned by `GET /user` when a token is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,

    #[serde(default)]
    pub name: Option<String>,
}
