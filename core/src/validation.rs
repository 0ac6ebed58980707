//! Input validation performed before any request is made

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Longest query GitHub accepts
pub const MAX_QUERY_LENGTH: usize = 256;

static SCRIPT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid pattern"));
static LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9+#.-]+$").expect("valid pattern"));
static OWNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9-]+$").expect("valid pattern"));
static REPO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("valid pattern"));
static GITHUB_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^gh[ops]_[a-zA-Z0-9]{36,251}$").expect("valid pattern"));

/// Structured qualifiers a caller may attach to a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.owner.is_none() && self.repo.is_none()
    }
}

/// A query as submitted by a caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub filters: Option<SearchFilters>,
    pub page: Option<u32>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = Some(filters);
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Check a query and its filters, collecting every problem found
pub fn validate_search_query(request: &SearchRequest) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    if request.query.trim().is_empty() {
        errors.push("Search query is required".to_string());
    }

    if request.query.chars().count() > MAX_QUERY_LENGTH {
        errors.push(format!(
            "Search query must be at most {} characters",
            MAX_QUERY_LENGTH
        ));
    }

    if SCRIPT_TAG.is_match(&request.query) {
        errors.push("Search query contains disallowed content".to_string());
    }

    if let Some(filters) = &request.filters {
        if let Some(language) = &filters.language {
            if !LANGUAGE.is_match(language) {
                errors.push("Language filter contains invalid characters".to_string());
            }
        }
        if let Some(owner) = &filters.owner {
            if !OWNER.is_match(owner) {
                errors.push("Owner filter contains invalid characters".to_string());
            }
        }
        if let Some(repo) = &filters.repo {
            if !REPO.is_match(repo) {
                errors.push("Repository filter contains invalid characters".to_string());
            }
        }
    }

    if request.page == Some(0) {
        errors.push("Page number must be an integer of at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { errors })
    }
}

/// Check that a token has the shape of a GitHub OAuth, personal or server token
pub fn validate_github_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::single("GitHub token is required"));
    }

    if !GITHUB_TOKEN.is_match(token) {
        return Err(ValidationError::single(
            "Invalid token format. Token should start with \"gho_\", \"ghp_\" or \"ghs_\"",
        ));
    }

    Ok(())
}
