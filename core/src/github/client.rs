//! Code search client trait

use super::types::{AuthenticatedUser, PageRequest, ResultPage};
use crate::error::SearchError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Trait for code search backends
///
/// Implementations must check `cancel` before dispatching and return
/// [`SearchError::Cancelled`] once it fires. Callers still compare request
/// generations before applying a page, so a late response from an
/// implementation that ignores the token is harmless.
#[async_trait]
pub trait CodeSearchClient: Send + Sync {
    /// Fetch one page of code search results
    async fn search_code(
        &self,
        request: &PageRequest,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<ResultPage, SearchError>;

    /// Confirm that a token is accepted by the API
    async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, SearchError>;

    /// Get the provider name
    fn provider_name(&self) -> &str {
        "github"
    }
}
