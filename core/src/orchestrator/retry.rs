//! Per-page fetch with timeout and exponential backoff

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::github::{CodeSearchClient, PageRequest, ResultPage};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Retry and timeout settings applied to every page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.retry_delay(),
            timeout: config.request_timeout(),
        }
    }

    /// Delay before retry number `attempt` (zero based): `base * 2^attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }
}

/// Fetch one page, retrying network-class failures.
///
/// Every attempt is bounded by the policy timeout. Backoff sleeps stop as
/// soon as `cancel` fires.
pub(crate) async fn fetch_with_retry(
    client: &dyn CodeSearchClient,
    request: &PageRequest,
    token: &str,
    cancel: &CancellationToken,
    policy: &RetryPolicy,
) -> Result<ResultPage, SearchError> {
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let outcome =
            match tokio::time::timeout(policy.timeout, client.search_code(request, token, cancel))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(SearchError::Timeout {
                    timeout_ms: policy.timeout.as_millis() as u64,
                }),
            };

        match outcome {
            Err(err) if err.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.backoff(attempt);
                attempt += 1;
                warn!(
                    "Page {} of {:?} failed (attempt {}), retrying in {}ms: {}",
                    request.page,
                    request.query,
                    attempt,
                    delay.as_millis(),
                    err
                );

                tokio::select! {
                    _ = cancel.cancelled() => return Err(SearchError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            Err(err) => {
                debug!("Page {} of {:?} failed: {}", request.page, request.query, err);
                return Err(err);
            }
            Ok(page) => return Ok(page),
        }
    }
}
