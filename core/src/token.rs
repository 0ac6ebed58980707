//! GitHub token lifecycle: format check, remote validation, expiry

use crate::error::{Result, SearchError};
use crate::github::{AuthenticatedUser, CodeSearchClient};
use crate::storage::{LocalStore, TOKEN_KEY};
use crate::validation::validate_github_token;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How long a validated token is trusted before it must be re-checked
pub const TOKEN_VALIDITY_HOURS: i64 = 12;

/// A validated token and when it stops being trusted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    fn fresh(token: String) -> Self {
        Self {
            token,
            expires_at: Utc::now() + Duration::hours(TOKEN_VALIDITY_HOURS),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Holds the current token and re-validates it against the API
pub struct TokenManager {
    client: Arc<dyn CodeSearchClient>,
    stored: Option<StoredToken>,
}

impl TokenManager {
    pub fn new(client: Arc<dyn CodeSearchClient>) -> Self {
        Self {
            client,
            stored: None,
        }
    }

    /// Restore a previously saved token. Tokens saved as a bare string are
    /// accepted and treated as freshly validated.
    pub fn from_store(client: Arc<dyn CodeSearchClient>, store: &LocalStore) -> Self {
        let stored = match store.get::<StoredToken>(TOKEN_KEY) {
            Ok(stored) => stored,
            Err(_) => store
                .get::<String>(TOKEN_KEY)
                .ok()
                .flatten()
                .map(StoredToken::fresh),
        };

        if stored.is_some() {
            debug!("Loaded stored GitHub token");
        }

        Self { client, stored }
    }

    /// Persist the current token, or remove it if none is held
    pub fn save_to(&self, store: &mut LocalStore) -> Result<()> {
        match &self.stored {
            Some(stored) => store.set(TOKEN_KEY, stored),
            None => {
                store.remove(TOKEN_KEY);
                Ok(())
            }
        }
    }

    /// Check the format, validate with the API, and keep the token on success
    pub async fn set_token(
        &mut self,
        token: &str,
    ) -> std::result::Result<AuthenticatedUser, SearchError> {
        let token = token.trim();
        validate_github_token(token)?;

        let user = self.client.validate_token(token).await?;
        info!("GitHub token accepted for {}", user.login);

        self.stored = Some(StoredToken::fresh(token.to_string()));
        Ok(user)
    }

    /// The current token, if one is held and still trusted
    pub fn token(&self) -> std::result::Result<&str, SearchError> {
        match &self.stored {
            Some(stored) if !stored.is_expired() => Ok(stored.token.as_str()),
            _ => Err(SearchError::MissingToken),
        }
    }

    /// The current token, re-validating it first once its validity window
    /// has passed. A token the API no longer accepts is dropped.
    pub async fn fresh_token(&mut self) -> std::result::Result<String, SearchError> {
        if self.is_expired() {
            debug!("Stored GitHub token expired, re-validating");
            self.refresh().await?;
        }
        self.token().map(str::to_string)
    }

    pub fn has_token(&self) -> bool {
        self.stored.is_some()
    }

    /// True when a token is held but its validity window has passed
    pub fn is_expired(&self) -> bool {
        self.stored.as_ref().is_some_and(StoredToken::is_expired)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.stored.as_ref().map(|s| s.expires_at)
    }

    /// Re-validate the held token, extending its validity.
    /// A rejected token is dropped.
    pub async fn refresh(&mut self) -> std::result::Result<AuthenticatedUser, SearchError> {
        let Some(stored) = &self.stored else {
            return Err(SearchError::MissingToken);
        };

        match self.client.validate_token(&stored.token).await {
            Ok(user) => {
                let token = stored.token.clone();
                self.stored = Some(StoredToken::fresh(token));
                debug!("GitHub token refreshed");
                Ok(user)
            }
            Err(err) => {
                warn!("Dropping GitHub token after failed refresh: {}", err);
                self.stored = None;
                Err(err)
            }
        }
    }

    /// Forget the held token
    pub fn revoke(&mut self) {
        self.stored = None;
    }
}

/// Mask all but the prefix and last four characters of a token
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", prefix, "*".repeat(chars.len() - 8), suffix)
}
