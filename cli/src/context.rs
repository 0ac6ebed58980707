//! Shared state for every command: resolved config, persisted store, client

use crate::config::CliConfigLoader;
use anyhow::{Context, Result};
use ghsearch_core::storage::{SearchSettings, SETTINGS_KEY};
use ghsearch_core::{
    CodeSearchClient, GitHubClient, LocalStore, SearchConfig, SearchHistoryStore,
    SearchOrchestrator, TokenManager,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Everything a command needs, loaded once at startup
pub struct AppContext {
    pub config: SearchConfig,
    pub store: LocalStore,
    pub client: Arc<dyn CodeSearchClient>,
    pub tokens: TokenManager,
    pub history: Arc<SearchHistoryStore>,
    /// Token given on the command line or in the environment
    token_override: Option<String>,
}

impl AppContext {
    /// Resolve configuration and open the store at `store_path`
    pub async fn load(loader: &CliConfigLoader, store_path: &Path) -> Result<Self> {
        let mut config = loader.load()?;

        let store = LocalStore::open(store_path)
            .await
            .with_context(|| format!("Failed to open store {}", store_path.display()))?;
        debug!("Using store {}", store_path.display());

        // A saved preference wins over config files unless a flag was given
        if loader.exclude_override().is_none() {
            if let Ok(Some(settings)) = store.get::<SearchSettings>(SETTINGS_KEY) {
                config.exclude_non_programming = settings.exclude_non_programming;
            }
        }

        let client: Arc<dyn CodeSearchClient> = Arc::new(GitHubClient::new(&config)?);
        let mut tokens = TokenManager::from_store(Arc::clone(&client), &store);
        let history = Arc::new(SearchHistoryStore::from_store(&store));
        let token_override = loader.resolve_token();

        // An expired token is confirmed again before anything uses it
        if tokens.is_expired() {
            if let Err(e) = tokens.fresh_token().await {
                warn!("Stored GitHub token could not be re-validated: {}", e);
            }
        }

        Ok(Self {
            config,
            store,
            client,
            tokens,
            history,
            token_override,
        })
    }

    /// Token for requests: an explicit override, else the stored one
    pub fn token(&self) -> Option<String> {
        self.token_override
            .clone()
            .or_else(|| self.tokens.token().ok().map(str::to_string))
    }

    /// Whether the token in use came from the command line or environment
    pub fn has_token_override(&self) -> bool {
        self.token_override.is_some()
    }

    /// Build an orchestrator, optionally with a different debounce delay
    pub fn orchestrator(&self, debounce: Option<Duration>) -> SearchOrchestrator {
        let mut config = self.config.clone();
        if let Some(delay) = debounce {
            config = config.with_debounce_delay(delay);
        }

        let mut builder = SearchOrchestrator::builder(Arc::clone(&self.client), config)
            .history(Arc::clone(&self.history));
        if let Some(token) = self.token() {
            builder = builder.token(token);
        }
        builder.build()
    }

    /// Save the current non-programming filter preference
    pub fn set_exclude_non_programming(&mut self, exclude: bool) -> Result<()> {
        self.config.exclude_non_programming = exclude;
        self.store.set_settings(SearchSettings {
            exclude_non_programming: exclude,
        })?;
        Ok(())
    }

    /// Write token, history and settings back to disk
    pub async fn persist(&mut self) -> Result<()> {
        self.tokens.save_to(&mut self.store)?;
        self.history.save_to(&mut self.store)?;
        self.store.save().await?;
        Ok(())
    }
}
