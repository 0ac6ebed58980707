//! CLI configuration loader for ghsearch
//!
//! Layers are merged lowest priority first:
//! 1. Built-in defaults
//! 2. One config file: --config file/dir, else the first of
//!    ./ghsearch.json, ./.ghsearch/config.json, <repo_root>/.ghsearch/config.json,
//!    $XDG_CONFIG_HOME/ghsearch/config.json (or ~/.config/ghsearch/config.json)
//! 3. GHSEARCH_* environment variables
//! 4. Command line flags

use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File, FileFormat};
use ghsearch_core::SearchConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for environment variable overrides, e.g. GHSEARCH_PER_PAGE
const ENV_PREFIX: &str = "GHSEARCH";

/// Environment variables consulted for a token, in order
const TOKEN_ENV_VARS: &[&str] = &["GHSEARCH_TOKEN", "GITHUB_TOKEN"];

/// CLI configuration loader
#[derive(Debug, Clone, Default)]
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    token_override: Option<String>,
    base_url_override: Option<String>,
    per_page_override: Option<u32>,
    debounce_override: Option<u64>,
    exclude_override: Option<bool>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set token override
    pub fn with_token_override(mut self, token: String) -> Self {
        self.token_override = Some(token);
        self
    }

    /// Set base URL override
    pub fn with_base_url_override(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }

    /// Set page size override
    pub fn with_per_page_override(mut self, per_page: u32) -> Self {
        self.per_page_override = Some(per_page);
        self
    }

    /// Set debounce delay override, in milliseconds
    pub fn with_debounce_override(mut self, debounce_ms: u64) -> Self {
        self.debounce_override = Some(debounce_ms);
        self
    }

    /// Force the non-programming file filter on or off
    pub fn with_exclude_override(mut self, exclude: bool) -> Self {
        self.exclude_override = Some(exclude);
        self
    }

    /// Whether the filter setting was given on the command line
    pub fn exclude_override(&self) -> Option<bool> {
        self.exclude_override
    }

    /// Load and resolve configuration
    pub fn load(&self) -> Result<SearchConfig> {
        // Step 1: Defaults, config file, environment
        let defaults = serde_json::to_string(&SearchConfig::default())?;
        let mut builder = Config::builder().add_source(File::from_str(&defaults, FileFormat::Json));

        if let Some(path) = self.find_config_file()? {
            debug!("Loading config from {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Json));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let mut config: SearchConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Step 2: Apply flag overrides
        if let Some(base_url) = &self.base_url_override {
            config.base_url = base_url.clone();
        }
        if let Some(per_page) = self.per_page_override {
            config.per_page = per_page;
        }
        if let Some(debounce_ms) = self.debounce_override {
            config.debounce_delay_ms = debounce_ms;
        }
        if let Some(exclude) = self.exclude_override {
            config.exclude_non_programming = exclude;
        }

        // Step 3: Validate
        config
            .validate()
            .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

        Ok(config)
    }

    /// Token from the command line or environment, if any
    pub fn resolve_token(&self) -> Option<String> {
        self.token_override.clone().or_else(|| {
            TOKEN_ENV_VARS
                .iter()
                .filter_map(|name| std::env::var(name).ok())
                .find(|value| !value.trim().is_empty())
        })
    }

    /// Locate the config file to use, if any
    fn find_config_file(&self) -> Result<Option<PathBuf>> {
        if let Some(override_path) = &self.config_override {
            return self.resolve_override(override_path).map(Some);
        }

        let cwd = std::env::current_dir()?;
        let mut candidates = vec![
            cwd.join("ghsearch.json"),
            cwd.join(".ghsearch").join("config.json"),
        ];
        if let Some(git_root) = find_git_root(&cwd) {
            candidates.push(git_root.join(".ghsearch").join("config.json"));
        }
        if let Some(config_dir) = xdg_config_dir() {
            candidates.push(config_dir.join("ghsearch").join("config.json"));
        }

        Ok(candidates.into_iter().find(|path| path.is_file()))
    }

    /// An explicit --config path may be a file or a directory holding config.json
    fn resolve_override(&self, path: &Path) -> Result<PathBuf> {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());

        if expanded.is_file() {
            Ok(expanded)
        } else if expanded.is_dir() {
            let config_file = expanded.join("config.json");
            if config_file.is_file() {
                Ok(config_file)
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    expanded.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", expanded.display()))
        }
    }
}

/// Find git repository root
fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Get XDG config directory
fn xdg_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
}

/// Default location of the persisted token, settings and history
pub fn default_store_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ghsearch")
        .join("store.json")
}

/// Expand `~` in a user supplied store path
pub fn resolve_store_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref()),
        None => default_store_path(),
    }
}
