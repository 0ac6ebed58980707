//! Local key-value persistence for session state
//!
//! A single JSON document on disk holds the token, search settings, theme
//! preference and query history.

use crate::error::{Error, Result, StorageError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "github_token";
pub const SETTINGS_KEY: &str = "searchSettings";
pub const THEME_KEY: &str = "theme";
pub const HISTORY_KEY: &str = "search_history";

/// Colour scheme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

/// Persisted search preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSettings {
    #[serde(default)]
    pub exclude_non_programming: bool,
}

/// JSON-file backed key-value store
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    values: BTreeMap<String, Value>,
}

impl LocalStore {
    /// A store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store at `path`. A missing file yields an empty store; a file
    /// that does not parse is renamed to `<path>.bak` and an empty store is
    /// used instead.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            debug!("Store {} does not exist, starting empty", path.display());
            return Ok(Self {
                path: Some(path),
                values: BTreeMap::new(),
            });
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| StorageError::ReadFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let values = match serde_json::from_str(&content) {
            Ok(values) => values,
            Err(e) => {
                // Keep the unreadable bytes so a later save cannot destroy them
                let backup = backup_path(&path);
                fs::rename(&path, &backup)
                    .await
                    .map_err(|err| StorageError::ReadFailed {
                        path: path.display().to_string(),
                        message: format!("corrupt store could not be moved aside: {}", err),
                    })?;
                warn!(
                    "Corrupt store {} moved to {}: {}",
                    path.display(),
                    backup.display(),
                    e
                );
                BTreeMap::new()
            }
        };

        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Write the store back to disk
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(write_failed)?;
        }

        let content = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, content).await.map_err(write_failed)?;

        debug!("Saved {} keys to {}", self.values.len(), path.display());
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read and decode a value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|_| {
                    Error::from(StorageError::InvalidValue {
                        key: key.to_string(),
                    })
                }),
        }
    }

    /// Encode and store a value
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.values
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Remove a key, returning whether it was present
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Stored search settings, falling back to defaults
    pub fn settings(&self) -> SearchSettings {
        self.get(SETTINGS_KEY).ok().flatten().unwrap_or_default()
    }

    pub fn set_settings(&mut self, settings: SearchSettings) -> Result<()> {
        self.set(SETTINGS_KEY, &settings)
    }

    /// Stored theme, falling back to following the system
    pub fn theme(&self) -> Theme {
        self.get(THEME_KEY).ok().flatten().unwrap_or_default()
    }

    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.set(THEME_KEY, &theme)
    }
}

/// `store.json` -> `store.json.bak`
fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".bak");
    PathBuf::from(name)
}
