//! Configuration Management
//!
//! Handles persistent configuration storage for vercel-client.

use crate::vercel::client::DEFAULT_BASE_URL;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_API_TOKEN: &str = "VERCEL_API_TOKEN";
pub const ENV_TEAM_ID: &str = "VERCEL_TEAM_ID";
pub const ENV_BASE_URL: &str = "VERCEL_BASE_URL";

/// User configuration
#[derive(Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Bearer token attached to every request
    #[serde(default)]
    pub api_token: Option<String>,
    /// Default team scope
    #[serde(default)]
    pub team_id: Option<String>,
    /// API endpoint, defaults to the production API
    #[serde(default)]
    pub base_url: Option<String>,
    /// Transport timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// File values shadowed by environment overrides. Never persisted.
    #[serde(skip)]
    shadowed: Shadowed,
}

/// Values a field held before an override replaced it
#[derive(Clone, Default, PartialEq, Eq)]
struct Shadowed {
    api_token: Option<Option<String>>,
    team_id: Option<Option<String>>,
    base_url: Option<Option<String>>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("team_id", &self.team_id)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vercel-client").join("config.json"))
    }

    /// Load configuration from disk, with environment overrides applied
    pub fn load() -> Self {
        let config = match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        };
        config.with_overrides(|key| std::env::var(key).ok())
    }

    /// Load configuration from `path`. A missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(&self.persisted())?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Apply overrides looked up by environment variable name. Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(token) = lookup(ENV_API_TOKEN) {
            let previous = self.api_token.replace(token);
            self.shadowed.api_token.get_or_insert(previous);
        }
        if let Some(team) = lookup(ENV_TEAM_ID) {
            let previous = self.team_id.replace(team);
            self.shadowed.team_id.get_or_insert(previous);
        }
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            let previous = self.base_url.replace(base_url);
            self.shadowed.base_url.get_or_insert(previous);
        }
        self
    }

    /// The configuration as it should be written to disk: overridden fields
    /// get their file values back
    fn persisted(&self) -> Self {
        let mut persisted = self.clone();
        if let Some(token) = &self.shadowed.api_token {
            persisted.api_token = token.clone();
        }
        if let Some(team) = &self.shadowed.team_id {
            persisted.team_id = team.clone();
        }
        if let Some(base_url) = &self.shadowed.base_url {
            persisted.base_url = base_url.clone();
        }
        persisted.shadowed = Shadowed::default();
        persisted
    }

    /// Get effective base URL (config > production default)
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        let base_url = self.effective_base_url();
        let parsed = url::Url::parse(&base_url)
            .with_context(|| format!("Invalid base URL: {}", base_url))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Base URL must be http or https: {}", base_url);
        }
        if parsed.query().is_some() {
            anyhow::bail!("Base URL must not carry a query string: {}", base_url);
        }
        if self.timeout_secs == Some(0) {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Set default team and save
    pub fn set_team_id(&mut self, team_id: &str) -> Result<()> {
        self.apply_team_id(team_id);
        self.save()
    }

    /// An explicitly set team is persisted even if the environment overrode it
    fn apply_team_id(&mut self, team_id: &str) {
        self.team_id = Some(team_id.to_string()).filter(|t| !t.is_empty());
        self.shadowed.team_id = None;
    }
}
