//! TOML configuration for the desk.
//!
//! Every section is optional. A missing token or repository is a legal
//! state: the data store then runs in local-only mode and reads from the
//! cache directory.
//!
//! # Environment Variables
//!
//! - `GITHUB_TOKEN` overrides `remote.token`
//! - `REPO_NAME` overrides `remote.repo`
//! - `BRANCH_NAME` overrides `remote.branch`

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default)]
    pub token: Option<String>,
    /// Repository identifier in `owner/name` form.
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            token: None,
            repo: None,
            branch: default_branch(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl RemoteConfig {
    /// Token and repository, when both are present and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
        let repo = self.repo.as_deref().map(str::trim).filter(|r| !r.is_empty())?;
        Some((token, repo))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_delay_ms() -> u64 {
    1000
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Config {
    /// Local-only configuration used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Apply `GITHUB_TOKEN`, `REPO_NAME` and `BRANCH_NAME` from the environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = non_blank("GITHUB_TOKEN") {
            self.remote.token = Some(token);
        }
        if let Some(repo) = non_blank("REPO_NAME") {
            self.remote.repo = Some(repo);
        }
        if let Some(branch) = non_blank("BRANCH_NAME") {
            self.remote.branch = branch;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be >= 1");
        }
        if self.remote.timeout_secs == 0 {
            bail!("remote.timeout_secs must be > 0");
        }
        if self.remote.branch.trim().is_empty() {
            bail!("remote.branch must not be empty");
        }
        if let Some(repo) = self.remote.repo.as_deref().filter(|r| !r.trim().is_empty()) {
            validate_repo_id(repo)?;
        }
        Ok(())
    }
}

fn validate_repo_id(repo: &str) -> Result<()> {
    let mut parts = repo.trim().split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Ok(()),
        _ => bail!(
            "remote.repo must look like 'owner/name', got '{}'",
            repo.trim()
        ),
    }
}

/// Parse a config file and apply environment overrides.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Like [`load_config`], but a missing file yields [`Config::minimal`].
pub fn load_or_minimal(path: &Path) -> Result<Config> {
    if path.exists() {
        return load_config(path);
    }
    tracing::debug!(path = %path.display(), "config file not found; using local-only defaults");
    let mut config = Config::minimal();
    config.apply_env();
    config.validate()?;
    Ok(config)
}
