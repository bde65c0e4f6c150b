//! Data access layer.
//!
//! Orchestrates the remote document store and the local cache:
//!
//! - **Reads** try the remote store first (when configured) under the
//!   retry policy, and fall back to the local cache. A read never fails:
//!   the result is the document or `None`.
//! - **Writes** validate the document, then write to the remote store
//!   under the retry policy, and on confirmed success mirror the document
//!   to the local cache. A write without a configured remote store fails.
//!
//! # Read fallback
//!
//! | Remote outcome | Action |
//! |----------------|--------|
//! | not configured | local cache |
//! | 401 | log remediation, local cache (one call, no retry) |
//! | content is not JSON | log, local cache (no retry) |
//! | network / rate limit / missing / 5xx | retry up to the cap, then local cache |
//!
//! # Write state machine
//!
//! ```text
//! VALIDATE ──fail──▶ Err(TooLarge | Invalid)
//!    │
//!    ▼
//! REMOTE_ATTEMPT(1..n) ──401──▶ Err(Unauthorized)
//!    │            └──exhausted──▶ Err(Exhausted | Conflict)
//!    ▼
//! MIRROR_LOCAL (best effort) ──▶ Ok(())
//! ```

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::cache::{to_pretty_json, LocalCache};
use crate::config::Config;
use crate::models::{DocumentName, Table, MAX_DOCUMENT_BYTES};
use crate::remote::github::GitHubStore;
use crate::remote::{RemoteError, RemoteStore};
use crate::retry::{self, RetryDecision, RetryFailure, RetryPolicy};

/// Operator guidance printed when the access token is rejected.
pub const AUTH_REMEDIATION: &str = "To fix: create a new personal access token with `repo` scope \
(GitHub > Settings > Developer settings > Personal access tokens), set it as GITHUB_TOKEN or \
`remote.token` in the config file, then run the command again.";

/// Where a loaded document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Remote,
    LocalCache,
}

impl Origin {
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Remote => "remote",
            Origin::LocalCache => "local cache",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub value: Value,
    pub origin: Origin,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("{file} serializes to {size} bytes, above the {max}-byte limit")]
    TooLarge {
        file: String,
        size: usize,
        max: usize,
    },
    #[error("{file} cannot be serialized as JSON: {source}")]
    Invalid {
        file: String,
        source: serde_json::Error,
    },
    #[error("cannot save {file}: remote store is not configured (set GITHUB_TOKEN and REPO_NAME)")]
    NotConfigured { file: String },
    #[error("cannot save {file}: {source}")]
    Unauthorized { file: String, source: RemoteError },
    #[error("cannot save {file}: it was changed by someone else while saving; reload it and retry your edit")]
    Conflict { file: String, attempts: u32 },
    #[error("saving {file} failed after {attempts} attempt(s): {source}")]
    Exhausted {
        file: String,
        attempts: u32,
        source: RemoteError,
    },
    #[error("saving {file} was rejected: {source}")]
    Rejected { file: String, source: RemoteError },
}

/// Remote-then-local document access.
pub struct DataStore {
    remote: Option<Box<dyn RemoteStore>>,
    cache: LocalCache,
    policy: RetryPolicy,
}

impl DataStore {
    pub fn new(
        remote: Option<Box<dyn RemoteStore>>,
        cache: LocalCache,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            remote,
            cache,
            policy,
        }
    }

    pub fn local_only(cache: LocalCache) -> Self {
        Self::new(None, cache, RetryPolicy::default())
    }

    /// Build the store from configuration.
    ///
    /// Missing credentials or a client that cannot be built leave the
    /// store in local-only mode.
    pub fn from_config(config: &Config) -> Self {
        let github = GitHubStore::from_config(&config.remote);
        let remote: Option<Box<dyn RemoteStore>> = match github {
            Some(Ok(github)) => {
                debug!(remote = %github.describe(), "remote store configured");
                Some(Box::new(github))
            }
            Some(Err(e)) => {
                warn!("GitHub client could not be created: {e}; using local data");
                None
            }
            None => {
                info!("GitHub token or repository not configured; using local data");
                None
            }
        };
        Self::new(
            remote,
            LocalCache::new(&config.cache.dir),
            config.retry.policy(),
        )
    }

    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    pub fn remote_description(&self) -> Option<String> {
        self.remote.as_ref().map(|r| r.describe())
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    // ============ Reads ============

    /// Load a document, or `None` when neither store has a usable copy.
    pub fn load_document(&self, name: &DocumentName) -> Option<Value> {
        self.load_with_origin(name).map(|loaded| loaded.value)
    }

    /// Like [`load_document`](Self::load_document), also reporting the source.
    pub fn load_with_origin(&self, name: &DocumentName) -> Option<Loaded> {
        if let Some(remote) = &self.remote {
            if let Some(value) = self.load_remote(remote.as_ref(), name) {
                return Some(Loaded {
                    value,
                    origin: Origin::Remote,
                });
            }
        }
        self.load_local(name).map(|value| Loaded {
            value,
            origin: Origin::LocalCache,
        })
    }

    /// Load and decode a table into its declared schema.
    pub fn load_table<T: Table>(&self) -> Option<T> {
        let name = T::document_name();
        let value = self.load_document(&name)?;
        match serde_json::from_value(value) {
            Ok(table) => Some(table),
            Err(e) => {
                error!("{name} does not match its schema: {e}");
                None
            }
        }
    }

    fn load_remote(&self, remote: &dyn RemoteStore, name: &DocumentName) -> Option<Value> {
        let path = name.repo_path();
        let file = match retry::run(&self.policy, |_| remote.fetch(&path)) {
            Ok(file) => file,
            Err(failure) => {
                match &failure.error {
                    RemoteError::Unauthorized => {
                        error!("GitHub authentication failed: the token is expired or invalid");
                        error!("{AUTH_REMEDIATION}");
                    }
                    RemoteError::Malformed(detail) => {
                        error!("{name} from remote is corrupt ({detail}); using local data");
                    }
                    other => {
                        warn!(
                            attempts = failure.attempts,
                            "could not load {name} from remote: {other}; using local data"
                        );
                    }
                }
                return None;
            }
        };

        match serde_json::from_slice(&file.content) {
            Ok(value) => Some(value),
            Err(e) => {
                error!("JSON parse error in remote {name}: {e}; using local data");
                None
            }
        }
    }

    fn load_local(&self, name: &DocumentName) -> Option<Value> {
        match self.cache.read(name) {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                debug!(path = %self.cache.path_for(name).display(), "no local copy of {name}");
                None
            }
            Err(e) => {
                error!("failed to load local {name}: {e}");
                None
            }
        }
    }

    // ============ Writes ============

    /// Save a document to the remote store and mirror it locally.
    ///
    /// `Ok(())` means the remote store confirmed the write.
    pub fn save_document(&self, name: &DocumentName, document: &Value) -> Result<(), SaveError> {
        let file = name.file_name();
        validate_document(&file, document)?;

        let Some(remote) = self.remote.as_deref() else {
            error!("GitHub token or repository not configured; cannot save {file}");
            return Err(SaveError::NotConfigured { file });
        };

        let body = to_pretty_json(document).map_err(|source| SaveError::Invalid {
            file: file.clone(),
            source,
        })?;
        let path = name.repo_path();

        let written = retry::run(&self.policy, |attempt| {
            debug!(attempt, "writing {path}");
            write_once(remote, &path, &file, &body)
        });

        if let Err(failure) = written {
            let RetryFailure {
                error: last,
                attempts,
                decision,
            } = failure;
            let err = match last {
                source @ RemoteError::Unauthorized => {
                    error!("GitHub authentication failed while saving {file}");
                    error!("{AUTH_REMEDIATION}");
                    SaveError::Unauthorized { file, source }
                }
                RemoteError::Conflict(_) => SaveError::Conflict { file, attempts },
                source if decision == RetryDecision::Abort => {
                    SaveError::Rejected { file, source }
                }
                source => SaveError::Exhausted {
                    file,
                    attempts,
                    source,
                },
            };
            error!("{err}");
            return Err(err);
        }

        info!(remote = %remote.describe(), "saved {file}");

        if let Err(e) = self.cache.write(name, document) {
            warn!("saved {file} remotely but the local mirror failed: {e}");
        }
        Ok(())
    }

    /// Encode a table with its schema and save it.
    pub fn save_table<T: Table>(&self, table: &T) -> Result<(), SaveError> {
        let name = T::document_name();
        let value = serde_json::to_value(table).map_err(|source| SaveError::Invalid {
            file: name.file_name(),
            source,
        })?;
        self.save_document(&name, &value)
    }
}

/// One remote write: update with the current revision token, or create.
fn write_once(
    remote: &dyn RemoteStore,
    path: &str,
    file: &str,
    body: &[u8],
) -> Result<(), RemoteError> {
    match remote.fetch(path) {
        Ok(existing) => remote.update(path, &format!("Update {file}"), body, &existing.sha),
        Err(e) if e.is_not_found() => remote.create(path, &format!("Create {file}"), body),
        Err(e) => Err(e),
    }
}

/// Check that a document serializes within [`MAX_DOCUMENT_BYTES`].
pub fn validate_document(file: &str, document: &Value) -> Result<usize, SaveError> {
    let size = serde_json::to_vec(document)
        .map_err(|source| SaveError::Invalid {
            file: file.to_string(),
            source,
        })?
        .len();
    if size > MAX_DOCUMENT_BYTES {
        error!("{file} is too large ({size} bytes, max {MAX_DOCUMENT_BYTES})");
        return Err(SaveError::TooLarge {
            file: file.to_string(),
            size,
            max: MAX_DOCUMENT_BYTES,
        });
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_small_documents() {
        let size = validate_document("a.json", &json!({"kpi": 1})).unwrap();
        assert_eq!(size, r#"{"kpi":1}"#.len());
    }

    #[test]
    fn test_validate_rejects_oversize() {
        let big = Value::String("x".repeat(MAX_DOCUMENT_BYTES));
        let err = validate_document("big.json", &big).unwrap_err();
        match err {
            SaveError::TooLarge { size, max, .. } => {
                assert_eq!(size, MAX_DOCUMENT_BYTES + 2);
                assert_eq!(max, MAX_DOCUMENT_BYTES);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_origin_labels() {
        assert_eq!(Origin::Remote.as_str(), "remote");
        assert_eq!(Origin::LocalCache.as_str(), "local cache");
    }
}
