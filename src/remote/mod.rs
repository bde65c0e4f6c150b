//! Remote document store abstraction.
//!
//! The [`RemoteStore`] trait is the file API of a hosted, version-controlled
//! repository: fetch a file with its revision token, create a file, or
//! update a file given the token it was read at. Two backends exist:
//!
//! - [`github::GitHubStore`]: the GitHub contents API over blocking HTTP.
//! - [`memory::MemoryRemote`]: an in-process store with scripted failures,
//!   used by tests.
//!
//! Every [`RemoteError`] maps to an [`ErrorClass`] so the retry loop can
//! decide whether another attempt makes sense.

pub mod github;
pub mod memory;

use crate::retry::{Classify, ErrorClass};

/// A file read from the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Decoded file bytes.
    pub content: Vec<u8>,
    /// Revision token required to update the file.
    pub sha: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("authentication failed (HTTP 401): the access token is expired or invalid")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(String),
    #[error("revision conflict on {0}: the file changed since it was read")]
    Conflict(String),
    #[error("rate limited (HTTP {0})")]
    RateLimited(u16),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed content: {0}")]
    Malformed(String),
    #[error("remote client setup failed: {0}")]
    Setup(String),
}

impl Classify for RemoteError {
    fn class(&self) -> ErrorClass {
        match self {
            RemoteError::Unauthorized | RemoteError::Setup(_) => ErrorClass::Auth,
            RemoteError::Malformed(_) => ErrorClass::Malformed,
            RemoteError::Conflict(_) => ErrorClass::Conflict,
            RemoteError::NotFound(_)
            | RemoteError::RateLimited(_)
            | RemoteError::Status { .. }
            | RemoteError::Transport(_) => ErrorClass::Transient,
        }
    }
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }
}

/// File operations against the repository acting as the data store.
///
/// Paths are repository-relative, e.g. `data/weekly_reports.json`. The
/// branch is fixed by the implementation.
pub trait RemoteStore: Send + Sync {
    /// Short human-readable identity, e.g. `github:owner/repo@main`.
    fn describe(&self) -> String;

    /// Read a file and its revision token.
    fn fetch(&self, path: &str) -> Result<RemoteFile, RemoteError>;

    /// Create a file that does not exist yet.
    fn create(&self, path: &str, message: &str, content: &[u8]) -> Result<(), RemoteError>;

    /// Replace a file, given the revision token it was read at.
    fn update(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        sha: &str,
    ) -> Result<(), RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(RemoteError::Unauthorized.class(), ErrorClass::Auth);
        assert_eq!(RemoteError::Setup("bad".into()).class(), ErrorClass::Auth);
        assert_eq!(
            RemoteError::Malformed("x".into()).class(),
            ErrorClass::Malformed
        );
        assert_eq!(
            RemoteError::Conflict("data/a.json".into()).class(),
            ErrorClass::Conflict
        );
        assert_eq!(
            RemoteError::NotFound("data/a.json".into()).class(),
            ErrorClass::Transient
        );
        assert_eq!(RemoteError::RateLimited(429).class(), ErrorClass::Transient);
        assert_eq!(
            RemoteError::Status {
                status: 502,
                message: String::new()
            }
            .class(),
            ErrorClass::Transient
        );
    }
}
