//! In-memory [`RemoteStore`] for tests.
//!
//! Files are kept in a map behind a mutex together with a revision counter
//! that plays the role of the blob `sha`. Failures can be queued so the
//! next calls fail with a chosen error, and every call is recorded so
//! tests can assert how many requests an operation made. Concurrent writers
//! are simulated with [`MemoryRemote::interleave_writes`], which commits
//! to a file between a caller's read and its update.
//!
//! Clones share state.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{RemoteError, RemoteFile, RemoteStore};

/// An error to inject into the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Unauthorized,
    Unavailable,
    RateLimited,
    Conflict,
    Malformed,
}

impl Failure {
    fn into_error(self, path: &str) -> RemoteError {
        match self {
            Failure::Unauthorized => RemoteError::Unauthorized,
            Failure::Unavailable => RemoteError::Status {
                status: 503,
                message: "service unavailable".to_string(),
            },
            Failure::RateLimited => RemoteError::RateLimited(429),
            Failure::Conflict => RemoteError::Conflict(path.to_string()),
            Failure::Malformed => RemoteError::Malformed(format!("injected for {path}")),
        }
    }
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch { path: String },
    Create { path: String, message: String },
    Update {
        path: String,
        message: String,
        sha: String,
    },
}

#[derive(Default)]
struct State {
    files: BTreeMap<String, StoredFile>,
    next_revision: u64,
    queued: VecDeque<Failure>,
    interleaved: usize,
    offline: bool,
    calls: Vec<Call>,
}

struct StoredFile {
    content: Vec<u8>,
    sha: String,
}

impl State {
    fn begin(&mut self, call: Call, path: &str) -> Result<(), RemoteError> {
        self.calls.push(call);
        if let Some(failure) = self.queued.pop_front() {
            return Err(failure.into_error(path));
        }
        if self.offline {
            return Err(Failure::Unavailable.into_error(path));
        }
        Ok(())
    }

    fn store(&mut self, path: &str, content: &[u8]) {
        self.next_revision += 1;
        self.files.insert(
            path.to_string(),
            StoredFile {
                content: content.to_vec(),
                sha: format!("rev-{}", self.next_revision),
            },
        );
    }
}

#[derive(Clone, Default)]
pub struct MemoryRemote {
    state: Arc<Mutex<State>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Seed a file without recording a call.
    pub fn insert(&self, path: &str, content: impl AsRef<[u8]>) {
        self.lock().store(path, content.as_ref());
    }

    /// Current bytes of a file, if present.
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().files.get(path).map(|f| f.content.clone())
    }

    /// Current revision token of a file, if present.
    pub fn sha(&self, path: &str) -> Option<String> {
        self.lock().files.get(path).map(|f| f.sha.clone())
    }

    /// Fail the next call with `failure`. Queued failures apply in order.
    pub fn fail_next(&self, failure: Failure) {
        self.lock().queued.push_back(failure);
    }

    /// Fail the next `n` calls with `failure`.
    pub fn fail_times(&self, failure: Failure, n: usize) {
        let mut state = self.lock();
        state.queued.extend(std::iter::repeat(failure).take(n));
    }

    /// Before each of the next `n` updates, another writer recommits the
    /// target file, so the token the caller read is stale.
    pub fn interleave_writes(&self, n: usize) {
        self.lock().interleaved += n;
    }

    /// While offline, every call fails as unavailable.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

impl RemoteStore for MemoryRemote {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn fetch(&self, path: &str) -> Result<RemoteFile, RemoteError> {
        let mut state = self.lock();
        state.begin(
            Call::Fetch {
                path: path.to_string(),
            },
            path,
        )?;
        state
            .files
            .get(path)
            .map(|f| RemoteFile {
                content: f.content.clone(),
                sha: f.sha.clone(),
            })
            .ok_or_else(|| RemoteError::NotFound(path.to_string()))
    }

    fn create(&self, path: &str, message: &str, content: &[u8]) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.begin(
            Call::Create {
                path: path.to_string(),
                message: message.to_string(),
            },
            path,
        )?;
        if state.files.contains_key(path) {
            return Err(RemoteError::Status {
                status: 422,
                message: format!("{path} already exists; sha is required"),
            });
        }
        state.store(path, content);
        Ok(())
    }

    fn update(
        &self,
        path: &str,
        message: &str,
        content: &[u8],
        sha: &str,
    ) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.begin(
            Call::Update {
                path: path.to_string(),
                message: message.to_string(),
                sha: sha.to_string(),
            },
            path,
        )?;
        if state.interleaved > 0 {
            state.interleaved -= 1;
            if let Some(current) = state.files.get(path).map(|f| f.content.clone()) {
                state.store(path, &current);
            }
        }
        match state.files.get(path) {
            None => return Err(RemoteError::NotFound(path.to_string())),
            Some(current) if current.sha != sha => {
                return Err(RemoteError::Conflict(path.to_string()))
            }
            Some(_) => {}
        }
        state.store(path, content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "data/schedules.json";

    #[test]
    fn test_create_then_fetch() {
        let remote = MemoryRemote::new();
        remote.create(PATH, "Create schedules.json", b"[]").unwrap();
        let file = remote.fetch(PATH).unwrap();
        assert_eq!(file.content, b"[]");
        assert_eq!(file.sha, "rev-1");
    }

    #[test]
    fn test_update_requires_current_sha() {
        let remote = MemoryRemote::new();
        remote.insert(PATH, "[]");
        let stale = remote.sha(PATH).unwrap();
        remote.update(PATH, "Update schedules.json", b"[1]", &stale).unwrap();

        let err = remote
            .update(PATH, "Update schedules.json", b"[2]", &stale)
            .unwrap_err();
        assert!(matches!(err, RemoteError::Conflict(_)));
        assert_eq!(remote.file(PATH).unwrap(), b"[1]");
    }

    #[test]
    fn test_create_existing_is_rejected() {
        let remote = MemoryRemote::new();
        remote.insert(PATH, "[]");
        let err = remote.create(PATH, "Create schedules.json", b"[]").unwrap_err();
        assert!(matches!(err, RemoteError::Status { status: 422, .. }));
    }

    #[test]
    fn test_queued_failures_and_call_log() {
        let remote = MemoryRemote::new();
        remote.insert(PATH, "[]");
        remote.fail_next(Failure::Unauthorized);

        assert!(matches!(remote.fetch(PATH), Err(RemoteError::Unauthorized)));
        assert!(remote.fetch(PATH).is_ok());
        assert_eq!(remote.call_count(), 2);
        assert_eq!(
            remote.calls()[0],
            Call::Fetch {
                path: PATH.to_string()
            }
        );
    }

    #[test]
    fn test_interleaved_write_makes_token_stale() {
        let remote = MemoryRemote::new();
        remote.insert(PATH, "[]");
        remote.interleave_writes(1);
        let read = remote.fetch(PATH).unwrap();

        let err = remote
            .update(PATH, "Update schedules.json", b"[1]", &read.sha)
            .unwrap_err();
        assert!(matches!(err, RemoteError::Conflict(_)));
        assert_eq!(remote.sha(PATH).unwrap(), "rev-2");

        remote
            .update(PATH, "Update schedules.json", b"[1]", "rev-2")
            .unwrap();
        assert_eq!(remote.file(PATH).unwrap(), b"[1]");
    }

    #[test]
    fn test_offline_fails_every_call() {
        let remote = MemoryRemote::new();
        remote.insert(PATH, "[]");
        remote.set_offline(true);
        for _ in 0..3 {
            assert!(matches!(
                remote.fetch(PATH),
                Err(RemoteError::Status { status: 503, .. })
            ));
        }
        remote.set_offline(false);
        assert!(remote.fetch(PATH).is_ok());
    }
}
