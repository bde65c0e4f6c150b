//! On-disk JSON cache.
//!
//! One file per document under a fixed directory, pretty-printed with
//! 4-space indentation. Non-ASCII text is written as-is. The cache is the
//! fallback for reads when the remote store is unavailable, and every
//! confirmed remote save is mirrored here.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::models::DocumentName;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialize `value` as UTF-8 JSON with 4-space indentation.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &DocumentName) -> PathBuf {
        self.dir.join(name.file_name())
    }

    /// Read a cached document. A missing file is `Ok(None)`.
    pub fn read(&self, name: &DocumentName) -> Result<Option<Value>, CacheError> {
        let path = self.path_for(name);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Read { path, source }),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| CacheError::Parse { path, source })
    }

    /// Write a document, creating the cache directory if needed.
    pub fn write(&self, name: &DocumentName, value: &Value) -> Result<PathBuf, CacheError> {
        let bytes = to_pretty_json(value)?;
        std::fs::create_dir_all(&self.dir).map_err(|source| CacheError::Write {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(name);
        std::fs::write(&path, bytes).map_err(|source| CacheError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name(raw: &str) -> DocumentName {
        DocumentName::new(raw).unwrap()
    }

    #[test]
    fn test_missing_file_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(tmp.path());
        assert!(cache.read(&name("schedules")).unwrap().is_none());
    }

    #[test]
    fn test_write_creates_dir_and_reads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(tmp.path().join("nested").join("data"));
        let doc = json!([{"name": "김철수", "dept": "교학팀"}]);

        let path = cache.write(&name("staff_profiles.json"), &doc).unwrap();
        assert!(path.ends_with("staff_profiles.json"));
        assert_eq!(cache.read(&name("staff_profiles")).unwrap(), Some(doc));
    }

    #[test]
    fn test_pretty_output_keeps_non_ascii_and_indent() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(tmp.path());
        let path = cache
            .write(&name("weekly_reports"), &json!({"department": "교학팀"}))
            .unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text, "{\n    \"department\": \"교학팀\"\n}");
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("business_cards.json"), "{not json").unwrap();
        let cache = LocalCache::new(tmp.path());
        let err = cache.read(&name("business_cards")).unwrap_err();
        assert!(matches!(err, CacheError::Parse { .. }));
    }
}
