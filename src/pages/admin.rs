//! Admin: upload a JSON document, list the known documents, show one.
//!
//! Uploads are validated in order, stopping at the first failure:
//!
//! 1. size, on the raw bytes, before anything is parsed
//! 2. UTF-8
//! 3. JSON syntax
//! 4. schema, when the file name names a known table
//!
//! A valid upload is saved through the data access layer, which writes it
//! to the remote store and mirrors it locally.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use crate::cache::to_pretty_json;
use crate::models::{check_schema, DocumentName, NameError, KNOWN_DOCUMENTS, MAX_DOCUMENT_BYTES};
use crate::store::{DataStore, Origin};

use super::NO_DATA;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("file is too large: {size} bytes ({:.2} MB), maximum is 10 MB", megabytes(.size))]
    TooLarge { size: usize },
    #[error("file is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),
    #[error("invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
    #[error("{name} does not match its schema: {source}")]
    Schema {
        name: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Name(#[from] NameError),
}

fn megabytes(size: &usize) -> f64 {
    *size as f64 / 1024.0 / 1024.0
}

/// The top-level kind of a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Object,
    Array,
    String,
    Number,
    Bool,
    Null,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => JsonKind::Object,
            Value::Array(_) => JsonKind::Array,
            Value::String(_) => JsonKind::String,
            Value::Number(_) => JsonKind::Number,
            Value::Bool(_) => JsonKind::Bool,
            Value::Null => JsonKind::Null,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JsonKind::Object => "object",
            JsonKind::Array => "array",
            JsonKind::String => "string",
            JsonKind::Number => "number",
            JsonKind::Bool => "bool",
            JsonKind::Null => "null",
        }
    }
}

/// A validated upload, ready to save.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub name: DocumentName,
    pub document: Value,
    pub size: usize,
    /// Whether the name matched a known table and passed its schema check.
    pub known_table: bool,
}

impl Upload {
    pub fn kind(&self) -> JsonKind {
        JsonKind::of(&self.document)
    }

    /// Number of keys of an object or items of an array.
    pub fn entry_count(&self) -> Option<usize> {
        match &self.document {
            Value::Object(map) => Some(map.len()),
            Value::Array(items) => Some(items.len()),
            _ => None,
        }
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "{}: {:.2} KB, {}",
            self.name,
            self.size as f64 / 1024.0,
            self.kind().as_str()
        );
        match (self.kind(), self.entry_count()) {
            (JsonKind::Object, Some(n)) => out.push_str(&format!(", {n} key(s)")),
            (JsonKind::Array, Some(n)) => out.push_str(&format!(", {n} item(s)")),
            _ => {}
        }
        if !self.known_table {
            out.push_str(" (not a known table)");
        }
        out
    }
}

/// Validate an uploaded file's name and bytes.
pub fn validate_upload(file_name: &str, bytes: &[u8]) -> Result<Upload, UploadError> {
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(UploadError::TooLarge { size: bytes.len() });
    }
    let name = DocumentName::new(file_name)?;
    let text = std::str::from_utf8(bytes)?;
    let document: Value = serde_json::from_str(text).map_err(UploadError::InvalidJson)?;
    let known_table = check_schema(&name, &document).map_err(|source| UploadError::Schema {
        name: name.file_name(),
        source,
    })?;
    Ok(Upload {
        name,
        document,
        size: bytes.len(),
        known_table,
    })
}

/// One row of the admin listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub name: DocumentName,
    pub origin: Option<Origin>,
}

/// The known documents and where each one loads from.
pub fn list_documents(store: &DataStore) -> Vec<Listing> {
    KNOWN_DOCUMENTS
        .iter()
        .filter_map(|raw| DocumentName::new(raw).ok())
        .map(|name| {
            let origin = store.load_with_origin(&name).map(|loaded| loaded.origin);
            Listing { name, origin }
        })
        .collect()
}

/// Validate `path` and, unless `dry_run`, save it.
pub fn run_upload(store: &DataStore, path: &Path, dry_run: bool) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("not a file path: {}", path.display()))?;
    let size = std::fs::metadata(path)
        .with_context(|| format!("failed to read {}", path.display()))?
        .len();
    if size > MAX_DOCUMENT_BYTES as u64 {
        return Err(UploadError::TooLarge {
            size: usize::try_from(size).unwrap_or(usize::MAX),
        }
        .into());
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;

    let upload = validate_upload(file_name, &bytes)
        .with_context(|| format!("rejected {}", path.display()))?;
    println!("{}", upload.summary());

    if dry_run {
        println!("Dry run: not saved.");
        return Ok(());
    }
    store
        .save_document(&upload.name, &upload.document)
        .with_context(|| format!("failed to save {}", upload.name))?;
    println!("Saved {}.", upload.name);
    Ok(())
}

pub fn run_list(store: &DataStore) -> Result<()> {
    match store.remote_description() {
        Some(remote) => println!("Remote: {remote}"),
        None => println!("Remote: not configured (local only)"),
    }
    println!("Cache:  {}", store.cache().dir().display());
    println!();
    println!("{:<24} SOURCE", "FILE");
    for listing in list_documents(store) {
        let source = listing.origin.map_or("missing", Origin::as_str);
        println!("{:<24} {}", listing.name.file_name(), source);
    }
    Ok(())
}

pub fn run_show(store: &DataStore, name: &str) -> Result<()> {
    let name = DocumentName::new(name)?;
    match store.load_document(&name) {
        Some(document) => {
            let pretty = to_pretty_json(&document)?;
            println!("{}", String::from_utf8_lossy(&pretty));
        }
        None => println!("{NO_DATA}"),
    }
    Ok(())
}
