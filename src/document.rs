//! Descriptor documents: the per-entity JSON-LD files of a package.
//!
//! A [`Document`] is a JSON object whose key order is preserved from disk, so
//! a read-modify-write cycle that touches one predicate leaves every other
//! line of the file as it was.
//!
//! The mint workflow reads only `schema:name`, `schema:creator` and
//! `schema:about`, and rewrites only `schema:identifier`.
//!
//! Writes go through [`write_atomic`]: the bytes land in a temporary file next
//! to the destination which is then renamed over it, so an interrupted write
//! leaves either the old document or the new one, never a truncated file.

use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const NAME: &str = "schema:name";
pub const CREATOR: &str = "schema:creator";
pub const ABOUT: &str = "schema:about";
pub const IDENTIFIER: &str = "schema:identifier";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} does not contain a JSON object")]
    NotAnObject(PathBuf),
}

/// A subject heading referenced from `schema:about`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Read and parse a document from disk.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&content).map_err(|source| DocumentError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_value(value).ok_or_else(|| DocumentError::NotAnObject(path.to_path_buf()))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a predicate. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// `schema:name`, when it is a non-blank string.
    pub fn name(&self) -> Option<&str> {
        self.text(NAME)
    }

    /// `schema:creator`, when it is a non-blank string.
    pub fn creator(&self) -> Option<&str> {
        self.text(CREATOR)
    }

    pub fn identifier(&self) -> Option<&Value> {
        self.0.get(IDENTIFIER)
    }

    /// Entries of `schema:about`, which may be a list or a single node.
    pub fn subjects(&self) -> Vec<Subject> {
        let nodes: Vec<&Value> = match self.0.get(ABOUT) {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(node @ Value::Object(_)) => vec![node],
            _ => Vec::new(),
        };
        nodes
            .into_iter()
            .filter_map(Value::as_object)
            .map(|node| Subject {
                id: non_blank(node.get("@id")),
                name: non_blank(node.get(NAME)),
            })
            .collect()
    }

    /// Copy of this document with `schema:identifier` replaced by `values`.
    /// No other predicate is touched.
    pub fn with_identifier<I, S>(&self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut updated = self.clone();
        let list = values
            .into_iter()
            .map(|v| Value::String(v.into()))
            .collect();
        updated.0.insert(IDENTIFIER.to_string(), Value::Array(list));
        updated
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for Document {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Serialize `value` as two-space indented JSON and atomically replace `path`.
///
/// The temporary file is created in the destination's directory so the final
/// rename never crosses a filesystem boundary.
pub fn write_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), DocumentError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| DocumentError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let io_err = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut builder = tempfile::Builder::new();
    // New documents get the usual 0o666-minus-umask mode, not tempfile's 0o600.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(io_err)?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(io_err)?;
    }
    tmp.write_all(json.as_bytes()).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    tracing::debug!(path = %path.display(), bytes = json.len(), "wrote document");
    Ok(())
}
