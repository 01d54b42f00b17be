//! # Document Loader
//!
//! Reads a registry document from disk and parses it into a
//! `serde_json::Value` tree. YAML is parsed via `serde_yaml` and converted,
//! so schema validation sees one value model regardless of source format.
//!
//! [`load_into`] is what the walker calls: a failure becomes a `Parse`
//! finding and the document is treated as absent, so one malformed file
//! never stops the rest of the registry from being checked.

use std::path::{Path, PathBuf};

use gcr_core::{Category, ValidationResult};
use serde_json::Value;
use thiserror::Error;

/// A document could not be loaded.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Read {
        /// Requested path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// YAML parsing failed.
    #[error("failed to parse YAML at {path}: {source}")]
    Yaml {
        /// Document path.
        path: PathBuf,
        /// Parser error.
        source: serde_yaml::Error,
    },

    /// JSON parsing failed.
    #[error("failed to parse JSON at {path}: {source}")]
    Json {
        /// Document path.
        path: PathBuf,
        /// Parser error.
        source: serde_json::Error,
    },

    /// The YAML uses constructs with no JSON equivalent.
    #[error("{path}: {detail}")]
    Incompatible {
        /// Document path.
        path: PathBuf,
        /// What could not be converted.
        detail: String,
    },
}

impl LoadError {
    /// The path that failed.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::Read { path, .. }
            | LoadError::Yaml { path, .. }
            | LoadError::Json { path, .. }
            | LoadError::Incompatible { path, .. } => path,
        }
    }

    /// The failure without the path, for findings that already carry it.
    pub fn reason(&self) -> String {
        match self {
            LoadError::NotFound { .. } => "file not found".to_string(),
            LoadError::Read { source, .. } => format!("cannot read file: {source}"),
            LoadError::Yaml { source, .. } => format!("YAML parse error: {source}"),
            LoadError::Json { source, .. } => format!("JSON parse error: {source}"),
            LoadError::Incompatible { detail, .. } => format!("unsupported YAML content: {detail}"),
        }
    }
}

/// Returns true for file names the registry treats as documents.
pub fn is_document_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml" | "yaml" | "json")
    )
}

/// Load a YAML or JSON document as a value tree.
///
/// `.json` files are parsed as JSON; everything else as YAML.
///
/// # Errors
///
/// Returns [`LoadError`] when the file is missing, unreadable, or does not
/// parse.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        return serde_json::from_str(&content).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        });
    }

    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
    yaml_to_json_value(yaml).map_err(|detail| LoadError::Incompatible {
        path: path.to_path_buf(),
        detail,
    })
}

/// Load a document, recording any failure as a `Parse` error.
///
/// Returns `None` when the document could not be loaded; the caller skips
/// checks that need it and carries on with its siblings.
pub fn load_into(path: &Path, result: &mut ValidationResult) -> Option<Value> {
    match load_document(path) {
        Ok(value) => {
            tracing::trace!(path = %path.display(), "loaded document");
            Some(value)
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "document failed to load");
            result.error(Category::Parse, path, e.reason());
            None
        }
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped in favour of their inner value. Scalar mapping keys are
/// stringified; sequence or mapping keys are rejected.
fn yaml_to_json_value(yaml: serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s)),
        serde_yaml::Value::Sequence(seq) => seq
            .into_iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    other => return Err(format!("unsupported mapping key: {other:?}")),
                };
                object.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(object))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(tagged.value),
    }
}
