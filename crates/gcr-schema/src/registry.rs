//! # Schema Registry
//!
//! Loads every schema document under the schema directory once, at
//! startup, and indexes it three ways:
//!
//! - by **name**: the file name without its `.schema.json` /
//!   `.schema.yaml` / `.schema.yml` suffix (`game.schema.json` → `game`),
//! - by **file name**,
//! - by **`$id`**. Schemas without one get
//!   `https://schemas.gcr.local/<file name>` injected.
//!
//! Cross-schema `$ref`s are resolved by [`LocalSchemaRetriever`] from the
//! loaded set only, so compiling a validator never makes a network request.
//! The registry is immutable after [`SchemaRegistry::load`] returns.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::loader;

/// `$id` prefix given to schemas that do not declare one.
pub const SCHEMA_URI_PREFIX: &str = "https://schemas.gcr.local/";

const SCHEMA_SUFFIXES: [&str; 3] = [".schema.json", ".schema.yaml", ".schema.yml"];

/// Errors from registry operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema directory exists but could not be listed.
    #[error("cannot read schema directory {path}: {source}")]
    DirectoryUnreadable {
        /// Schema directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// No schema is registered under the requested name.
    #[error("schema not found: {0}")]
    NotFound(String),

    /// The schema could not be compiled into a validator.
    #[error("failed to compile schema {name}: {reason}")]
    Compile {
        /// Schema name.
        name: String,
        /// Compiler message.
        reason: String,
    },
}

/// A schema file that was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLoadFailure {
    /// Offending file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: String,
}

/// One loaded schema.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    name: String,
    file_name: String,
    id: String,
    path: PathBuf,
    value: Value,
}

impl SchemaDocument {
    /// Registry name (`game`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File name (`game.schema.json`).
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared or derived `$id`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Schema body.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Resolves `$ref` URIs against the loaded schemas.
///
/// Tries the full URI first, then the trailing path segment as a file name,
/// which covers relative references compiled against a foreign base URI.
struct LocalSchemaRetriever {
    schemas: Arc<HashMap<String, Value>>,
}

impl jsonschema::Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &jsonschema::Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();
        if let Some(value) = self.schemas.get(uri_str) {
            return Ok(value.clone());
        }
        let file_name = uri_str.rsplit('/').next().unwrap_or(uri_str);
        self.schemas
            .get(file_name)
            .cloned()
            .ok_or_else(|| format!("no schema in the registry for {uri_str}").into())
    }
}

/// All schemas available to a validation run.
#[derive(Debug)]
pub struct SchemaRegistry {
    schema_dir: PathBuf,
    schemas: BTreeMap<String, SchemaDocument>,
    aliases: HashMap<String, String>,
    by_uri: Arc<HashMap<String, Value>>,
    load_failures: Vec<SchemaLoadFailure>,
}

impl SchemaRegistry {
    /// Load every schema file under `schema_dir`, recursively.
    ///
    /// A missing directory yields an empty registry. Individual files that
    /// fail to parse, are not schema-shaped, or reuse an existing name are
    /// skipped and listed in [`load_failures`](Self::load_failures).
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DirectoryUnreadable`] if the directory exists
    /// but cannot be listed.
    pub fn load(schema_dir: impl Into<PathBuf>) -> Result<Self, SchemaError> {
        let schema_dir = schema_dir.into();
        let mut registry = Self::empty(schema_dir.clone());

        if !schema_dir.is_dir() {
            tracing::debug!(dir = %schema_dir.display(), "schema directory absent");
            return Ok(registry);
        }

        let mut files = Vec::new();
        walk_for_schemas(&schema_dir, &mut files).map_err(|source| {
            SchemaError::DirectoryUnreadable {
                path: schema_dir.clone(),
                source,
            }
        })?;
        files.sort();

        let mut by_uri = HashMap::new();
        for path in files {
            match registry.admit(&path) {
                Ok(doc) => {
                    by_uri.insert(doc.id.clone(), doc.value.clone());
                    by_uri.insert(format!("{SCHEMA_URI_PREFIX}{}", doc.file_name), doc.value.clone());
                    by_uri.insert(doc.file_name.clone(), doc.value.clone());
                    registry.aliases.insert(doc.file_name.clone(), doc.name.clone());
                    registry.aliases.insert(doc.id.clone(), doc.name.clone());
                    tracing::trace!(name = %doc.name, id = %doc.id, "registered schema");
                    registry.schemas.insert(doc.name.clone(), doc);
                }
                Err(reason) => {
                    tracing::warn!(path = %path.display(), %reason, "skipping schema file");
                    registry.load_failures.push(SchemaLoadFailure { path, reason });
                }
            }
        }
        registry.by_uri = Arc::new(by_uri);

        tracing::debug!(
            dir = %schema_dir.display(),
            count = registry.schemas.len(),
            failures = registry.load_failures.len(),
            "loaded schema registry"
        );
        Ok(registry)
    }

    /// A registry with no schemas.
    pub fn empty(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            schemas: BTreeMap::new(),
            aliases: HashMap::new(),
            by_uri: Arc::new(HashMap::new()),
            load_failures: Vec::new(),
        }
    }

    fn admit(&self, path: &Path) -> Result<SchemaDocument, String> {
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .ok_or_else(|| "schema file name is not valid UTF-8".to_string())?
            .to_string();
        let name = schema_name(&file_name)
            .ok_or_else(|| format!("{file_name} is not a schema file name"))?
            .to_string();

        let mut value = loader::load_document(path).map_err(|e| e.reason())?;

        if let Some(existing) = self.schemas.get(&name) {
            return Err(format!(
                "duplicate schema name '{name}' (already loaded from {})",
                existing.path.display()
            ));
        }

        let id = match &mut value {
            Value::Object(map) => {
                let declared = map.get("$id").and_then(Value::as_str).map(str::to_string);
                match declared {
                    Some(id) => id,
                    None => {
                        let id = format!("{SCHEMA_URI_PREFIX}{file_name}");
                        map.insert("$id".to_string(), Value::String(id.clone()));
                        id
                    }
                }
            }
            Value::Bool(_) => format!("{SCHEMA_URI_PREFIX}{file_name}"),
            _ => return Err("a schema must be a JSON object or boolean".to_string()),
        };

        Ok(SchemaDocument {
            name,
            file_name,
            id,
            path: path.to_path_buf(),
            value,
        })
    }

    /// Look up a schema by name, file name, or `$id`.
    pub fn lookup(&self, name: &str) -> Option<&SchemaDocument> {
        self.schemas.get(name).or_else(|| {
            self.aliases
                .get(name)
                .and_then(|canonical| self.schemas.get(canonical))
        })
    }

    /// Compile a validator for the named schema, with every other registered
    /// schema available for `$ref` resolution.
    ///
    /// # Errors
    ///
    /// [`SchemaError::NotFound`] if the name is unknown,
    /// [`SchemaError::Compile`] if the schema or one of its references is
    /// invalid or unresolvable.
    pub fn compile(&self, name: &str) -> Result<jsonschema::Validator, SchemaError> {
        let schema = self
            .lookup(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let retriever = LocalSchemaRetriever {
            schemas: Arc::clone(&self.by_uri),
        };

        jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .with_retriever(retriever)
            .build(&schema.value)
            .map_err(|e| SchemaError::Compile {
                name: schema.name.clone(),
                reason: e.to_string(),
            })
    }

    /// Registered schema names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Loaded schemas in name order.
    pub fn schemas(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.schemas.values()
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// True when nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// The directory the registry was loaded from.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Files skipped during loading.
    pub fn load_failures(&self) -> &[SchemaLoadFailure] {
        &self.load_failures
    }
}

/// Registry name for a schema file name, or `None` if it is not one.
fn schema_name(file_name: &str) -> Option<&str> {
    SCHEMA_SUFFIXES
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .filter(|name| !name.is_empty())
}

fn walk_for_schemas(dir: &Path, acc: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_for_schemas(&path, acc)?;
        } else if path
            .file_name()
            .and_then(|f| f.to_str())
            .and_then(schema_name)
            .is_some()
        {
            acc.push(path);
        }
    }
    Ok(())
}
