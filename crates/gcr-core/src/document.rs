//! # Document Kinds
//!
//! Typed views of every registry document. Each view is deserialized from a
//! value tree that has already been through schema validation, so fields are
//! `Option` wherever a malformed document could still reach the walker (for
//! example when the schema for that kind has not shipped yet).
//!
//! Unknown fields are ignored here; rejecting them is the schema's job.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Every document kind the registry knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// Top-level `manifest.yml`.
    Manifest,
    /// Top-level `index.yml`.
    Index,
    /// Per-entry definition (`game.yml`).
    Entry,
    /// Per-entry adapter mapping.
    Adapter,
    /// One file in an entry's frameworks directory.
    Framework,
    /// One plugin definition (`plugin.yml`).
    Plugin,
    /// A plugin's companion config schema (`schema.yml`).
    PluginSchema,
    /// Frameworks specification named by `registryExtensions.frameworksSpec`.
    FrameworksSpec,
    /// Config spec index named by `registryExtensions.configSpec`.
    ConfigSpecIndex,
    /// Per-file config schema named by a config file descriptor.
    ConfigFileSchema,
}

impl DocumentKind {
    /// All kinds, in traversal order.
    pub const ALL: [DocumentKind; 10] = [
        DocumentKind::Manifest,
        DocumentKind::Index,
        DocumentKind::Entry,
        DocumentKind::Adapter,
        DocumentKind::Framework,
        DocumentKind::Plugin,
        DocumentKind::PluginSchema,
        DocumentKind::FrameworksSpec,
        DocumentKind::ConfigSpecIndex,
        DocumentKind::ConfigFileSchema,
    ];

    /// Name of the schema this kind is validated against.
    pub fn schema_name(self) -> &'static str {
        match self {
            DocumentKind::Manifest => "manifest",
            DocumentKind::Index => "index",
            DocumentKind::Entry => "game",
            DocumentKind::Adapter => "adapter",
            DocumentKind::Framework => "framework",
            DocumentKind::Plugin => "plugin",
            DocumentKind::PluginSchema => "plugin-config",
            DocumentKind::FrameworksSpec => "frameworks-spec",
            DocumentKind::ConfigSpecIndex => "config-spec-index",
            DocumentKind::ConfigFileSchema => "config-file-schema",
        }
    }

    /// Human-readable label used in findings.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Manifest => "manifest",
            DocumentKind::Index => "index",
            DocumentKind::Entry => "game definition",
            DocumentKind::Adapter => "adapter",
            DocumentKind::Framework => "framework",
            DocumentKind::Plugin => "plugin definition",
            DocumentKind::PluginSchema => "plugin config schema",
            DocumentKind::FrameworksSpec => "frameworks specification",
            DocumentKind::ConfigSpecIndex => "config spec index",
            DocumentKind::ConfigFileSchema => "config file schema",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A typed registry document.
pub trait Document: DeserializeOwned {
    /// The kind this type represents.
    const KIND: DocumentKind;
}

/// A child document that names the entry owning it.
pub trait OwnedDocument: Document {
    /// Name of the back-reference field, for messages.
    const OWNER_FIELD: &'static str = "gameId";

    /// The declared owner identifier, if any.
    fn owner_id(&self) -> Option<&str>;
}

macro_rules! document {
    ($ty:ty, $kind:ident) => {
        impl Document for $ty {
            const KIND: DocumentKind = DocumentKind::$kind;
        }
    };
}

// ---------------------------------------------------------------------------
// Top-level documents
// ---------------------------------------------------------------------------

/// The registry manifest: the version contract for the whole tree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDocument {
    /// Version contract (`major.minor`) the data obeys.
    pub spec_version: Option<String>,
    /// Oldest consumer contract able to read this registry.
    pub min_consumer_version: Option<String>,
    /// Optional registry display name.
    pub name: Option<String>,
}
document!(ManifestDocument, Manifest);

/// The registry index: drives the traversal.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocument {
    /// Version contract; must equal the manifest's.
    pub spec_version: Option<String>,
    /// Indexed entries, in file order.
    #[serde(default)]
    pub games: Vec<EntryReference>,
}
document!(IndexDocument, Index);

/// One indexed entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntryReference {
    /// Identifier the entry is indexed under.
    pub id: Option<String>,
    /// Display name recorded in the index.
    pub name: Option<String>,
    /// Entry directory, relative to the registry root.
    pub path: Option<String>,
}

// ---------------------------------------------------------------------------
// Entry and its children
// ---------------------------------------------------------------------------

/// A top-level entry definition (one game).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDocument {
    /// Declared identifier; must match the index.
    pub id: Option<String>,
    /// Declared display name; drift from the index is cosmetic.
    pub name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Capability flags.
    #[serde(default)]
    pub capabilities: BTreeMap<String, Value>,
    /// Further files to validate.
    pub registry_extensions: Option<RegistryExtensions>,
}
document!(EntryDocument, Entry);

/// The `registryExtensions` block of an entry. Paths are relative to the
/// entry directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryExtensions {
    /// Frameworks specification file.
    pub frameworks_spec: Option<String>,
    /// Config spec index file.
    pub config_spec: Option<String>,
}

/// Operational mappings for one entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterDocument {
    /// Owner back-reference.
    pub game_id: Option<String>,
    /// Named filesystem paths.
    #[serde(default)]
    pub paths: BTreeMap<String, Value>,
    /// Named actions.
    #[serde(default)]
    pub actions: BTreeMap<String, Value>,
}
document!(AdapterDocument, Adapter);

/// A framework supported by an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkDocument {
    /// Framework identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Owner back-reference.
    pub game_id: Option<String>,
}
document!(FrameworkDocument, Framework);

/// A plugin definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDocument {
    /// Plugin identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Owner back-reference.
    pub game_id: Option<String>,
    /// Frameworks this plugin runs on.
    #[serde(default)]
    pub frameworks: Vec<String>,
}
document!(PluginDocument, Plugin);

/// Field and validation metadata for a plugin's own configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PluginSchemaFile {
    /// Field name to field metadata.
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}
document!(PluginSchemaFile, PluginSchema);

impl OwnedDocument for AdapterDocument {
    fn owner_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }
}

impl OwnedDocument for FrameworkDocument {
    fn owner_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }
}

impl OwnedDocument for PluginDocument {
    fn owner_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Registry extensions
// ---------------------------------------------------------------------------

/// The frameworks specification named by an entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrameworksSpec {
    /// Specification version.
    pub version: Option<Value>,
    /// Declared frameworks.
    #[serde(default)]
    pub frameworks: Vec<FrameworkDescriptor>,
}
document!(FrameworksSpec, FrameworksSpec);

/// One framework listed by a [`FrameworksSpec`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FrameworkDescriptor {
    /// Framework identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
}

/// The config spec index named by an entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigSpecIndex {
    /// Index version.
    pub version: Option<Value>,
    /// Config file descriptors.
    #[serde(default)]
    pub files: Vec<ConfigFileDescriptor>,
}
document!(ConfigSpecIndex, ConfigSpecIndex);

/// One config file described by a [`ConfigSpecIndex`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfigFileDescriptor {
    /// Descriptor identifier.
    pub id: Option<String>,
    /// Path of the config file on a running server.
    pub path: Option<String>,
    /// Format tag, used when the schema file omits one.
    pub format: Option<String>,
    /// Schema file, relative to the config spec index.
    pub schema: Option<String>,
}

/// Shape of a single config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFileSchema {
    /// Format tag.
    pub format: Option<String>,
    /// Key to field metadata, for key-value formats.
    pub fields: Option<Value>,
    /// Per-line shape, for list formats.
    pub line_schema: Option<Value>,
}
document!(ConfigFileSchema, ConfigFileSchema);

/// The format tag of a config file, as far as shape rules care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `key-value`: expects a `fields` mapping.
    KeyValue,
    /// `list`: requires a `lineSchema`.
    List,
    /// Any other tag; no shape requirement.
    Other(String),
}

impl ConfigFormat {
    /// Interpret a format tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "key-value" => ConfigFormat::KeyValue,
            "list" => ConfigFormat::List,
            other => ConfigFormat::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_names_are_unique() {
        let mut names: Vec<_> = DocumentKind::ALL.iter().map(|k| k.schema_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DocumentKind::ALL.len());
    }

    #[test]
    fn entry_document_reads_registry_extensions() {
        let doc: EntryDocument = serde_json::from_value(json!({
            "id": "minecraft",
            "name": "Minecraft",
            "capabilities": {"rcon": true},
            "registryExtensions": {
                "frameworksSpec": "frameworks-spec.yml",
                "configSpec": "config/index.yml"
            }
        }))
        .unwrap();
        let ext = doc.registry_extensions.unwrap();
        assert_eq!(ext.frameworks_spec.as_deref(), Some("frameworks-spec.yml"));
        assert_eq!(ext.config_spec.as_deref(), Some("config/index.yml"));
        assert_eq!(doc.capabilities["rcon"], json!(true));
    }

    #[test]
    fn owned_documents_expose_game_id() {
        let plugin: PluginDocument =
            serde_json::from_value(json!({"id": "essentials", "gameId": "minecraft"})).unwrap();
        assert_eq!(plugin.owner_id(), Some("minecraft"));
        assert_eq!(PluginDocument::OWNER_FIELD, "gameId");

        let adapter: AdapterDocument = serde_json::from_value(json!({})).unwrap();
        assert_eq!(adapter.owner_id(), None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let fw: FrameworkDocument = serde_json::from_value(json!({
            "id": "paper",
            "gameId": "minecraft",
            "somethingNew": [1, 2, 3]
        }))
        .unwrap();
        assert_eq!(fw.id.as_deref(), Some("paper"));
    }

    #[test]
    fn wrong_field_type_is_rejected() {
        let err = serde_json::from_value::<FrameworkDocument>(json!({"gameId": 42}));
        assert!(err.is_err());
    }

    #[test]
    fn config_format_tags() {
        assert_eq!(ConfigFormat::from_tag("list"), ConfigFormat::List);
        assert_eq!(ConfigFormat::from_tag("key-value"), ConfigFormat::KeyValue);
        assert_eq!(
            ConfigFormat::from_tag("json"),
            ConfigFormat::Other("json".to_string())
        );
    }

    #[test]
    fn config_file_schema_reads_line_schema() {
        let schema: ConfigFileSchema = serde_json::from_value(json!({
            "format": "list",
            "lineSchema": {"pattern": "^[A-Za-z0-9_]{3,16}$"}
        }))
        .unwrap();
        assert!(schema.line_schema.is_some());
        assert!(schema.fields.is_none());
    }
}
