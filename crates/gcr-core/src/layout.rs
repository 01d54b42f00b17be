//! # Registry Layout
//!
//! File and directory names the walker expects. Defaults match the
//! conventional registry tree; any of them can be overridden from a YAML
//! file (`--config`) and a few from the environment.
//!
//! Precedence, lowest first: defaults, YAML file, environment.
//!
//! Environment variables:
//! - `GCR_SCHEMA_DIR`: schema directory, relative to the root
//! - `GCR_MANIFEST`: manifest file name
//! - `GCR_INDEX`: index file name

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Names of the files and directories that make up a registry tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryLayout {
    /// Manifest, relative to the root.
    pub manifest_file: PathBuf,
    /// Index, relative to the root.
    pub index_file: PathBuf,
    /// Schema directory, relative to the root.
    pub schema_dir: PathBuf,
    /// Entry definition inside each entry directory.
    pub entry_file: PathBuf,
    /// Optional adapter inside each entry directory.
    pub adapter_file: PathBuf,
    /// Optional frameworks directory inside each entry directory.
    pub frameworks_dir: PathBuf,
    /// Optional plugins directory inside each entry directory.
    pub plugins_dir: PathBuf,
    /// Plugin definition inside each plugin directory.
    pub plugin_file: PathBuf,
    /// Recommended companion schema inside each plugin directory.
    pub plugin_schema_file: PathBuf,
}

impl Default for RegistryLayout {
    fn default() -> Self {
        Self {
            manifest_file: PathBuf::from("manifest.yml"),
            index_file: PathBuf::from("index.yml"),
            schema_dir: PathBuf::from("schemas"),
            entry_file: PathBuf::from("game.yml"),
            adapter_file: PathBuf::from("adapter.yml"),
            frameworks_dir: PathBuf::from("frameworks"),
            plugins_dir: PathBuf::from("plugins"),
            plugin_file: PathBuf::from("plugin.yml"),
            plugin_schema_file: PathBuf::from("schema.yml"),
        }
    }
}

impl RegistryLayout {
    /// Load a layout from a YAML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] if the file cannot be read, is not valid
    /// YAML, or names an unknown key.
    pub fn from_yaml_file(path: &Path) -> Result<Self, LayoutError> {
        let content = std::fs::read_to_string(path).map_err(|source| LayoutError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        // An empty file deserializes to unit, not a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| LayoutError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `GCR_*` environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        if let Some(dir) = get("GCR_SCHEMA_DIR") {
            self.schema_dir = dir;
        }
        if let Some(file) = get("GCR_MANIFEST") {
            self.manifest_file = file;
        }
        if let Some(file) = get("GCR_INDEX") {
            self.index_file = file;
        }
        self
    }

    /// True when `dir` holds both the manifest and the index.
    pub fn is_registry_root(&self, dir: &Path) -> bool {
        dir.join(&self.manifest_file).is_file() && dir.join(&self.index_file).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_conventional_tree() {
        let layout = RegistryLayout::default();
        assert_eq!(layout.manifest_file, PathBuf::from("manifest.yml"));
        assert_eq!(layout.index_file, PathBuf::from("index.yml"));
        assert_eq!(layout.entry_file, PathBuf::from("game.yml"));
        assert_eq!(layout.plugin_file, PathBuf::from("plugin.yml"));
    }

    #[test]
    fn yaml_file_overrides_only_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.yml");
        std::fs::write(&path, "entry_file: definition.yaml\nschema_dir: spec/schemas\n").unwrap();

        let layout = RegistryLayout::from_yaml_file(&path).unwrap();
        assert_eq!(layout.entry_file, PathBuf::from("definition.yaml"));
        assert_eq!(layout.schema_dir, PathBuf::from("spec/schemas"));
        assert_eq!(layout.index_file, PathBuf::from("index.yml"));
    }

    #[test]
    fn empty_yaml_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.yml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(
            RegistryLayout::from_yaml_file(&path).unwrap(),
            RegistryLayout::default()
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.yml");
        std::fs::write(&path, "entry_fiel: typo.yml\n").unwrap();
        let err = RegistryLayout::from_yaml_file(&path).unwrap_err();
        assert!(matches!(err, LayoutError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = RegistryLayout::from_yaml_file(Path::new("/nonexistent/gcr-layout.yml"))
            .unwrap_err();
        assert!(matches!(err, LayoutError::Read { .. }));
        assert!(err.to_string().contains("gcr-layout.yml"));
    }

    #[test]
    fn overrides_apply_non_empty_values() {
        let env: HashMap<&str, &str> =
            HashMap::from([("GCR_SCHEMA_DIR", "alt-schemas"), ("GCR_INDEX", "")]);
        let layout = RegistryLayout::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(layout.schema_dir, PathBuf::from("alt-schemas"));
        assert_eq!(layout.index_file, PathBuf::from("index.yml"));
    }

    #[test]
    fn registry_root_needs_manifest_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RegistryLayout::default();
        assert!(!layout.is_registry_root(dir.path()));
        std::fs::write(dir.path().join("manifest.yml"), "specVersion: '1.0'\n").unwrap();
        assert!(!layout.is_registry_root(dir.path()));
        std::fs::write(dir.path().join("index.yml"), "specVersion: '1.0'\n").unwrap();
        assert!(layout.is_registry_root(dir.path()));
    }
}
