//! # Reference Walker
//!
//! Traversal order:
//!
//! 1. Manifest. A missing manifest is an error but the walk continues.
//! 2. Index. If it cannot be loaded or interpreted the walk ends here.
//! 3. Manifest/index version agreement.
//! 4. Each indexed game, in index order:
//!    game definition, adapter, frameworks, plugins, registry extensions.
//!
//! Back-references are compared against the id the game is indexed under,
//! so children are still checked when the game definition itself is
//! malformed.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use gcr_core::{
    AdapterDocument, Category, Document, EntryDocument, EntryReference, FrameworkDocument,
    IndexDocument, ManifestDocument, OwnedDocument, PluginDocument, PluginSchemaFile,
    RegistryLayout, ValidationResult, VersionContract,
};
use gcr_schema::{load_into, loader::is_document_file, SchemaValidator};
use serde_json::Value;

/// A document that loaded and deserialized.
pub(crate) struct Checked<D> {
    pub(crate) doc: D,
    /// Whether it passed its schema check.
    pub(crate) conforms: bool,
}

/// Walks one registry tree, appending findings to a [`ValidationResult`].
pub struct ReferenceWalker<'a> {
    pub(crate) root: &'a Path,
    pub(crate) layout: &'a RegistryLayout,
    pub(crate) validator: &'a SchemaValidator,
}

impl<'a> ReferenceWalker<'a> {
    /// Create a walker for the tree at `root`.
    pub fn new(root: &'a Path, layout: &'a RegistryLayout, validator: &'a SchemaValidator) -> Self {
        Self {
            root,
            layout,
            validator,
        }
    }

    /// Walk the whole tree.
    pub fn walk(&self, result: &mut ValidationResult) {
        let manifest_path = self.root.join(&self.layout.manifest_file);
        let manifest_version = self.check_manifest(&manifest_path, result);

        let index_path = self.root.join(&self.layout.index_file);
        let Some(index) = self.check_document::<IndexDocument>(&index_path, result) else {
            tracing::debug!(path = %index_path.display(), "index unavailable; nothing to walk");
            return;
        };

        let index_version = self.contract(
            "specVersion",
            index.doc.spec_version.as_deref(),
            &index_path,
            index.conforms,
            result,
        );
        if let (Some(manifest), Some(index)) = (manifest_version, index_version) {
            if manifest != index {
                result.error(
                    Category::Reference,
                    &index_path,
                    format!("specVersion {index} does not match manifest specVersion {manifest}"),
                );
            }
        }

        self.walk_games(&index, &index_path, result);
    }

    /// Check the manifest and return its parsed `specVersion`.
    fn check_manifest(&self, path: &Path, result: &mut ValidationResult) -> Option<VersionContract> {
        let manifest = self.check_document::<ManifestDocument>(path, result)?;
        let spec = self.contract(
            "specVersion",
            manifest.doc.spec_version.as_deref(),
            path,
            manifest.conforms,
            result,
        );
        let min_consumer = self.contract(
            "minConsumerVersion",
            manifest.doc.min_consumer_version.as_deref(),
            path,
            manifest.conforms,
            result,
        );
        if let (Some(spec), Some(min)) = (spec, min_consumer) {
            if min > spec {
                result.error(
                    Category::Reference,
                    path,
                    format!("minConsumerVersion {min} is newer than specVersion {spec}"),
                );
            }
        }
        spec
    }

    fn walk_games(&self, index: &Checked<IndexDocument>, index_path: &Path, result: &mut ValidationResult) {
        let mut seen: HashSet<&str> = HashSet::new();
        for (position, entry) in index.doc.games.iter().enumerate() {
            let (Some(id), Some(rel)) = (entry.id.as_deref(), entry.path.as_deref()) else {
                if index.conforms {
                    result.error(
                        Category::Reference,
                        index_path,
                        format!("games[{position}] has no id or no path"),
                    );
                }
                continue;
            };
            if !seen.insert(id) {
                result.error(
                    Category::Reference,
                    index_path,
                    format!("duplicate game id {id:?}; only the first occurrence is checked"),
                );
                continue;
            }
            if !is_contained(rel) {
                result.error(
                    Category::Reference,
                    index_path,
                    format!("game {id:?} path {rel:?} must be relative and stay inside the registry"),
                );
                continue;
            }
            self.check_game(entry, id, &self.root.join(rel), result);
        }
    }

    fn check_game(&self, entry: &EntryReference, id: &str, dir: &Path, result: &mut ValidationResult) {
        if !dir.is_dir() {
            result.error(
                Category::Reference,
                dir,
                format!("directory for game {id:?} does not exist"),
            );
            return;
        }
        tracing::debug!(game = id, dir = %dir.display(), "checking game");

        let game_path = dir.join(&self.layout.entry_file);
        let game = load_into(&game_path, result)
            .and_then(|value| self.check_value::<EntryDocument>(value, &game_path, result));
        if let Some(game) = &game {
            check_identity(&game.doc, entry, id, &game_path, result);
        }

        let adapter_path = dir.join(&self.layout.adapter_file);
        if adapter_path.is_file() {
            self.check_owned::<AdapterDocument>(id, &adapter_path, result);
        }

        let frameworks_dir = dir.join(&self.layout.frameworks_dir);
        if frameworks_dir.is_dir() {
            for path in sorted_children(&frameworks_dir, result) {
                if path.is_file() && is_document_file(&path) {
                    self.check_owned::<FrameworkDocument>(id, &path, result);
                } else {
                    tracing::warn!(path = %path.display(), "skipping non-document entry in frameworks directory");
                }
            }
        }

        let plugins_dir = dir.join(&self.layout.plugins_dir);
        if plugins_dir.is_dir() {
            for path in sorted_children(&plugins_dir, result) {
                if path.is_dir() {
                    self.check_plugin(id, &path, result);
                } else {
                    tracing::warn!(path = %path.display(), "skipping non-directory entry in plugins directory");
                }
            }
        }

        if let Some(extensions) = game.and_then(|g| g.doc.registry_extensions) {
            self.check_extensions(dir, &game_path, &extensions, result);
        }
    }

    fn check_plugin(&self, owner: &str, dir: &Path, result: &mut ValidationResult) {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let definition = dir.join(&self.layout.plugin_file);
        if !definition.is_file() {
            result.error(
                Category::Reference,
                dir,
                format!(
                    "plugin directory {name:?} has no {}",
                    self.layout.plugin_file.display()
                ),
            );
            return;
        }
        self.check_owned::<PluginDocument>(owner, &definition, result);

        let companion = dir.join(&self.layout.plugin_schema_file);
        if companion.is_file() {
            self.check_document::<PluginSchemaFile>(&companion, result);
        } else {
            result.warning(
                Category::Advisory,
                dir,
                format!(
                    "plugin {name:?} has no {} describing its configuration",
                    self.layout.plugin_schema_file.display()
                ),
            );
        }
    }

    /// Load, schema-check and deserialize a document.
    pub(crate) fn check_document<D: Document>(
        &self,
        path: &Path,
        result: &mut ValidationResult,
    ) -> Option<Checked<D>> {
        let value = load_into(path, result)?;
        self.check_value(value, path, result)
    }

    /// Schema-check and deserialize an already-loaded document.
    ///
    /// A deserialization failure is only reported when the schema check
    /// passed; otherwise the schema errors already describe the problem.
    fn check_value<D: Document>(
        &self,
        value: Value,
        path: &Path,
        result: &mut ValidationResult,
    ) -> Option<Checked<D>> {
        let kind = D::KIND;
        tracing::debug!(path = %path.display(), %kind, "checking document");
        let conforms = self
            .validator
            .validate(&value, kind.schema_name(), path, result);
        match serde_json::from_value::<D>(value) {
            Ok(doc) => Some(Checked { doc, conforms }),
            Err(e) => {
                if conforms {
                    result.error(Category::Schema, path, format!("cannot interpret {kind}: {e}"));
                }
                None
            }
        }
    }

    fn check_owned<D: OwnedDocument>(&self, owner: &str, path: &Path, result: &mut ValidationResult) {
        if let Some(checked) = self.check_document::<D>(path, result) {
            check_owner(&checked.doc, owner, path, result);
        }
    }

    fn contract(
        &self,
        field: &str,
        raw: Option<&str>,
        path: &Path,
        conforms: bool,
        result: &mut ValidationResult,
    ) -> Option<VersionContract> {
        match VersionContract::parse(raw?) {
            Ok(version) => Some(version),
            Err(e) => {
                if conforms {
                    result.error(Category::Schema, path, format!("{field}: {e}"));
                }
                None
            }
        }
    }
}

/// Compare a game definition with the index entry that points at it.
fn check_identity(
    game: &EntryDocument,
    entry: &EntryReference,
    indexed_id: &str,
    path: &Path,
    result: &mut ValidationResult,
) {
    if let Some(declared) = game.id.as_deref() {
        if declared != indexed_id {
            result.error(
                Category::Reference,
                path,
                format!("game id {declared:?} does not match index id {indexed_id:?}"),
            );
        }
    }
    if let (Some(declared), Some(indexed)) = (game.name.as_deref(), entry.name.as_deref()) {
        if declared != indexed {
            result.warning(
                Category::Advisory,
                path,
                format!("game name {declared:?} differs from index name {indexed:?}"),
            );
        }
    }
}

/// Record an error when a child's back-reference names another game.
fn check_owner<D: OwnedDocument>(doc: &D, owner: &str, path: &Path, result: &mut ValidationResult) {
    if let Some(declared) = doc.owner_id() {
        if declared != owner {
            result.error(
                Category::Reference,
                path,
                format!(
                    "{} {} {declared:?} does not match owning game {owner:?}",
                    D::KIND,
                    D::OWNER_FIELD
                ),
            );
        }
    }
}

/// True for a relative path with no `..`, root or prefix components.
pub(crate) fn is_contained(rel: &str) -> bool {
    let path = Path::new(rel);
    !path.is_absolute()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Directory entries sorted by path. Listing failures are recorded.
fn sorted_children(dir: &Path, result: &mut ValidationResult) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            result.error(Category::Parse, dir, format!("cannot list directory: {e}"));
            return Vec::new();
        }
    };
    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => paths.push(entry.path()),
            Err(e) => result.error(Category::Parse, dir, format!("cannot list directory: {e}")),
        }
    }
    paths.sort();
    paths
}
