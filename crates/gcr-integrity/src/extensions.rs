//! Registry extensions: the frameworks specification and config spec index
//! a game definition may point at, and the per-file config schemas the
//! config spec index points at in turn.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gcr_core::{
    Category, ConfigFileDescriptor, ConfigFileSchema, ConfigFormat, ConfigSpecIndex,
    FrameworksSpec, RegistryExtensions, ValidationResult,
};

use crate::walker::{is_contained, Checked, ReferenceWalker};

impl ReferenceWalker<'_> {
    /// Follow `registryExtensions`. Paths are relative to the game directory.
    pub(crate) fn check_extensions(
        &self,
        game_dir: &Path,
        game_path: &Path,
        extensions: &RegistryExtensions,
        result: &mut ValidationResult,
    ) {
        if let Some(rel) = extensions.frameworks_spec.as_deref() {
            let field = "registryExtensions.frameworksSpec";
            if let Some(path) = resolve(game_dir, rel, field, game_path, result) {
                if let Some(spec) = self.check_document::<FrameworksSpec>(&path, result) {
                    check_frameworks_spec(&spec, &path, result);
                }
            }
        }

        if let Some(rel) = extensions.config_spec.as_deref() {
            let field = "registryExtensions.configSpec";
            if let Some(path) = resolve(game_dir, rel, field, game_path, result) {
                self.check_config_spec(&path, result);
            }
        }
    }

    /// Check a config spec index and every schema file its descriptors name.
    ///
    /// Schema paths are relative to the index. A schema shared by several
    /// descriptors is validated once; the shape rule runs per descriptor.
    fn check_config_spec(&self, index_path: &Path, result: &mut ValidationResult) {
        let Some(index) = self.check_document::<ConfigSpecIndex>(index_path, result) else {
            return;
        };
        if index.conforms && index.doc.version.is_none() {
            result.error(Category::Schema, index_path, "config spec index has no version");
        }
        let base = index_path.parent().unwrap_or(self.root);

        let mut loaded: BTreeMap<PathBuf, Option<ConfigFileSchema>> = BTreeMap::new();
        for descriptor in &index.doc.files {
            let Some(rel) = descriptor.schema.as_deref() else {
                continue;
            };
            let label = descriptor.id.as_deref().unwrap_or(rel);
            let field = format!("config file {label:?} schema");
            let Some(schema_path) = resolve(base, rel, &field, index_path, result) else {
                continue;
            };
            let schema = loaded.entry(schema_path.clone()).or_insert_with(|| {
                self.check_document::<ConfigFileSchema>(&schema_path, result)
                    .map(|checked| checked.doc)
            });
            if let Some(schema) = schema {
                check_config_shape(descriptor, schema, &schema_path, result);
            }
        }
    }
}

/// Resolve `rel` against `base`. An escaping or dangling reference is an
/// error on `referrer`.
fn resolve(
    base: &Path,
    rel: &str,
    field: &str,
    referrer: &Path,
    result: &mut ValidationResult,
) -> Option<PathBuf> {
    if !is_contained(rel) {
        result.error(
            Category::Reference,
            referrer,
            format!("{field} path {rel:?} must be relative and stay inside the registry"),
        );
        return None;
    }
    let path = base.join(rel);
    if !path.is_file() {
        result.error(
            Category::Reference,
            referrer,
            format!("{field} references missing file {rel:?}"),
        );
        return None;
    }
    Some(path)
}

/// Version and framework list requirements. Only reported when the schema
/// check passed, which covers a registry that ships no schema for this kind.
fn check_frameworks_spec(spec: &Checked<FrameworksSpec>, path: &Path, result: &mut ValidationResult) {
    if !spec.conforms {
        return;
    }
    if spec.doc.version.is_none() {
        result.error(Category::Schema, path, "frameworks specification has no version");
    }
    if spec.doc.frameworks.is_empty() {
        result.error(Category::Schema, path, "frameworks specification lists no frameworks");
    }
    for (position, framework) in spec.doc.frameworks.iter().enumerate() {
        if framework.id.is_none() || framework.name.is_none() {
            result.error(
                Category::Schema,
                path,
                format!("frameworks[{position}] has no id or no name"),
            );
        }
    }
}

/// The format's shape rule: `list` needs `lineSchema`, `key-value` should
/// have `fields`. The schema file's own `format` wins over the descriptor's.
fn check_config_shape(
    descriptor: &ConfigFileDescriptor,
    schema: &ConfigFileSchema,
    path: &Path,
    result: &mut ValidationResult,
) {
    let label = descriptor
        .id
        .as_deref()
        .or(descriptor.schema.as_deref())
        .unwrap_or_default();
    if let (Some(declared), Some(listed)) = (schema.format.as_deref(), descriptor.format.as_deref()) {
        if declared != listed {
            result.warning(
                Category::Advisory,
                path,
                format!("format {declared:?} differs from format {listed:?} of config file {label:?}"),
            );
        }
    }

    let Some(tag) = schema.format.as_deref().or(descriptor.format.as_deref()) else {
        return;
    };
    match ConfigFormat::from_tag(tag) {
        ConfigFormat::List if schema.line_schema.is_none() => {
            result.error(
                Category::Schema,
                path,
                format!("list config file {label:?} has no lineSchema"),
            );
        }
        ConfigFormat::KeyValue if schema.fields.is_none() => {
            result.warning(
                Category::Advisory,
                path,
                format!("key-value config file {label:?} declares no fields"),
            );
        }
        _ => {}
    }
}
