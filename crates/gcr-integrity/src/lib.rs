//! # gcr-integrity: Registry Walk
//!
//! Walks a registry tree from the manifest and index down through every
//! indexed game, its adapter, frameworks, plugins and registry extensions.
//! Each document is loaded, checked against its schema, and cross-checked
//! against the documents that reference it.
//!
//! [`run_validation`] is the single entry point: give it a root directory,
//! get back a [`ValidationResult`]. It never fails. Anything that goes wrong,
//! including an unreadable schema directory, becomes a finding.
//!
//! ## Crate Policy
//!
//! - Traversal is single-threaded and every directory listing is sorted, so
//!   two runs over the same tree produce identical findings.
//! - A document that cannot be loaded is treated as absent. Its siblings are
//!   still checked.

mod extensions;
pub mod walker;

use std::path::Path;

use gcr_core::{Category, RegistryLayout, ValidationResult};
use gcr_schema::{SchemaPolicy, SchemaRegistry, SchemaValidator};

pub use walker::ReferenceWalker;

/// Everything that shapes a validation run besides the root directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// File and directory names.
    pub layout: RegistryLayout,
    /// Missing-schema handling and tolerance table.
    pub policy: SchemaPolicy,
}

impl ValidationOptions {
    /// Options with the given layout and policy.
    pub fn new(layout: RegistryLayout, policy: SchemaPolicy) -> Self {
        Self { layout, policy }
    }
}

/// Validate the registry rooted at `root`.
///
/// Loads the schema registry, walks the tree, and returns every error and
/// warning found. Finding paths are relative to `root`.
pub fn run_validation(root: &Path, options: &ValidationOptions) -> ValidationResult {
    let mut result = ValidationResult::for_root(root);

    let schema_dir = root.join(&options.layout.schema_dir);
    let registry = match SchemaRegistry::load(&schema_dir) {
        Ok(registry) => registry,
        Err(e) => {
            result.error(Category::Parse, &schema_dir, e.to_string());
            SchemaRegistry::empty(&schema_dir)
        }
    };
    for failure in registry.load_failures() {
        result.error(
            Category::Parse,
            &failure.path,
            format!("schema skipped: {}", failure.reason),
        );
    }
    tracing::info!(
        root = %root.display(),
        schemas = registry.len(),
        "starting registry validation"
    );

    let validator = SchemaValidator::new(registry, options.policy.clone());
    ReferenceWalker::new(root, &options.layout, &validator).walk(&mut result);

    tracing::info!(
        errors = result.errors().len(),
        warnings = result.warnings().len(),
        "registry validation finished"
    );
    result
}
