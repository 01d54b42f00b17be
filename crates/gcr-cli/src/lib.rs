//! # gcr-cli: Game Config Registry Validator
//!
//! Provides the `gcr` command-line interface.
//!
//! ## Subcommands
//!
//! - `gcr validate`: schema and referential-integrity check of a registry
//!   tree. The default when no subcommand is given.
//! - `gcr schemas`: list the schemas the registry provides.
//!
//! ```bash
//! gcr
//! gcr validate --root registry --strict
//! gcr -vv validate --format json
//! gcr schemas
//! ```
//!
//! ## Exit Status
//!
//! `0` when no errors were found (warnings allowed), `1` on validation
//! errors, `2` on operational failure such as an unreadable `--config`.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; validation logic lives in
//!   `gcr-integrity` and `gcr-schema`.
//! - Reports go to stdout, logs to stderr.

pub mod schemas;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gcr_core::RegistryLayout;

/// Build the effective layout: defaults, then `--config`, then `GCR_*`
/// environment variables.
///
/// # Errors
///
/// Fails if the config file cannot be read or parsed.
pub fn load_layout(config: Option<&Path>) -> Result<RegistryLayout> {
    let layout = match config {
        Some(path) => RegistryLayout::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RegistryLayout::default(),
    };
    Ok(layout.with_env_overrides())
}

/// The registry root: `explicit` if given, otherwise discovered from the
/// current directory.
///
/// # Errors
///
/// Fails only if the current directory cannot be determined.
pub fn resolve_root(explicit: Option<&Path>, layout: &RegistryLayout) -> Result<PathBuf> {
    if let Some(root) = explicit {
        return Ok(root.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    Ok(discover_root(&cwd, layout))
}

/// Walk up from `start` to the nearest directory holding both the manifest
/// and the index. Falls back to `start/registry`, then to `start` itself.
pub fn discover_root(start: &Path, layout: &RegistryLayout) -> PathBuf {
    if let Some(dir) = start.ancestors().find(|dir| layout.is_registry_root(dir)) {
        return dir.to_path_buf();
    }
    let bundled = start.join("registry");
    if layout.is_registry_root(&bundled) {
        return bundled;
    }
    tracing::warn!(
        dir = %start.display(),
        "no registry root found; using current directory"
    );
    start.to_path_buf()
}
