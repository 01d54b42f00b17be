//! # Schemas Subcommand
//!
//! Lists the schemas a registry provides, flags document kinds that have no
//! schema, and reports schema files that failed to load.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use gcr_core::{DocumentKind, RegistryLayout};
use gcr_schema::SchemaRegistry;

/// Arguments for the `gcr schemas` subcommand.
#[derive(Args, Debug, Default)]
pub struct SchemasArgs {
    /// Registry root. Discovered the same way as for `validate`.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Execute the schemas subcommand.
///
/// Returns exit code: 0 when every schema file loaded, 1 otherwise.
pub fn run_schemas(args: &SchemasArgs, layout: &RegistryLayout) -> Result<u8> {
    let root = crate::resolve_root(args.root.as_deref(), layout)?;
    let schema_dir = root.join(&layout.schema_dir);
    let registry = SchemaRegistry::load(&schema_dir)
        .with_context(|| format!("failed to load schemas from {}", schema_dir.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_listing(&registry, &mut out).context("failed to write schema listing")?;

    Ok(if registry.load_failures().is_empty() { 0 } else { 1 })
}

/// Print one line per schema, then missing kinds, then load failures.
pub fn write_listing<W: Write>(registry: &SchemaRegistry, out: &mut W) -> std::io::Result<()> {
    writeln!(
        out,
        "Schemas in {} ({}):",
        registry.schema_dir().display(),
        registry.len()
    )?;
    for schema in registry.schemas() {
        writeln!(out, "  {:<20} {}", schema.name(), schema.id())?;
    }

    let missing: Vec<_> = DocumentKind::ALL
        .iter()
        .filter(|kind| registry.lookup(kind.schema_name()).is_none())
        .collect();
    if !missing.is_empty() {
        writeln!(out, "\nMissing ({}):", missing.len())?;
        for kind in missing {
            writeln!(out, "  {:<20} {kind}", kind.schema_name())?;
        }
    }

    let failures = registry.load_failures();
    if !failures.is_empty() {
        writeln!(out, "\nSkipped ({}):", failures.len())?;
        for failure in failures {
            writeln!(out, "  {}: {}", failure.path.display(), failure.reason)?;
        }
    }
    Ok(())
}
