//! # Validate Subcommand
//!
//! Runs the full registry check and prints the report.
//!
//! Text output is the human report: warnings, errors, then one PASS/FAIL
//! line. JSON output carries the same findings as
//! `{root, errors, warnings, exitStatus}` for CI tooling.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;

use gcr_core::{Finding, RegistryLayout, ValidationResult};
use gcr_integrity::{run_validation, ValidationOptions};
use gcr_schema::{MissingSchemaPolicy, SchemaPolicy, ToleranceTable};

/// Report format.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Arguments for the `gcr validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Registry root. Defaults to the nearest ancestor holding a manifest
    /// and index, then `./registry`, then the current directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Treat a missing schema as an error instead of a warning.
    #[arg(long)]
    pub strict: bool,

    /// Report every schema violation, including known extension points.
    #[arg(long)]
    pub no_tolerance: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl ValidateArgs {
    /// The schema policy these flags select.
    pub fn policy(&self) -> SchemaPolicy {
        SchemaPolicy {
            missing_schema: if self.strict {
                MissingSchemaPolicy::Error
            } else {
                MissingSchemaPolicy::Warn
            },
            tolerances: if self.no_tolerance {
                ToleranceTable::none()
            } else {
                ToleranceTable::standard()
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    root: &'a Path,
    errors: &'a [Finding],
    warnings: &'a [Finding],
    exit_status: u8,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure. Operational
/// failures are returned as `Err`.
pub fn run_validate(args: &ValidateArgs, layout: &RegistryLayout) -> Result<u8> {
    let root = crate::resolve_root(args.root.as_deref(), layout)?;
    if !root.is_dir() {
        bail!("registry root {} is not a directory", root.display());
    }
    tracing::debug!(root = %root.display(), strict = args.strict, "validating registry");

    let options = ValidationOptions::new(layout.clone(), args.policy());
    let result = run_validation(&root, &options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_report(&result, &root, args.format, &mut out).context("failed to write report")?;
    Ok(result.exit_status())
}

/// Write `result` in the chosen format.
pub fn write_report<W: Write>(
    result: &ValidationResult,
    root: &Path,
    format: OutputFormat,
    out: &mut W,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Text => result.report(out),
        OutputFormat::Json => {
            let report = JsonReport {
                root,
                errors: result.errors(),
                warnings: result.warnings(),
                exit_status: result.exit_status(),
            };
            serde_json::to_writer_pretty(&mut *out, &report)?;
            writeln!(out)
        }
    }
}
