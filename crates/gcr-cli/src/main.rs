//! # gcr CLI entry point
//!
//! Parses command-line arguments, initialises logging, builds the layout
//! configuration and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gcr_cli::schemas::{run_schemas, SchemasArgs};
use gcr_cli::validate::{run_validate, ValidateArgs};

/// Game config registry validator.
///
/// Checks every document in a registry tree against its schema and verifies
/// that every cross-document reference resolves. Exits non-zero if any error
/// is found.
#[derive(Parser, Debug)]
#[command(name = "gcr", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Layout configuration file (YAML).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a registry tree (the default).
    Validate(ValidateArgs),

    /// List the schemas a registry provides.
    Schemas(SchemasArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("gcr v{} starting", env!("CARGO_PKG_VERSION"));

    let layout = match gcr_cli::load_layout(cli.config.as_deref()) {
        Ok(layout) => layout,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(2);
        }
    };

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Validate(ValidateArgs::default()));
    let result = match command {
        Commands::Validate(args) => run_validate(&args, &layout),
        Commands::Schemas(args) => run_schemas(&args, &layout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
